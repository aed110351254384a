/// Cache-aside helper for provider calls.
///
/// Returns the cached value when present. Otherwise awaits the block, hands
/// the value to the cache's background writer and returns it.
///
/// # Arguments
/// * `$cache`: a value with `get_from_cache` and `set_in_background` methods.
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) for the value.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let page: Page<MediaItem> = cached!(self.cache, CacheKey::Upcoming, LIST_CACHE_TTL, async move {
///     self.get_json("/movie/upcoming", &[]).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
