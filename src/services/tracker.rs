use tokio::sync::Mutex;

use crate::{
    db::ClientKey,
    error::AppResult,
    models::{CategoryId, DecayPolicy, PreferenceCounter},
    services::ClientContext,
};

/// Records which categories a client interacts with
///
/// Counts are bumped with a read-modify-write against the client's store.
/// Writes are serialized so concurrent requests never lose an increment.
pub struct InteractionTracker {
    decay: DecayPolicy,
    write_lock: Mutex<()>,
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new(DecayPolicy::None)
    }
}

impl InteractionTracker {
    pub fn new(decay: DecayPolicy) -> Self {
        Self {
            decay,
            write_lock: Mutex::new(()),
        }
    }

    /// Counts one interaction per listed category
    ///
    /// Empty or absent input is ignored. Storage failures are logged and
    /// swallowed; the stored counter is left as it was.
    pub async fn record(&self, ctx: &ClientContext, category_ids: Option<&[CategoryId]>) {
        let Some(ids) = category_ids.filter(|ids| !ids.is_empty()) else {
            return;
        };

        let _guard = self.write_lock.lock().await;

        match self.try_record(ctx, ids).await {
            Ok(counter) => tracing::debug!(
                client_id = %ctx.client_id(),
                categories = ids.len(),
                tracked = counter.len(),
                "Interaction recorded"
            ),
            Err(e) => tracing::warn!(
                client_id = %ctx.client_id(),
                error = %e,
                "Failed to record interaction"
            ),
        }
    }

    async fn try_record(
        &self,
        ctx: &ClientContext,
        ids: &[CategoryId],
    ) -> AppResult<PreferenceCounter> {
        let mut counter: PreferenceCounter =
            ctx.load(ClientKey::Preferences).await?.unwrap_or_default();

        for id in ids {
            counter.increment(*id);
        }
        counter.apply_decay(self.decay);

        ctx.save(ClientKey::Preferences, &counter).await?;
        Ok(counter)
    }
}

/// Current counter for a client, empty when missing or unreadable
pub async fn load_counter(ctx: &ClientContext) -> PreferenceCounter {
    match ctx.load(ClientKey::Preferences).await {
        Ok(counter) => counter.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(
                client_id = %ctx.client_id(),
                error = %e,
                "Preference counter unavailable, treating as empty"
            );
            PreferenceCounter::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::KeyValueStore;
    use crate::services::context::testing::{failing_context, memory_context};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_or_absent_input_is_noop() {
        let (ctx, store) = memory_context();
        let tracker = InteractionTracker::default();

        tracker.record(&ctx, None).await;
        tracker.record(&ctx, Some(&[])).await;

        assert_eq!(store.len().await, 0);
        assert!(load_counter(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_counts_match_occurrences() {
        let (ctx, _store) = memory_context();
        let tracker = InteractionTracker::default();

        let calls: Vec<Vec<u32>> = vec![vec![28, 18], vec![28], vec![], vec![27, 28, 27]];
        let mut expected: HashMap<u32, u64> = HashMap::new();
        for ids in &calls {
            for id in ids {
                *expected.entry(*id).or_default() += 1;
            }
            let ids: Vec<CategoryId> = ids.iter().copied().map(CategoryId).collect();
            tracker.record(&ctx, Some(&ids)).await;
        }

        let counter = load_counter(&ctx).await;
        for (id, count) in expected {
            assert_eq!(counter.score(CategoryId(id)), count, "category {}", id);
        }
        assert_eq!(counter.score(CategoryId(99)), 0);
    }

    #[tokio::test]
    async fn test_repeated_record_is_not_idempotent() {
        let (ctx, _store) = memory_context();
        let tracker = InteractionTracker::default();

        tracker.record(&ctx, Some(&[CategoryId(35)])).await;
        tracker.record(&ctx, Some(&[CategoryId(35)])).await;

        assert_eq!(load_counter(&ctx).await.score(CategoryId(35)), 2);
    }

    #[tokio::test]
    async fn test_corrupted_counter_left_untouched() {
        let (ctx, store) = memory_context();
        let key = ClientKey::Preferences.for_client(ctx.client_id());
        store.set(&key, "not json").await.unwrap();

        InteractionTracker::default()
            .record(&ctx, Some(&[CategoryId(28)]))
            .await;

        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("not json"));
        assert!(load_counter(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let ctx = failing_context();
        InteractionTracker::default()
            .record(&ctx, Some(&[CategoryId(28)]))
            .await;
        assert!(load_counter(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_records_do_not_lose_updates() {
        let (ctx, _store) = memory_context();
        let tracker = Arc::new(InteractionTracker::default());

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let tracker = tracker.clone();
            let ctx = ctx.clone();
            tasks.push(tokio::spawn(async move {
                tracker.record(&ctx, Some(&[CategoryId(16)])).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(load_counter(&ctx).await.score(CategoryId(16)), 50);
    }

    #[tokio::test]
    async fn test_decay_policy_applied_on_record() {
        let (ctx, _store) = memory_context();
        let tracker = InteractionTracker::new(DecayPolicy::Cap(3));

        for _ in 0..5 {
            tracker.record(&ctx, Some(&[CategoryId(80)])).await;
        }

        assert_eq!(load_counter(&ctx).await.score(CategoryId(80)), 3);
    }
}
