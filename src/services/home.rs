use std::sync::Arc;
use tokio::task::JoinError;

use crate::{
    error::{AppError, AppResult},
    models::{ContentKind, FixedRow, MediaItem, Page, TimeWindow},
    services::providers::MetadataProvider,
};

/// Titles shown in the hero banner
pub const BANNER_SIZE: usize = 5;

/// Editorial head of the home feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedHead {
    pub banner: Vec<MediaItem>,
    pub rows: Vec<FixedRow>,
}

/// Fetches the home feed head
///
/// Trending movies, trending series and upcoming movies are fetched in
/// parallel. A failed fetch only drops the sections built from it; the call
/// fails only when nothing could be fetched.
pub async fn fetch_feed_head(provider: Arc<dyn MetadataProvider>) -> AppResult<FeedHead> {
    let trending = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.trending(ContentKind::Movie, TimeWindow::Week).await })
    };
    let trending_tv = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.trending(ContentKind::Tv, TimeWindow::Week).await })
    };
    let upcoming = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.upcoming().await })
    };

    let mut error_count = 0usize;
    let trending = settle("trending", trending.await, &mut error_count);
    let trending_tv = settle("trending_tv", trending_tv.await, &mut error_count);
    let upcoming = settle("upcoming", upcoming.await, &mut error_count);

    if error_count == 3 {
        return Err(AppError::ExternalApi(
            "Failed to fetch any home feed data".to_string(),
        ));
    }
    if error_count > 0 {
        tracing::warn!(
            error_count,
            "Partial home feed failure, rendering the sections that loaded"
        );
    }

    let banner: Vec<MediaItem> = trending
        .as_ref()
        .map(|items| items.iter().take(BANNER_SIZE).cloned().collect())
        .unwrap_or_default();

    let mut rows = Vec::new();
    if let Some(items) = upcoming {
        rows.push(FixedRow::new("Coming Soon", ContentKind::Movie, items));
    }
    if let Some(items) = trending_tv {
        rows.push(FixedRow::new("Trending Series", ContentKind::Tv, items));
    }
    if let Some(items) = trending {
        rows.push(FixedRow::new("Top Movies", ContentKind::Movie, items));
    }

    Ok(FeedHead { banner, rows })
}

fn settle(
    section: &str,
    joined: Result<AppResult<Page<MediaItem>>, JoinError>,
    error_count: &mut usize,
) -> Option<Vec<MediaItem>> {
    match joined {
        Ok(Ok(page)) => Some(page.results),
        Ok(Err(e)) => {
            tracing::error!(error = %e, section, "Home section fetch failed");
            *error_count += 1;
            None
        }
        Err(e) => {
            tracing::error!(error = %e, section, "Task join error");
            *error_count += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    fn page(ids: std::ops::Range<u64>) -> Page<MediaItem> {
        let results = ids
            .map(|id| serde_json::from_value(serde_json::json!({ "id": id })).unwrap())
            .collect();
        Page {
            page: 1,
            results,
            total_pages: 1,
            total_results: 0,
        }
    }

    fn provider(upcoming_fails: bool, trending_fails: bool) -> Arc<dyn MetadataProvider> {
        let mut mock = MockMetadataProvider::new();
        mock.expect_trending()
            .with(eq(ContentKind::Movie), eq(TimeWindow::Week))
            .returning(move |_, _| {
                if trending_fails {
                    Err(AppError::ExternalApi("down".to_string()))
                } else {
                    Ok(page(1..21))
                }
            });
        mock.expect_trending()
            .with(eq(ContentKind::Tv), eq(TimeWindow::Week))
            .returning(|_, _| Ok(page(100..110)));
        mock.expect_upcoming().returning(move || {
            if upcoming_fails {
                Err(AppError::ExternalApi("down".to_string()))
            } else {
                Ok(page(200..205))
            }
        });
        Arc::new(mock)
    }

    fn labels(head: &FeedHead) -> Vec<&str> {
        head.rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_head() {
        let head = fetch_feed_head(provider(false, false)).await.unwrap();

        assert_eq!(head.banner.len(), BANNER_SIZE);
        assert_eq!(head.banner[0].id, 1);
        assert_eq!(labels(&head), vec!["Coming Soon", "Trending Series", "Top Movies"]);
        assert_eq!(head.rows[2].items.len(), 20);
        assert_eq!(head.rows[1].kind, ContentKind::Tv);
    }

    #[tokio::test]
    async fn test_failed_section_is_dropped() {
        let head = fetch_feed_head(provider(true, false)).await.unwrap();
        assert_eq!(labels(&head), vec!["Trending Series", "Top Movies"]);
        assert_eq!(head.banner.len(), BANNER_SIZE);
    }

    #[tokio::test]
    async fn test_failed_trending_empties_banner() {
        let head = fetch_feed_head(provider(false, true)).await.unwrap();
        assert!(head.banner.is_empty());
        assert_eq!(labels(&head), vec!["Coming Soon", "Trending Series"]);
    }

    #[tokio::test]
    async fn test_everything_failing_is_an_error() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_trending()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));
        mock.expect_upcoming()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));

        let result = fetch_feed_head(Arc::new(mock)).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
