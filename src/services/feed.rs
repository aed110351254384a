use rand::Rng;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Category, FeedSection, FixedRow, MediaItem},
    services::{ClientContext, GenreRanker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedState {
    Uninitialized,
    Initialized,
}

/// An append-only home feed for one client view
///
/// The head (banner plus editorial rows) is fixed by [`initialize`]. The tail
/// grows with personalized rows drawn from the freshly ranked catalog on each
/// [`grow`]. Sections already handed out are never moved or removed.
///
/// `grow` before `initialize` is rejected with
/// [`AppError::FeedNotInitialized`]. Callers are expected to throttle
/// repeated end-of-list signals; every call appends.
///
/// [`initialize`]: FeedGrower::initialize
/// [`grow`]: FeedGrower::grow
pub struct FeedGrower {
    ctx: ClientContext,
    ranker: GenreRanker,
    catalog: Arc<Vec<Category>>,
    draw_window: usize,
    state: FeedState,
    sections: Vec<FeedSection>,
}

impl FeedGrower {
    /// `draw_window` is how many top-ranked categories each draw picks from;
    /// 0 draws from the whole ranked catalog
    pub fn new(ctx: ClientContext, catalog: Arc<Vec<Category>>, draw_window: usize) -> Self {
        Self {
            ctx,
            ranker: GenreRanker::new(),
            catalog,
            draw_window,
            state: FeedState::Uninitialized,
            sections: Vec::new(),
        }
    }

    pub fn client_id(&self) -> &str {
        self.ctx.client_id()
    }

    pub fn is_initialized(&self) -> bool {
        self.state == FeedState::Initialized
    }

    pub fn sections(&self) -> &[FeedSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Builds the head: one banner, then the fixed rows in order
    pub fn initialize(
        &mut self,
        banner_items: Vec<MediaItem>,
        fixed_rows: Vec<FixedRow>,
    ) -> AppResult<&[FeedSection]> {
        if self.state == FeedState::Initialized {
            return Err(AppError::FeedState(
                "Feed is already initialized".to_string(),
            ));
        }

        self.sections.push(FeedSection::Banner {
            items: banner_items,
        });
        self.sections
            .extend(fixed_rows.into_iter().map(FeedSection::from));
        self.state = FeedState::Initialized;

        Ok(self.sections.as_slice())
    }

    /// Appends `n` personalized rows and returns just those rows
    pub async fn grow(&mut self, n: usize) -> AppResult<Vec<FeedSection>> {
        self.ensure_initialized()?;

        let ranked = self.ranker.rank(&self.ctx, &self.catalog).await;
        let mut rng = rand::thread_rng();
        let added = self.grow_with(&ranked, n, &mut rng)?;

        tracing::info!(
            client_id = %self.ctx.client_id(),
            added = added.len(),
            total = self.sections.len(),
            "Feed grown"
        );

        Ok(added)
    }

    /// Draws `n` categories uniformly, with replacement, from the top of `ranked`
    /// (all of it unless a draw window is set)
    pub fn grow_with<R: Rng + ?Sized>(
        &mut self,
        ranked: &[Category],
        n: usize,
        rng: &mut R,
    ) -> AppResult<Vec<FeedSection>> {
        self.ensure_initialized()?;

        let window = match self.draw_window {
            0 => ranked.len(),
            n => n.min(ranked.len()),
        };
        if window == 0 {
            return Ok(Vec::new());
        }

        let added: Vec<FeedSection> = (0..n)
            .map(|_| FeedSection::personalized(&ranked[rng.gen_range(0..window)]))
            .collect();

        self.sections.extend(added.iter().cloned());
        Ok(added)
    }

    fn ensure_initialized(&self) -> AppResult<()> {
        match self.state {
            FeedState::Initialized => Ok(()),
            FeedState::Uninitialized => Err(AppError::FeedNotInitialized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_catalog, ContentKind, PreferenceCounter};
    use crate::services::context::testing::memory_context;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn item(id: u64) -> MediaItem {
        serde_json::from_value(serde_json::json!({ "id": id, "title": format!("t{}", id) }))
            .unwrap()
    }

    fn grower(catalog: Vec<Category>, window: usize) -> FeedGrower {
        let (ctx, _store) = memory_context();
        FeedGrower::new(ctx, Arc::new(catalog), window)
    }

    fn head() -> (Vec<MediaItem>, Vec<FixedRow>) {
        (
            vec![item(1), item(2)],
            vec![
                FixedRow::new("Coming Soon", ContentKind::Movie, vec![item(3)]),
                FixedRow::new("Trending Series", ContentKind::Tv, vec![item(4)]),
            ],
        )
    }

    #[tokio::test]
    async fn test_grow_before_initialize_is_rejected() {
        let mut feed = grower(default_catalog(), 8);
        let result = feed.grow(2).await;
        assert!(matches!(result, Err(AppError::FeedNotInitialized)));
        assert!(feed.is_empty());
    }

    #[test]
    fn test_second_initialize_is_rejected() {
        let mut feed = grower(default_catalog(), 8);
        let (banner, rows) = head();
        feed.initialize(banner.clone(), rows.clone()).unwrap();

        assert!(matches!(
            feed.initialize(banner, rows),
            Err(AppError::FeedState(_))
        ));
        assert_eq!(feed.len(), 3);
    }

    #[tokio::test]
    async fn test_growth_appends_and_keeps_head() {
        let mut feed = grower(default_catalog(), 8);
        let (banner, rows) = head();
        let initial = feed.initialize(banner, rows).unwrap().to_vec();
        assert_eq!(initial.len(), 3);
        assert!(matches!(initial[0], FeedSection::Banner { .. }));

        let first = feed.grow(2).await.unwrap();
        let second = feed.grow(2).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(feed.len(), 7);
        assert_eq!(&feed.sections()[..3], &initial[..]);
        assert_eq!(&feed.sections()[3..5], &first[..]);
        assert_eq!(&feed.sections()[5..], &second[..]);
    }

    #[test]
    fn test_repeated_category_gets_distinct_tokens() {
        let single = vec![Category::new(27, "Horror Hits", ContentKind::Movie)];
        let mut feed = grower(single.clone(), 8);
        let (banner, rows) = head();
        feed.initialize(banner, rows).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let added = feed.grow_with(&single, 5, &mut rng).unwrap();

        let tokens: HashSet<_> = added.iter().filter_map(|s| s.draw_token()).collect();
        assert_eq!(added.len(), 5);
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_draws_stay_within_window() {
        let catalog = default_catalog();
        let mut feed = grower(catalog.clone(), 3);
        let (banner, rows) = head();
        feed.initialize(banner, rows).unwrap();

        let allowed: HashSet<_> = catalog[..3].iter().map(|c| c.id).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let added = feed.grow_with(&catalog, 100, &mut rng).unwrap();

        for section in added {
            match section {
                FeedSection::PersonalizedRow { category_id, .. } => {
                    assert!(allowed.contains(&category_id))
                }
                other => panic!("unexpected section {:?}", other),
            }
        }
    }

    #[test]
    fn test_full_window_reaches_unseen_categories() {
        let catalog = default_catalog();
        let counter: PreferenceCounter = catalog[..8].iter().map(|c| (c.id, 50)).collect();
        let mut feed = grower(catalog.clone(), 0);
        let (banner, rows) = head();
        feed.initialize(banner, rows).unwrap();

        let mut rng = StdRng::seed_from_u64(17);
        let mut drawn = HashSet::new();
        for _ in 0..2000 {
            let ranked = GenreRanker::rank_with(&counter, &catalog, &mut rng);
            for section in feed.grow_with(&ranked, 2, &mut rng).unwrap() {
                if let FeedSection::PersonalizedRow { category_id, .. } = section {
                    drawn.insert(category_id);
                }
            }
        }

        assert_eq!(drawn.len(), catalog.len());
    }

    #[test]
    fn test_zero_growth_and_empty_catalog() {
        let mut feed = grower(Vec::new(), 8);
        let (banner, rows) = head();
        feed.initialize(banner, rows).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(feed.grow_with(&[], 2, &mut rng).unwrap().is_empty());

        let catalog = default_catalog();
        assert!(feed.grow_with(&catalog, 0, &mut rng).unwrap().is_empty());
        assert_eq!(feed.len(), 3);
    }
}
