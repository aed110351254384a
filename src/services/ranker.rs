use rand::Rng;

use crate::{
    models::{Category, PreferenceCounter},
    services::{tracker::load_counter, ClientContext},
};

/// Orders the catalog by interaction count, with jitter
///
/// Each category gets one perturbed score, its count plus a uniform draw in
/// `[-0.5, 0.5)`, and the catalog is sorted by that score, highest first.
/// Categories within one interaction of each other trade places freely while
/// large gaps almost never invert.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreRanker;

impl GenreRanker {
    pub fn new() -> Self {
        Self
    }

    /// Ranks `catalog` against the client's stored counter
    pub async fn rank(&self, ctx: &ClientContext, catalog: &[Category]) -> Vec<Category> {
        let counter = load_counter(ctx).await;
        let mut rng = rand::thread_rng();
        Self::rank_with(&counter, catalog, &mut rng)
    }

    /// Returns a permutation of `catalog`; neither input is modified
    pub fn rank_with<R: Rng + ?Sized>(
        counter: &PreferenceCounter,
        catalog: &[Category],
        rng: &mut R,
    ) -> Vec<Category> {
        let mut scored: Vec<(f64, &Category)> = catalog
            .iter()
            .map(|category| {
                let jitter: f64 = rng.gen_range(-0.5..0.5);
                (counter.score(category.id) as f64 + jitter, category)
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored.into_iter().map(|(_, category)| category.clone()).collect()
    }
}
