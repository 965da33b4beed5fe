use crate::error::ServiceResult;
use crate::metrics;
use crate::services::counters::CounterStore;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Per-item view counting
#[derive(Clone)]
pub struct ViewCounter {
    store: Arc<dyn CounterStore>,
}

impl ViewCounter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Count one view of `item_id`, bumping its ranking score by the same amount.
    /// Returns the updated view count.
    pub async fn increment(&self, item_id: Uuid) -> ServiceResult<i64> {
        let views = self.store.increment_views(item_id).await?;
        metrics::record_image_view();
        debug!(item_id = %item_id, views, "view counted");
        Ok(views)
    }

    pub async fn views(&self, item_id: Uuid) -> ServiceResult<i64> {
        self.store.views(item_id).await
    }
}

/// Most-viewed items, highest first
#[derive(Clone)]
pub struct Ranking {
    store: Arc<dyn CounterStore>,
}

impl Ranking {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Up to `n` item ids ordered by score descending, ties broken by ascending id.
    pub async fn top_n(&self, n: usize) -> ServiceResult<Vec<Uuid>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let page = self.store.top_with_scores(n).await?;
        if page.len() < n {
            return Ok(order_ranking(page, Vec::new(), n));
        }

        // The page may have cut a run of equal scores. The lowest `n` ids of
        // that run are enough to decide which tied members make the cut.
        let cutoff = match page.last() {
            Some((_, score)) => *score,
            None => return Ok(Vec::new()),
        };
        let ties = self
            .store
            .ties_at(cutoff, n)
            .await?
            .into_iter()
            .map(|id| (id, cutoff))
            .collect();

        Ok(order_ranking(page, ties, n))
    }
}

/// Merge a top page with the members tied at its cutoff score and produce
/// a deterministic order: score descending, then id ascending.
pub fn order_ranking(page: Vec<(Uuid, f64)>, ties: Vec<(Uuid, f64)>, n: usize) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut entries: Vec<(Uuid, f64)> = page
        .into_iter()
        .chain(ties)
        .filter(|(id, _)| seen.insert(*id))
        .collect();

    entries.sort_by(|(a_id, a_score), (b_id, b_score)| {
        match b_score.total_cmp(a_score) {
            Ordering::Equal => a_id.cmp(b_id),
            other => other,
        }
    });

    entries.into_iter().take(n).map(|(id, _)| id).collect()
}
