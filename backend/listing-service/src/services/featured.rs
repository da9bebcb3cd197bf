//! Featured listing selection.
//!
//! Sellers pay to feature a listing; the amount paid buys a weight (1, 2 or
//! 3). Each request draws a fresh random subset of at most
//! [`FEATURED_LIMIT`] eligible listings where heavier listings are more
//! likely to appear, and more likely to appear early. The draw expands every
//! eligible item into `weight` slots, shuffles the slots uniformly and keeps
//! the first occurrence of each item.
//!
//! Alongside the featured set the service returns a "recent" feed: the
//! newest listings that are not eligible for featuring at all.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::db::ListingStore;
use crate::error::Result;
use crate::metrics::featured::{
    FEATURED_POOL_SIZE, FEATURED_REQUEST_TOTAL, FEATURED_SELECTION_DURATION_SECONDS,
};
use crate::models::Listing;

/// Maximum number of featured listings returned per request.
pub const FEATURED_LIMIT: usize = 6;

/// Maximum length of the recent (non-featured) feed.
pub const RECENT_LIMIT: i64 = 12;

/// Paid amount at or above which a listing gets weight 3.
pub const TIER_THREE_AMOUNT: f64 = 10_000.0;

/// Paid amount at or above which a listing gets weight 2.
pub const TIER_TWO_AMOUNT: f64 = 7_000.0;

/// Anything the selector can rank.
pub trait FeaturedCandidate {
    fn candidate_id(&self) -> Uuid;
    fn is_featured(&self) -> bool;
    fn featured_paid_amount(&self) -> f64;
}

impl FeaturedCandidate for Listing {
    fn candidate_id(&self) -> Uuid {
        self.id
    }

    fn is_featured(&self) -> bool {
        self.is_featured
    }

    fn featured_paid_amount(&self) -> f64 {
        self.featured_paid_amount
    }
}

/// Weight bought by a paid amount, `None` when nothing was paid.
///
/// Amounts below the 1-month price (5000) still get weight 1.
pub fn featured_weight(amount: f64) -> Option<usize> {
    if amount.is_nan() || amount <= 0.0 {
        return None;
    }
    if amount >= TIER_THREE_AMOUNT {
        Some(3)
    } else if amount >= TIER_TWO_AMOUNT {
        Some(2)
    } else {
        Some(1)
    }
}

pub fn is_eligible<T: FeaturedCandidate>(item: &T) -> bool {
    item.is_featured() && featured_weight(item.featured_paid_amount()).is_some()
}

/// Ids of every eligible item in `pool`, whether or not it gets selected.
pub fn eligible_ids<T: FeaturedCandidate>(pool: &[T]) -> HashSet<Uuid> {
    pool.iter()
        .filter(|item| is_eligible(*item))
        .map(|item| item.candidate_id())
        .collect()
}

/// Weighted random selection without replacement.
///
/// Returns `min(max_results, eligible)` distinct items. Ineligible items in
/// `pool` are skipped, so callers may pass an unfiltered slice.
pub fn select_featured<T, R>(pool: &[T], max_results: usize, rng: &mut R) -> Vec<T>
where
    T: FeaturedCandidate + Clone,
    R: Rng + ?Sized,
{
    if max_results == 0 {
        return Vec::new();
    }

    let mut slots: Vec<usize> = Vec::new();
    for (index, item) in pool.iter().enumerate() {
        if !item.is_featured() {
            continue;
        }
        if let Some(weight) = featured_weight(item.featured_paid_amount()) {
            slots.extend(std::iter::repeat(index).take(weight));
        }
    }

    slots.shuffle(rng);

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(max_results.min(slots.len()));
    for index in slots {
        let item = &pool[index];
        if seen.insert(item.candidate_id()) {
            selected.push(item.clone());
            if selected.len() == max_results {
                break;
            }
        }
    }
    selected
}

#[derive(Debug, Serialize)]
pub struct FeaturedFeed {
    pub featured: Vec<Listing>,
    pub recent: Vec<Listing>,
}

/// Assembles the featured and recent feeds from a [`ListingStore`].
#[derive(Clone)]
pub struct FeaturedService {
    store: Arc<dyn ListingStore>,
}

impl FeaturedService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Build the feed using a thread-local RNG seeded from OS entropy.
    pub async fn featured_feed(&self) -> Result<FeaturedFeed> {
        let start = Instant::now();
        let (pool, recent) = self.load_candidates().await?;
        let featured = select_featured(&pool, FEATURED_LIMIT, &mut rand::thread_rng());
        Ok(self.finish(featured, recent, pool.len(), start))
    }

    /// Same as [`featured_feed`](Self::featured_feed) with a caller-supplied RNG.
    pub async fn featured_feed_with_rng<R>(&self, rng: &mut R) -> Result<FeaturedFeed>
    where
        R: Rng + Send + ?Sized,
    {
        let start = Instant::now();
        let (pool, recent) = self.load_candidates().await?;
        let featured = select_featured(&pool, FEATURED_LIMIT, rng);
        Ok(self.finish(featured, recent, pool.len(), start))
    }

    async fn load_candidates(&self) -> Result<(Vec<Listing>, Vec<Listing>)> {
        let pool = self.store.find_eligible_featured().await.map_err(|e| {
            FEATURED_REQUEST_TOTAL.with_label_values(&["error"]).inc();
            e
        })?;
        let exclude = eligible_ids(&pool);
        let recent = self
            .store
            .find_recent_excluding(&exclude, RECENT_LIMIT)
            .await
            .map_err(|e| {
                FEATURED_REQUEST_TOTAL.with_label_values(&["error"]).inc();
                e
            })?;
        Ok((pool, recent))
    }

    fn finish(
        &self,
        featured: Vec<Listing>,
        recent: Vec<Listing>,
        pool_size: usize,
        start: Instant,
    ) -> FeaturedFeed {
        FEATURED_POOL_SIZE.observe(pool_size as f64);
        FEATURED_SELECTION_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());
        FEATURED_REQUEST_TOTAL.with_label_values(&["ok"]).inc();

        tracing::debug!(
            pool_size,
            featured = featured.len(),
            recent = recent.len(),
            "featured feed assembled"
        );

        FeaturedFeed { featured, recent }
    }
}
