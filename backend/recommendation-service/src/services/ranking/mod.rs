use crate::models::{ItemId, RankedItem, UserId};
use crate::services::factorization::FactorModel;

/// Number of items returned when the caller gives no limit
pub const DEFAULT_TOP_N: usize = 5;

/// Score every candidate for `user_id` and keep the best `n`
pub fn rank(
    model: &FactorModel,
    user_id: UserId,
    candidates: &[ItemId],
    n: usize,
) -> Vec<RankedItem> {
    let scored = candidates
        .iter()
        .map(|&item_id| RankedItem {
            item_id,
            score: model.predict(user_id, item_id),
        })
        .collect();

    top_n(scored, n)
}

/// Descending by score; equal scores keep their input order
pub fn top_n(mut scored: Vec<RankedItem>, n: usize) -> Vec<RankedItem> {
    // sort_by is stable, which gives the first-seen tie-break
    // Note: NaN scores are treated as equal to everything
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(n);
    scored
}
