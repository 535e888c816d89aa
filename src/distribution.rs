use std::borrow::Borrow;

use serde::Serialize;

use crate::data::model::Aggregate;

/// Rating buckets used when the caller has no scale of its own.
pub const DEFAULT_BUCKETS: [i64; 5] = [1, 2, 3, 4, 5];

fn as_aggregate<A: Borrow<Aggregate>>(a: &A) -> &Aggregate {
    a.borrow()
}

// ---------------------------------------------------------------------------
// Histogram – review count per answer value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBucket {
    pub bucket: i64,
    pub count: u64,
}

/// For each bucket, the `review_count` of the first aggregate whose `value`
/// equals it, or `0` when no aggregate carries that value.
pub fn histogram<A: Borrow<Aggregate>>(aggregates: &[A], buckets: &[i64]) -> Vec<HistogramBucket> {
    buckets
        .iter()
        .map(|&bucket| {
            let count = aggregates
                .iter()
                .map(as_aggregate)
                .find(|a| a.value == Some(bucket))
                .map_or(0, |a| a.review_count);
            HistogramBucket { bucket, count }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Expansion – one dot per individual review
// ---------------------------------------------------------------------------

/// A single review, as unfolded from a raw bucket aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDot {
    pub value: Option<i64>,
    pub company_segment: Option<String>,
    /// Position across the whole expansion.
    pub idx: usize,
}

/// Repeat each aggregate `review_count` times.
pub fn expand<A: Borrow<Aggregate>>(aggregates: &[A]) -> Vec<ResponseDot> {
    aggregates
        .iter()
        .map(as_aggregate)
        .flat_map(|a| {
            std::iter::repeat((a.value, &a.company_segment)).take(a.review_count as usize)
        })
        .enumerate()
        .map(|(idx, (value, segment))| ResponseDot {
            value,
            company_segment: segment.clone(),
            idx,
        })
        .collect()
}
