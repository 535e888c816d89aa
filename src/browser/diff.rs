use std::sync::Arc;

use serde::Serialize;

use crate::data::model::{Aggregate, Question, QuestionId};

// ---------------------------------------------------------------------------
// Completeness tiers
// ---------------------------------------------------------------------------

/// How much data backs a comparison.  The tier gap (100) dominates any
/// normalised diff, so fuller comparisons always rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// The reference product has no value.
    MainMissing,
    /// Only the reference product has a value.
    MainOnly,
    /// Reference present, some other products missing.
    Partial,
    /// Every product has a value.
    Complete,
}

impl Completeness {
    pub fn modifier(self) -> f64 {
        match self {
            Completeness::MainMissing => 100.0,
            Completeness::MainOnly => 200.0,
            Completeness::Partial => 300.0,
            Completeness::Complete => 400.0,
        }
    }
}

// ---------------------------------------------------------------------------
// DiffScore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffScore {
    /// Smallest gap between the reference and any other present product.
    pub diff: f64,
    /// Ranking key: `diff` (or the reference value when nothing compares)
    /// plus the completeness modifier.
    pub sort: f64,
    pub completeness: Completeness,
}

/// Score one row of normalised values.  Index 0 is the reference product.
///
/// Absent entries are skipped, never treated as zero; only the reference
/// falls back to `0.0` for arithmetic.
pub fn compute_diff(values: &[Option<f64>], smaller_is_better: bool) -> DiffScore {
    let main = values.first().copied().flatten();
    let first = main.unwrap_or(0.0);

    let diffs: Vec<f64> = values
        .iter()
        .skip(1)
        .flatten()
        .map(|&v| if smaller_is_better { v - first } else { first - v })
        .collect();

    let completeness = match main {
        None => Completeness::MainMissing,
        Some(_) if diffs.is_empty() => Completeness::MainOnly,
        Some(_) if diffs.len() == values.len() - 1 => Completeness::Complete,
        Some(_) => Completeness::Partial,
    };
    let modifier = completeness.modifier();

    match diffs.into_iter().reduce(f64::min) {
        Some(min) => DiffScore {
            diff: min,
            sort: min + modifier,
            completeness,
        },
        None => DiffScore {
            diff: 0.0,
            sort: first + modifier,
            completeness,
        },
    }
}

// ---------------------------------------------------------------------------
// QuestionGroup – one ranked row of `groups()`
// ---------------------------------------------------------------------------

/// Per-question comparison across products, aligned with `per_product()`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionGroup {
    pub id: QuestionId,
    pub question: Arc<Question>,
    /// One slot per product; `None` where the product has no data.
    pub aggregates: Vec<Option<Arc<Aggregate>>>,
    pub normals: Vec<Option<f64>>,
    pub diff: f64,
    pub sort: f64,
    pub completeness: Completeness,
}

impl QuestionGroup {
    pub(crate) fn new(question: Arc<Question>, aggregates: Vec<Option<Arc<Aggregate>>>) -> Self {
        let normals: Vec<Option<f64>> = aggregates
            .iter()
            .map(|a| a.as_ref().map(|a| a.normalized()))
            .collect();
        let score = compute_diff(&normals, question.smaller_is_better);

        QuestionGroup {
            id: question.id,
            question,
            aggregates,
            normals,
            diff: score.diff,
            sort: score.sort,
            completeness: score.completeness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn main_missing_is_lowest_tier() {
        let s = compute_diff(&[None, Some(0.5)], false);
        assert_eq!(s.completeness, Completeness::MainMissing);
        assert!((s.diff - -0.5).abs() < EPS);
        assert!((s.sort - 99.5).abs() < EPS);
    }

    #[test]
    fn complete_row_uses_first_minus_value() {
        let s = compute_diff(&[Some(0.5), Some(0.6)], false);
        assert_eq!(s.completeness, Completeness::Complete);
        assert!((s.diff - -0.1).abs() < EPS);
        assert!((s.sort - 399.9).abs() < EPS);
    }

    #[test]
    fn smaller_is_better_flips_sign() {
        let s = compute_diff(&[Some(0.5), Some(0.6)], true);
        assert!((s.diff - 0.1).abs() < EPS);
    }

    #[test]
    fn main_only_sorts_by_reference_value() {
        let s = compute_diff(&[Some(0.5)], false);
        assert_eq!(s.completeness, Completeness::MainOnly);
        assert_eq!(s.diff, 0.0);
        assert!((s.sort - 200.5).abs() < EPS);

        let s = compute_diff(&[Some(0.5), None, None], false);
        assert_eq!(s.completeness, Completeness::MainOnly);
        assert!((s.sort - 200.5).abs() < EPS);
    }

    #[test]
    fn partial_row_skips_missing_values() {
        let s = compute_diff(&[Some(0.5), None, Some(0.6)], false);
        assert_eq!(s.completeness, Completeness::Partial);
        assert!((s.diff - -0.1).abs() < EPS);
        assert!((s.sort - 299.9).abs() < EPS);
    }

    #[test]
    fn weakest_link_wins() {
        let s = compute_diff(&[Some(0.9), Some(0.2), Some(0.7)], false);
        assert!((s.diff - 0.2).abs() < EPS);
    }

    #[test]
    fn empty_row_is_main_missing() {
        let s = compute_diff(&[], false);
        assert_eq!(s.completeness, Completeness::MainMissing);
        assert_eq!(s.diff, 0.0);
        assert_eq!(s.sort, 100.0);
    }

    #[test]
    fn group_normalises_each_slot() {
        let question = Arc::new(Question {
            id: QuestionId(4),
            text_template: "Value for money".into(),
            smaller_is_better: false,
            category_id: None,
        });
        let agg = |average: f64, max: Option<f64>| {
            Arc::new(Aggregate {
                product_id: crate::data::model::ProductId(1),
                question_id: QuestionId(4),
                average,
                max,
                review_count: 1,
                value: None,
                company_segment: None,
            })
        };
        let group = QuestionGroup::new(question, vec![Some(agg(8.0, None)), Some(agg(3.0, Some(5.0)))]);
        assert_eq!(group.id, QuestionId(4));
        assert_eq!(group.normals, vec![Some(0.8), Some(0.6)]);
        assert!((group.diff - 0.2).abs() < EPS);
        assert_eq!(group.completeness, Completeness::Complete);
    }
}
