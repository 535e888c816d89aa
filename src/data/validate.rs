use std::borrow::Borrow;
use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{Aggregate, Category, CategoryId, Product, ProductId, Question, QuestionId};

/// A dangling reference found in a dataset. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityWarning {
    #[error("aggregate #{index} references unknown product {product_id}")]
    UnknownProduct { index: usize, product_id: ProductId },

    #[error("aggregate #{index} references unknown question {question_id}")]
    UnknownQuestion {
        index: usize,
        question_id: QuestionId,
    },

    #[error("question {question_id} references unknown category {category_id}")]
    UnknownCategory {
        question_id: QuestionId,
        category_id: CategoryId,
    },
}

/// Check every aggregate and question for references to missing entities.
///
/// Aggregate warnings come first, in aggregate order, then question warnings.
pub fn validate<Q, A>(
    products: &[Product],
    questions: &[Q],
    categories: &[Category],
    aggregates: &[A],
) -> Vec<IntegrityWarning>
where
    Q: Borrow<Question>,
    A: Borrow<Aggregate>,
{
    let product_ids: BTreeSet<ProductId> = products.iter().map(|p| p.id).collect();
    let question_ids: BTreeSet<QuestionId> = questions.iter().map(|q| q.borrow().id).collect();
    let category_ids: BTreeSet<CategoryId> = categories.iter().map(|c| c.id).collect();

    let mut warnings = Vec::new();

    for (index, agg) in aggregates.iter().enumerate() {
        let agg = agg.borrow();
        if !product_ids.contains(&agg.product_id) {
            warnings.push(IntegrityWarning::UnknownProduct {
                index,
                product_id: agg.product_id,
            });
        }
        if !question_ids.contains(&agg.question_id) {
            warnings.push(IntegrityWarning::UnknownQuestion {
                index,
                question_id: agg.question_id,
            });
        }
    }

    for question in questions {
        let question = question.borrow();
        if let Some(category_id) = question.category_id {
            if !category_ids.contains(&category_id) {
                warnings.push(IntegrityWarning::UnknownCategory {
                    question_id: question.id,
                    category_id,
                });
            }
        }
    }

    warnings
}
