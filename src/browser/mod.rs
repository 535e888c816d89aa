//! Query engine over a frozen survey-review snapshot.
//!
//! Every query returns a new [`DataBrowser`]; the view it was called on is
//! never touched.  Views share the underlying entities through `Arc`.
//!
//! ```text
//!   DataBrowser::new(dataset)
//!        │
//!        ├── filtered(f)     → narrowed view (aggregates + questions)
//!        ├── per_question()  → one view per question
//!        ├── per_product()   → one view per product, stamped with it
//!        ├── intersection()  → aggregates answered by both products
//!        └── groups()        → questions ranked by diff score
//! ```

pub mod diff;

use std::borrow::Borrow;
use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::data::filter::AggregateFilter;
use crate::data::model::{
    Aggregate, BusinessStats, Category, CategoryId, Dataset, Product, ProductId, ProductPair,
    Question, QuestionId,
};
use crate::data::validate::{self, IntegrityWarning};
use crate::distribution::{self, HistogramBucket, ResponseDot};

pub use diff::{Completeness, DiffScore, QuestionGroup, compute_diff};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowseError {
    #[error("intersection needs exactly two products, view has {count}")]
    NotAPair { count: usize },
}

// ---------------------------------------------------------------------------
// ViewOverrides – partial replacement of a view's collections
// ---------------------------------------------------------------------------

/// Collections to replace when deriving a view.  `None` keeps the
/// current view's value.
#[derive(Debug, Clone, Default)]
pub struct ViewOverrides {
    pub products: Option<Arc<[Product]>>,
    pub questions: Option<Arc<[Arc<Question>]>>,
    pub business_stats: Option<Arc<BusinessStats>>,
    pub categories: Option<Arc<[Category]>>,
    pub aggregates: Option<Arc<[Arc<Aggregate>]>>,
}

// ---------------------------------------------------------------------------
// DataBrowser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DataBrowser {
    id: u32,
    products: Arc<[Product]>,
    questions: Arc<[Arc<Question>]>,
    business_stats: Arc<BusinessStats>,
    categories: Arc<[Category]>,
    aggregates: Arc<[Arc<Aggregate>]>,
    /// Set by `per_product()` only; never carried into further derivations.
    selected_product: Option<Product>,
}

impl DataBrowser {
    pub fn new(dataset: Dataset) -> Self {
        let Dataset {
            products,
            questions,
            business_stats,
            categories,
            aggregates,
        } = dataset;

        Self::from_parts(
            products.into(),
            questions.into_iter().map(Arc::new).collect(),
            Arc::new(business_stats),
            categories.into(),
            aggregates.into_iter().map(Arc::new).collect(),
        )
    }

    fn from_parts(
        products: Arc<[Product]>,
        questions: Arc<[Arc<Question>]>,
        business_stats: Arc<BusinessStats>,
        categories: Arc<[Category]>,
        aggregates: Arc<[Arc<Aggregate>]>,
    ) -> Self {
        DataBrowser {
            id: rand::random::<u32>() % 1_000_000,
            products,
            questions,
            business_stats,
            categories,
            aggregates,
            selected_product: None,
        }
    }

    /// Derive a new view, replacing only the collections given in `overrides`.
    pub fn clone_with(&self, overrides: ViewOverrides) -> DataBrowser {
        let ViewOverrides {
            products,
            questions,
            business_stats,
            categories,
            aggregates,
        } = overrides;

        Self::from_parts(
            products.unwrap_or_else(|| Arc::clone(&self.products)),
            questions.unwrap_or_else(|| Arc::clone(&self.questions)),
            business_stats.unwrap_or_else(|| Arc::clone(&self.business_stats)),
            categories.unwrap_or_else(|| Arc::clone(&self.categories)),
            aggregates.unwrap_or_else(|| Arc::clone(&self.aggregates)),
        )
    }

    // -- accessors --

    /// Random instance id in `0..1_000_000`, for presentation-side keys only.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    pub fn business_stats(&self) -> &BusinessStats {
        &self.business_stats
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn aggregates(&self) -> &[Arc<Aggregate>] {
        &self.aggregates
    }

    /// The product this view was sliced to by `per_product()`.
    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }

    // -- filtering --

    /// Aggregates matching every constraint of `filter`, in original order.
    pub fn filter(&self, filter: &AggregateFilter) -> Vec<Arc<Aggregate>> {
        self.aggregates
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// A view holding the matching aggregates and exactly the questions
    /// they reference (in the current question order).
    pub fn filtered(&self, filter: &AggregateFilter) -> DataBrowser {
        let aggregates = self.filter(filter);
        let question_ids: HashSet<QuestionId> = aggregates.iter().map(|a| a.question_id).collect();
        let questions: Vec<Arc<Question>> = self
            .questions
            .iter()
            .filter(|q| question_ids.contains(&q.id))
            .cloned()
            .collect();

        log::debug!(
            "filtered [{filter}]: {} → {} aggregates, {} questions",
            self.aggregates.len(),
            aggregates.len(),
            questions.len()
        );

        self.clone_with(ViewOverrides {
            aggregates: Some(aggregates.into()),
            questions: Some(questions.into()),
            ..ViewOverrides::default()
        })
    }

    // -- per-entity views --

    /// Distinct question ids in question order.
    pub fn question_ids(&self) -> Vec<QuestionId> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|q| q.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// One view per question, including questions without aggregates.
    pub fn per_question(&self) -> Vec<DataBrowser> {
        self.question_ids()
            .into_iter()
            .map(|id| self.filtered(&AggregateFilter::new().question(id)))
            .collect()
    }

    /// One view per product, in product order, each stamped with its product.
    pub fn per_product(&self) -> Vec<DataBrowser> {
        self.products
            .iter()
            .map(|product| {
                let mut view = self.filtered(&AggregateFilter::new().product(product.id));
                view.selected_product = Some(product.clone());
                view
            })
            .collect()
    }

    pub fn product_for(&self, aggregate: &Aggregate) -> Option<&Product> {
        self.products.iter().find(|p| p.id == aggregate.product_id)
    }

    // -- intersection --

    /// Aggregates whose question has data for both products of the pair.
    pub fn intersection(&self) -> Result<Vec<Arc<Aggregate>>, BrowseError> {
        let views = self.per_product();
        let [left, right] = views.as_slice() else {
            return Err(BrowseError::NotAPair { count: views.len() });
        };

        let answered = |view: &DataBrowser| -> HashSet<QuestionId> {
            view.aggregates.iter().map(|a| a.question_id).collect()
        };
        let left_ids = answered(left);
        let right_ids = answered(right);

        Ok(self
            .aggregates
            .iter()
            .filter(|a| left_ids.contains(&a.question_id) && right_ids.contains(&a.question_id))
            .cloned()
            .collect())
    }

    // -- grouping & ranking --

    /// Every question compared across products, ranked by descending `sort`.
    /// Ties keep question order.
    pub fn groups(&self) -> Vec<QuestionGroup> {
        let views = self.per_product();

        let mut groups: Vec<QuestionGroup> = self
            .questions
            .iter()
            .map(|question| {
                let row = views
                    .iter()
                    .map(|view| {
                        view.aggregates
                            .iter()
                            .find(|a| a.question_id == question.id)
                            .cloned()
                    })
                    .collect();
                QuestionGroup::new(Arc::clone(question), row)
            })
            .collect();

        // `sort_by` is stable.
        groups.sort_by(|a, b| b.sort.total_cmp(&a.sort));
        log::debug!("ranked {} question groups", groups.len());
        groups
    }

    /// See [`diff::compute_diff`].
    pub fn compute_diff(values: &[Option<f64>], smaller_is_better: bool) -> DiffScore {
        compute_diff(values, smaller_is_better)
    }

    // -- naming & lookup --

    /// The fixed two-slot form of the products, when there are exactly two.
    pub fn pair(&self) -> Option<ProductPair> {
        match &*self.products {
            [left, right] => Some(ProductPair {
                left: left.clone(),
                right: right.clone(),
            }),
            _ => None,
        }
    }

    pub fn product_name(&self, id: ProductId) -> Option<&str> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    pub fn question_name(&self, id: QuestionId) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.text_template.as_str())
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    // -- distributions --

    pub fn histogram(&self, buckets: &[i64]) -> Vec<HistogramBucket> {
        distribution::histogram(&self.aggregates[..], buckets)
    }

    pub fn expand(&self) -> Vec<ResponseDot> {
        distribution::expand(&self.aggregates[..])
    }

    // -- integrity --

    /// Report dangling references in this view, logging each one.
    pub fn validate(&self) -> Vec<IntegrityWarning> {
        let warnings = validate::validate(
            &self.products[..],
            &self.questions[..],
            &self.categories[..],
            &self.aggregates[..],
        );
        for w in &warnings {
            log::warn!("browser {}: {w}", self.id);
        }
        warnings
    }
}

impl<Q: Borrow<Question>> FromIterator<Q> for ViewOverrides {
    /// Overrides replacing only the question set.
    fn from_iter<I: IntoIterator<Item = Q>>(iter: I) -> Self {
        let questions: Vec<Arc<Question>> =
            iter.into_iter().map(|q| Arc::new(q.borrow().clone())).collect();
        ViewOverrides {
            questions: Some(questions.into()),
            ..ViewOverrides::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dataset;

    fn product(id: u64, name: &str) -> Product {
        Product { id: ProductId(id), name: name.into() }
    }

    fn question(id: u64, text: &str, smaller_is_better: bool) -> Question {
        Question {
            id: QuestionId(id),
            text_template: text.into(),
            smaller_is_better,
            category_id: Some(CategoryId(1)),
        }
    }

    fn agg(product: u64, question: u64, average: f64) -> Aggregate {
        Aggregate {
            product_id: ProductId(product),
            question_id: QuestionId(question),
            average,
            max: Some(5.0),
            review_count: 10,
            value: None,
            company_segment: None,
        }
    }

    /// Two products, four questions:
    /// q1 both answered, q2 only product 1, q3 only product 2, q4 nobody.
    fn sample() -> DataBrowser {
        DataBrowser::new(Dataset {
            products: vec![product(1, "Acme"), product(2, "Globex")],
            questions: vec![
                question(1, "Ease of use", false),
                question(2, "Setup time", true),
                question(3, "Support", false),
                question(4, "Docs", false),
            ],
            business_stats: serde_json::json!({"employees": 40}),
            categories: vec![Category { id: CategoryId(1), name: "Usability".into() }],
            aggregates: vec![
                agg(1, 1, 4.0),
                agg(2, 1, 3.0),
                agg(1, 2, 2.0),
                agg(2, 3, 4.5),
            ],
        })
    }

    #[test]
    fn id_is_below_one_million() {
        assert!(sample().id() < 1_000_000);
    }

    #[test]
    fn clone_with_defaults_to_current_fields() {
        let b = sample();
        let c = b.clone_with(ViewOverrides {
            aggregates: Some(Vec::new().into()),
            ..ViewOverrides::default()
        });
        assert!(c.aggregates().is_empty());
        assert_eq!(c.questions().len(), 4);
        assert!(Arc::ptr_eq(&b.products, &c.products));
        assert_eq!(c.business_stats()["employees"], 40);
        assert_eq!(b.aggregates().len(), 4);
    }

    #[test]
    fn clone_with_question_iterator() {
        let b = sample();
        let overrides: ViewOverrides = vec![question(9, "New", false)].into_iter().collect();
        let c = b.clone_with(overrides);
        assert_eq!(c.question_name(QuestionId(9)), Some("New"));
        assert_eq!(c.questions().len(), 1);
    }

    #[test]
    fn filter_is_stable_and_shares_entities() {
        let b = sample();
        let hits = b.filter(&AggregateFilter::new().product(ProductId(1)));
        let questions: Vec<u64> = hits.iter().map(|a| a.question_id.0).collect();
        assert_eq!(questions, vec![1, 2]);
        assert!(Arc::ptr_eq(&hits[0], &b.aggregates()[0]));
        assert_eq!(b.filter(&AggregateFilter::new()).len(), 4);
    }

    #[test]
    fn filtered_keeps_only_referenced_questions() {
        let view = sample().filtered(&AggregateFilter::new().product(ProductId(2)));
        let ids: Vec<u64> = view.questions().iter().map(|q| q.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(view.aggregates().len(), 2);
        assert_eq!(view.categories().len(), 1);
        assert!(view.selected_product().is_none());
    }

    #[test]
    fn per_question_yields_one_view_per_question() {
        let views = sample().per_question();
        assert_eq!(views.len(), 4);
        let counts: Vec<usize> = views.iter().map(|v| v.aggregates().len()).collect();
        assert_eq!(counts, vec![2, 1, 1, 0]);
        assert!(views[3].questions().is_empty());
    }

    #[test]
    fn per_question_skips_duplicate_ids() {
        let b = sample();
        let mut questions: Vec<Question> = b.questions().iter().map(|q| (**q).clone()).collect();
        questions.push(question(1, "Ease of use (again)", false));
        let dup = b.clone_with(questions.into_iter().collect());
        assert_eq!(dup.question_ids().len(), 4);
        assert_eq!(dup.per_question().len(), 4);
    }

    #[test]
    fn per_product_stamps_selected_product() {
        let views = sample().per_product();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].selected_product().map(|p| p.id), Some(ProductId(1)));
        assert_eq!(views[1].selected_product().map(|p| p.name.as_str()), Some("Globex"));

        let derived = views[0].filtered(&AggregateFilter::new());
        assert!(derived.selected_product().is_none());
    }

    #[test]
    fn product_for_handles_orphans() {
        let b = sample();
        assert_eq!(b.product_for(&agg(2, 1, 1.0)).map(|p| p.name.as_str()), Some("Globex"));
        assert!(b.product_for(&agg(7, 1, 1.0)).is_none());
    }

    #[test]
    fn intersection_keeps_questions_answered_by_both() {
        let hits = sample().intersection().unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|a| a.question_id == QuestionId(1)));
    }

    #[test]
    fn intersection_requires_a_pair() {
        let b = sample();
        let single = b.clone_with(ViewOverrides {
            products: Some(vec![product(1, "Acme")].into()),
            ..ViewOverrides::default()
        });
        assert_eq!(single.intersection(), Err(BrowseError::NotAPair { count: 1 }));
    }

    #[test]
    fn groups_rank_by_completeness_then_diff() {
        let groups = sample().groups();
        let order: Vec<u64> = groups.iter().map(|g| g.id.0).collect();
        // q1 complete (400 + 0.2), q2 main only (200 + 0.4),
        // q3 main missing (100 - 0.9), q4 main missing (100 + 0)
        assert_eq!(order, vec![1, 2, 4, 3]);

        assert_eq!(groups[0].completeness, Completeness::Complete);
        assert!((groups[0].diff - 0.2).abs() < 1e-9);
        assert_eq!(groups[1].completeness, Completeness::MainOnly);
        assert!((groups[1].sort - 200.4).abs() < 1e-9);
        assert!(groups[2].aggregates.iter().all(Option::is_none));
        assert_eq!(groups[3].normals, vec![None, Some(0.9)]);
    }

    #[test]
    fn groups_ties_keep_question_order() {
        let b = sample().clone_with(ViewOverrides {
            aggregates: Some(Vec::new().into()),
            ..ViewOverrides::default()
        });
        let order: Vec<u64> = b.groups().iter().map(|g| g.id.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn lookups_return_none_when_missing() {
        let b = sample();
        assert_eq!(b.question_name(QuestionId(3)), Some("Support"));
        assert_eq!(b.question_name(QuestionId(30)), None);
        assert_eq!(b.category_name(CategoryId(1)), Some("Usability"));
        assert_eq!(b.category_name(CategoryId(2)), None);
        assert_eq!(b.product_name(ProductId(1)), Some("Acme"));
        assert_eq!(b.product_name(ProductId(5)), None);
    }

    #[test]
    fn pair_only_for_two_products() {
        let b = sample();
        let pair = b.pair().unwrap();
        assert_eq!(pair.left.id, ProductId(1));
        assert_eq!(pair.right.id, ProductId(2));

        let single = b.clone_with(ViewOverrides {
            products: Some(vec![product(1, "Acme")].into()),
            ..ViewOverrides::default()
        });
        assert!(single.pair().is_none());
    }

    #[test]
    fn validate_flags_orphaned_aggregates() {
        let b = sample();
        let mut aggregates: Vec<Arc<Aggregate>> = b.aggregates().to_vec();
        aggregates.push(Arc::new(agg(3, 1, 1.0)));
        let broken = b.clone_with(ViewOverrides {
            aggregates: Some(aggregates.into()),
            ..ViewOverrides::default()
        });
        assert_eq!(
            broken.validate(),
            vec![IntegrityWarning::UnknownProduct { index: 4, product_id: ProductId(3) }]
        );
        assert!(b.validate().is_empty());
    }
}
