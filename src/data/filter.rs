use std::collections::BTreeMap;
use std::fmt;

use super::model::{Aggregate, ProductId, QuestionId};

// ---------------------------------------------------------------------------
// Filterable fields of an aggregate
// ---------------------------------------------------------------------------

/// The aggregate fields that can be matched by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AggregateField {
    ProductId,
    QuestionId,
    Value,
    CompanySegment,
    ReviewCount,
}

/// Expected value for one [`AggregateField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Product(ProductId),
    Question(QuestionId),
    Value(i64),
    Segment(String),
    Count(u64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Product(id) => write!(f, "product {id}"),
            FieldValue::Question(id) => write!(f, "question {id}"),
            FieldValue::Value(v) => write!(f, "{v}"),
            FieldValue::Segment(s) => write!(f, "{s}"),
            FieldValue::Count(c) => write!(f, "{c}"),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateFilter – AND over field equalities
// ---------------------------------------------------------------------------

/// Equality constraints on aggregate fields, combined with AND.
/// An empty filter matches every aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateFilter {
    fields: BTreeMap<AggregateField, FieldValue>,
}

impl AggregateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, id: ProductId) -> Self {
        self.fields
            .insert(AggregateField::ProductId, FieldValue::Product(id));
        self
    }

    pub fn question(mut self, id: QuestionId) -> Self {
        self.fields
            .insert(AggregateField::QuestionId, FieldValue::Question(id));
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.fields
            .insert(AggregateField::Value, FieldValue::Value(value));
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.fields.insert(
            AggregateField::CompanySegment,
            FieldValue::Segment(segment.into()),
        );
        self
    }

    pub fn review_count(mut self, count: u64) -> Self {
        self.fields
            .insert(AggregateField::ReviewCount, FieldValue::Count(count));
        self
    }

    /// Whether no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The constraint on `field`, if any.
    pub fn get(&self, field: AggregateField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Return `true` when `aggregate` satisfies every constraint.
    ///
    /// An aggregate lacking an optional field (`value`, `company_segment`)
    /// never satisfies a constraint on that field.
    pub fn matches(&self, aggregate: &Aggregate) -> bool {
        self.fields.iter().all(|(field, expected)| {
            match (field, expected) {
                (AggregateField::ProductId, FieldValue::Product(id)) => aggregate.product_id == *id,
                (AggregateField::QuestionId, FieldValue::Question(id)) => {
                    aggregate.question_id == *id
                }
                (AggregateField::Value, FieldValue::Value(v)) => aggregate.value == Some(*v),
                (AggregateField::CompanySegment, FieldValue::Segment(s)) => {
                    aggregate.company_segment.as_deref() == Some(s.as_str())
                }
                (AggregateField::ReviewCount, FieldValue::Count(c)) => aggregate.review_count == *c,
                // The builder never pairs a field with a foreign value kind.
                _ => false,
            }
        })
    }
}

impl fmt::Display for AggregateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "<all>");
        }
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, value)| format!("{field:?}={value}"))
            .collect();
        write!(f, "{}", parts.join(" & "))
    }
}
