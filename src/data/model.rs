use std::fmt;

use serde::{Deserialize, Serialize};

/// Divisor used by [`Aggregate::normalized`] when `max` is absent or zero.
pub const NORMALIZE_FALLBACK_MAX: f64 = 10.0;

// ---------------------------------------------------------------------------
// Typed ids
// ---------------------------------------------------------------------------

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }
    };
}

id_newtype!(
    /// Identifies a [`Product`].
    ProductId
);
id_newtype!(
    /// Identifies a [`Question`].
    QuestionId
);
id_newtype!(
    /// Identifies a [`Category`].
    CategoryId
);

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A product taking part in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

/// One question of the shared question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text_template: String,
    /// Flips the sign convention of the diff score.
    #[serde(default)]
    pub smaller_is_better: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Opaque business statistics, carried through every view untouched.
pub type BusinessStats = serde_json::Value;

/// A precomputed statistic for one (product, question) pair, or in raw
/// bucket form one (product, value, segment) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub product_id: ProductId,
    pub question_id: QuestionId,
    pub average: f64,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub review_count: u64,
    /// Answer value of a raw bucket (e.g. a 1..=5 rating).
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub company_segment: Option<String>,
}

impl Aggregate {
    /// `average / max`, falling back to [`NORMALIZE_FALLBACK_MAX`] when `max`
    /// is unset or zero.
    pub fn normalized(&self) -> f64 {
        let divisor = match self.max {
            Some(max) if max != 0.0 => max,
            _ => NORMALIZE_FALLBACK_MAX,
        };
        self.average / divisor
    }
}

// ---------------------------------------------------------------------------
// ProductPair – pairwise addressing
// ---------------------------------------------------------------------------

/// The two products of a head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPair {
    pub left: Product,
    pub right: Product,
}

impl ProductPair {
    /// Name of whichever side carries `id`.
    pub fn name_of(&self, id: ProductId) -> Option<&str> {
        if id == self.left.id {
            Some(&self.left.name)
        } else if id == self.right.id {
            Some(&self.right.name)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded snapshot
// ---------------------------------------------------------------------------

/// Everything a [`DataBrowser`](crate::browser::DataBrowser) is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub products: Vec<Product>,
    pub questions: Vec<Question>,
    #[serde(alias = "businessStats")]
    pub business_stats: BusinessStats,
    pub categories: Vec<Category>,
    pub aggregates: Vec<Aggregate>,
}

impl Dataset {
    /// Number of aggregates.
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Whether the dataset has no aggregates.
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}
