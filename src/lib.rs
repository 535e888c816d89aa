//! Comparative survey-review query engine.
//!
//! Build a [`DataBrowser`] from a [`Dataset`], then derive narrower views
//! with `filtered`, `per_question`, `per_product`, `intersection` and rank
//! questions by how much the products' answers diverge with `groups`.

pub mod browser;
pub mod color;
pub mod data;
pub mod distribution;

pub use browser::{BrowseError, DataBrowser, QuestionGroup, ViewOverrides};
pub use data::filter::AggregateFilter;
pub use data::model::Dataset;
