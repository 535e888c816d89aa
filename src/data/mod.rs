/// Data layer: core types, loading, filtering and integrity checks.
///
/// Architecture:
/// ```text
///  .json dataset / .csv aggregates
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  products, questions, categories, aggregates
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  filter   │   │ validate │  dangling ids → warnings
///   └──────────┘   └──────────┘
///   field equalities → matching aggregates
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod validate;
