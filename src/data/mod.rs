/// Data layer: schema, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, resolve schema → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  size == s ∧ gender == g ∧ age ∈ [lo, hi] → Subset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ aggregate, stats │  counts, grouped sums, correlation, describe
///   └─────────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;

#[cfg(test)]
pub mod fixtures;
