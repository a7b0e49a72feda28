/// Data layer: core types, loading/cleaning, memoization, and filtering.
///
/// Architecture:
/// ```text
///  eu_ecolabel_data.csv  (`;`-delimited)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  dedup → parse dates → drop invalid → derive year
///   └──────────┘   → validate columns  (failures → empty sentinel)
///        │
///        ▼
///   ┌──────────────┐
///   │ CleanedTable  │  Vec<LicenseRecord>, filter options, year range
///   └──────────────┘   (memoized per path by `cache`)
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country/group/year predicates → filtered indices
///   └──────────┘
/// ```
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
