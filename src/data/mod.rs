/// Data layer: core types, loading, and querying.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + normalize → TrackTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ TrackTable  │  Vec<Track>, genre/year facets
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  filters, rankings, aggregates → derived tables
///   └──────────┘
/// ```
///
/// The loaded table is immutable; every filter or ranking returns a new
/// derived table, so views are always recomputable from the base.

pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
