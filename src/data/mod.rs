/// Data layer: core types, loading, filtering and background loads.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv / .json   (path or URL)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse first sheet → Dataset
///   └──────────┘      (worker: runs it off the UI thread)
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  columns + immutable Vec<Row>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  null / non-null predicate → FilteredView (row indices)
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod worker;
