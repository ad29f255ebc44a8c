/// Data layer: core types, loading, classification, and aggregation.
///
/// Architecture:
/// ```text
///  hyd_air_quality_<year>.{csv,parquet,json}
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read + tag + concat + melt + sort → AqiDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ AqiDataset  │  date-sorted observations, location/year index
///   └────────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐  ┌───────────┐
///   │ classify  │  │ aggregate  │  band filter + counts │ view-ready stats
///   └──────────┘  └───────────┘
/// ```
pub mod aggregate;
pub mod classify;
pub mod loader;
pub mod model;
