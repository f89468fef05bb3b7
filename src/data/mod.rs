//! Data layer: table types, loading, filtering, summaries and export.
//!
//! Architecture:
//! ```text
//!       .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (cached once per session)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSpec predicates → filtered Dataset
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │ summary   │   │  export   │  filtered Dataset → CSV
//!   └──────────┘   └──────────┘
//!   rates, cross-tabs, box stats, histograms, correlation
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
