//! File input/output: dataset ingest, abbreviation map, CSV export.

pub mod abbrev;
pub mod export;
pub mod ingest;
