//! Reporting utilities: chart titles and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the series/transform code stays clean and testable
//! - output changes are localized (important for snapshot tests)

pub mod format;

pub use format::{chart_title, format_key_table, format_run_summary};
