//! The series pipeline core: extraction and transformation.
//!
//! Data flow per key: `extract` filters and sorts the raw records into a
//! (date, value) series; `transform` applies differencing, start-date
//! trimming, and centered moving-average smoothing, in that order.

pub mod extract;
pub mod transform;

pub use extract::extract;
pub use transform::transform;
