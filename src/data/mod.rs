//! Synthetic dataset generation for demos and manual testing.

pub mod sample;

pub use sample::{generate_sample, write_sample_dataset, SampleConfig, SampleData};
