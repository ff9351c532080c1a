pub mod algorithm;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod seed;
pub mod sequence;

pub use error::ScanError;
