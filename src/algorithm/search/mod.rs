//! Segment search: index one collection, scan another against it.

pub mod args;
pub mod build;
pub mod engine;
pub mod scanner;
pub mod writer;

pub use args::SearchArgs;
pub use build::{add_sequences, build_index};
pub use engine::{run, search_segments};
pub use scanner::TemplateScanner;
pub use writer::{RegionWriter, SegmentBuffer};
