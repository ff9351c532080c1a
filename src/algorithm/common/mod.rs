//! Common modules shared by the search commands
//!
//! - Diagnostic counters for tracking scan statistics

pub mod diagnostics;
