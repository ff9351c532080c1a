pub mod search;

pub use search::{SearchConfig, DEFAULT_THREAD_MULTIPLIER, DEFAULT_WORD_SIZE};
