//! Window hashing used by the index build and the search scan.

pub mod window_hash;

pub use window_hash::{
    HashFunctionFactory, RollingKmerFactory, RollingKmerHash, WindowHashFunction,
    MAX_WINDOW_SIZE,
};
