//! Domain model shared across the pipeline, storage, and CLI layers

pub mod types;

pub use types::*;
