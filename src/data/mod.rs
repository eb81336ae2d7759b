//! Remote data: one-time retrieval of the model artifact.

pub mod fetch;

pub use fetch::*;
