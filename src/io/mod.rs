//! Input/output helpers.
//!
//! - model artifact JSON read (`artifact`)
//! - batch customer CSV ingest + validation (`ingest`)
//! - scored results export (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
