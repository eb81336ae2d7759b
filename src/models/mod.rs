//! Model provider.
//!
//! - the `Predictor` seam the scoring core calls through
//! - the portable linear CLV scorer evaluated from a JSON artifact
//! - the process-wide, load-once `ModelStore`

pub mod linear;
pub mod predictor;
pub mod store;

pub use linear::*;
pub use predictor::*;
pub use store::*;
