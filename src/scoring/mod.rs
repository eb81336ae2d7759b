//! The scoring core.
//!
//! Responsibilities:
//!
//! - map a form submission onto the model's record shape (`normalize`)
//! - call the predictor and classify its failures (`invoke`)
//! - bucket the CLV and derive secondary metrics (`classify`)

pub mod classify;
pub mod invoke;
pub mod normalize;

pub use classify::*;
pub use invoke::*;
pub use normalize::*;
