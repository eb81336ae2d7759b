//! Form input -> model record.
//!
//! The only non-trivial step is the frequency label, which the model was
//! trained on as a string-encoded ordinal rank.

use crate::domain::{ModelRecord, RawInput};

/// Frequency label -> ordinal rank.
///
/// Labels outside this table pass through unchanged, which also makes the
/// transform idempotent: a rank (`"3"`) is never a key.
const FREQUENCY_RANKS: [(&str, &str); 4] = [("Single", "1"), ("Low", "2"), ("Medium", "3"), ("High", "4")];

/// Encode a frequency label as the model's ordinal rank.
pub fn encode_frequency(label: &str) -> String {
    FREQUENCY_RANKS
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, rank)| (*rank).to_string())
        .unwrap_or_else(|| label.to_string())
}

/// Build the record handed to the predictor.
///
/// Ranges are trusted: the form and CLI already bound every field.
pub fn normalize(raw: &RawInput) -> ModelRecord {
    ModelRecord {
        creation_month: raw.creation_month,
        plan: raw.plan,
        country: raw.country,
        monthly_amount: raw.monthly_amount,
        recency: raw.recency,
        frequency: encode_frequency(&raw.frequency),
        age: f64::from(raw.age),
        is_foreign: u8::from(raw.foreign),
    }
}
