//! Linear CLV scorer evaluated from a portable JSON artifact.
//!
//! The training process exports its fitted pipeline as:
//!
//! ```text
//! clv = inverse_target(intercept + Σ w_num · x_num + Σ w_level · 1[column == level])
//! ```
//!
//! Categorical columns are one-hot encoded against the levels listed in the
//! artifact. The coefficient layout is flattened once at load time into a
//! single weight vector so each prediction is one dot product.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::ModelRecord;
use crate::models::{ModelError, Predictor};

pub const ARTIFACT_FORMAT: &str = "clv-linear/v1";

/// Transform applied to the linear score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The score is the CLV.
    #[default]
    Identity,
    /// The model was trained on `ln(1 + clv)`.
    Log1p,
}

/// What to do with a categorical level the artifact does not list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLevel {
    #[default]
    Error,
    /// Encode as all-zeros (the reference level).
    Ignore,
}

/// On-disk artifact schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub format: String,
    pub name: String,
    #[serde(default)]
    pub trained_at: Option<String>,
    pub intercept: f64,
    /// Column -> coefficient.
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    /// Column -> level -> coefficient.
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub unknown_level: UnknownLevel,
}

#[derive(Debug, Clone)]
enum Feature {
    Numeric(String),
    Indicator { column: String, level: String },
}

/// A loaded, immutable linear predictor.
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    features: Vec<Feature>,
    weights: DVector<f64>,
    /// Known levels per categorical column.
    levels: Vec<(String, Vec<String>)>,
    target: Target,
    unknown_level: UnknownLevel,
}

impl LinearModel {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ModelError> {
        if artifact.format != ARTIFACT_FORMAT {
            return Err(ModelError::InvalidArtifact(format!(
                "unsupported format '{}' (expected '{ARTIFACT_FORMAT}')",
                artifact.format
            )));
        }
        if !artifact.intercept.is_finite() {
            return Err(ModelError::InvalidArtifact("non-finite intercept".to_string()));
        }

        let mut features = Vec::new();
        let mut weights = Vec::new();
        let mut levels = Vec::new();

        for (column, w) in artifact.numeric {
            check_finite(w, &column)?;
            features.push(Feature::Numeric(column));
            weights.push(w);
        }

        for (column, by_level) in artifact.categorical {
            if by_level.is_empty() {
                return Err(ModelError::InvalidArtifact(format!(
                    "categorical column '{column}' lists no levels"
                )));
            }
            let mut known = Vec::with_capacity(by_level.len());
            for (level, w) in by_level {
                check_finite(w, &format!("{column}={level}"))?;
                known.push(level.clone());
                features.push(Feature::Indicator {
                    column: column.clone(),
                    level,
                });
                weights.push(w);
            }
            levels.push((column, known));
        }

        Ok(Self {
            name: artifact.name,
            intercept: artifact.intercept,
            features,
            weights: DVector::from_vec(weights),
            levels,
            target: artifact.target,
            unknown_level: artifact.unknown_level,
        })
    }

    /// Number of encoded features (numeric columns + one-hot levels).
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Encode a record against this model's feature layout.
    pub fn design_row(&self, record: &ModelRecord) -> Result<DVector<f64>, ModelError> {
        for (column, known) in &self.levels {
            let level = categorical(record, column)?;
            if !known.iter().any(|k| *k == level) && self.unknown_level == UnknownLevel::Error {
                return Err(ModelError::UnknownLevel {
                    column: column.clone(),
                    level,
                });
            }
        }

        let mut row = DVector::zeros(self.features.len());
        for (i, feature) in self.features.iter().enumerate() {
            row[i] = match feature {
                Feature::Numeric(column) => record.numeric_value(column).ok_or_else(|| {
                    ModelError::SchemaMismatch(format!("column '{column}' has no numeric value"))
                })?,
                Feature::Indicator { column, level } => {
                    if categorical(record, column)? == *level {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
        }
        Ok(row)
    }
}

impl Predictor for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError> {
        let row = self.design_row(record)?;
        let score = self.intercept + self.weights.dot(&row);
        let clv = match self.target {
            Target::Identity => score,
            Target::Log1p => score.exp_m1(),
        };
        if !clv.is_finite() {
            return Err(ModelError::Internal(format!("score overflowed ({score})")));
        }
        Ok(clv)
    }
}

fn categorical(record: &ModelRecord, column: &str) -> Result<String, ModelError> {
    record
        .categorical_level(column)
        .ok_or_else(|| ModelError::SchemaMismatch(format!("column '{column}' is not categorical")))
}

fn check_finite(w: f64, what: &str) -> Result<(), ModelError> {
    if w.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidArtifact(format!("non-finite coefficient for '{what}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Plan, Recency};

    fn artifact() -> LinearArtifact {
        serde_json::from_str(
            r#"{
                "format": "clv-linear/v1",
                "name": "test-linear",
                "intercept": 100.0,
                "numeric": { "Monthly_Amount": 20.0, "Age": 5.0 },
                "categorical": {
                    "Frequency": { "1": 0.0, "2": 200.0, "3": 400.0, "4": 800.0 },
                    "Plan": { "Prepaid": 0.0, "Postpaid": 300.0, "Fiber": 350.0, "Business": 900.0 }
                }
            }"#,
        )
        .unwrap()
    }

    fn record() -> ModelRecord {
        ModelRecord {
            creation_month: 4,
            plan: Plan::Postpaid,
            country: Country::Morocco,
            monthly_amount: 59.0,
            recency: Recency::Recent,
            frequency: "1".to_string(),
            age: 25.0,
            is_foreign: 0,
        }
    }

    #[test]
    fn scores_numeric_and_one_hot_terms() {
        let model = LinearModel::from_artifact(artifact()).unwrap();
        assert_eq!(model.n_features(), 2 + 4 + 4);
        // 100 + 20*59 + 5*25 + 0 (freq 1) + 300 (postpaid)
        let clv = model.predict(&record()).unwrap();
        assert!((clv - 1705.0).abs() < 1e-9, "got {clv}");
    }

    #[test]
    fn unknown_level_is_a_schema_error_by_default() {
        let model = LinearModel::from_artifact(artifact()).unwrap();
        let mut r = record();
        r.frequency = "Weekly".to_string();
        let err = model.predict(&r).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownLevel {
                column: "Frequency".to_string(),
                level: "Weekly".to_string()
            }
        );
    }

    #[test]
    fn unknown_level_can_fall_back_to_reference() {
        let mut a = artifact();
        a.unknown_level = UnknownLevel::Ignore;
        let model = LinearModel::from_artifact(a).unwrap();
        let mut r = record();
        r.frequency = "Weekly".to_string();
        let clv = model.predict(&r).unwrap();
        assert!((clv - 1705.0).abs() < 1e-9);
    }

    #[test]
    fn log_target_is_inverted() {
        let a = LinearArtifact {
            format: ARTIFACT_FORMAT.to_string(),
            name: "log".to_string(),
            trained_at: None,
            intercept: 8.0_f64.ln_1p(),
            numeric: BTreeMap::new(),
            categorical: BTreeMap::new(),
            target: Target::Log1p,
            unknown_level: UnknownLevel::Error,
        };
        let model = LinearModel::from_artifact(a).unwrap();
        assert!((model.predict(&record()).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn column_missing_from_record_is_schema_mismatch() {
        let mut a = artifact();
        a.numeric.insert("Tenure".to_string(), 3.0);
        let model = LinearModel::from_artifact(a).unwrap();
        assert!(matches!(model.predict(&record()), Err(ModelError::SchemaMismatch(_))));
    }

    #[test]
    fn rejects_foreign_formats_and_bad_coefficients() {
        let mut a = artifact();
        a.format = "pickle".to_string();
        assert!(matches!(LinearModel::from_artifact(a), Err(ModelError::InvalidArtifact(_))));

        let mut a = artifact();
        a.numeric.insert("Age".to_string(), f64::NAN);
        assert!(matches!(LinearModel::from_artifact(a), Err(ModelError::InvalidArtifact(_))));
    }
}
