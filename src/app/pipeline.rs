//! Shared scoring pipeline used by the CLI, batch, and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw input -> normalize -> predict -> classify/derive
//!
//! The front-ends then focus on presentation (printing, CSV, widgets).

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{ModelRecord, PredictionResult, RawInput};
use crate::error::ClvError;
use crate::io::ingest::CustomerRow;
use crate::models::Predictor;
use crate::scoring::{build_result, invoke, normalize};

/// All computed outputs of one submission.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutput {
    pub input: RawInput,
    pub record: ModelRecord,
    pub result: PredictionResult,
}

/// Outcome of one batch row.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub line: usize,
    pub customer_id: String,
    pub outcome: Result<PredictionResult, ClvError>,
}

/// Score one submission.
pub fn run_prediction(predictor: &dyn Predictor, input: &RawInput) -> Result<PredictionOutput, ClvError> {
    let record = normalize(input);
    let clv = invoke(predictor, &record)?;
    let result = build_result(clv, input.monthly_amount)?;

    debug!(
        model = predictor.name(),
        clv = result.clv,
        tier = result.tier.label(),
        "prediction"
    );

    Ok(PredictionOutput {
        input: input.clone(),
        record,
        result,
    })
}

/// Score many customers in parallel against one shared predictor.
///
/// Row order is preserved. Each row fails independently.
pub fn run_batch(predictor: &dyn Predictor, rows: &[CustomerRow]) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = rows
        .par_iter()
        .map(|row| BatchOutcome {
            line: row.line,
            customer_id: row.customer_id.clone(),
            outcome: run_prediction(predictor, &row.input).map(|out| out.result),
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.outcome.is_err()).count();
    info!(rows = outcomes.len(), failed, model = predictor.name(), "batch scored");
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Plan, Recency, Tier};
    use crate::models::ModelError;

    /// Returns the monthly amount times a fixed multiple.
    struct Multiple(f64);

    impl Predictor for Multiple {
        fn name(&self) -> &str {
            "multiple"
        }

        fn predict(&self, record: &ModelRecord) -> Result<f64, ModelError> {
            if record.frequency == "Weekly" {
                return Err(ModelError::UnknownLevel {
                    column: "Frequency".into(),
                    level: record.frequency.clone(),
                });
            }
            Ok(record.monthly_amount * self.0)
        }
    }

    fn input(frequency: &str, monthly_amount: f64) -> RawInput {
        RawInput {
            creation_month: 5,
            plan: Plan::Fiber,
            country: Country::France,
            monthly_amount,
            recency: Recency::Moderate,
            frequency: frequency.to_string(),
            age: 25,
            foreign: true,
        }
    }

    #[test]
    fn scores_single_submission() {
        let out = run_prediction(&Multiple(80.0), &input("High", 150.0)).unwrap();
        assert_eq!(out.record.frequency, "4");
        assert_eq!(out.record.is_foreign, 1);
        assert_eq!(out.result.clv, 12000.0);
        assert_eq!(out.result.tier, Tier::Vip);
        assert_eq!(out.result.metrics.annual_revenue, 1800.0);
    }

    #[test]
    fn zero_monthly_amount_is_rejected_after_prediction() {
        let err = run_prediction(&Multiple(1.0), &input("Low", 0.0)).unwrap_err();
        assert_eq!(err, ClvError::InvalidMonthlyAmount(0.0));
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let rows: Vec<CustomerRow> = (0..50)
            .map(|i| CustomerRow {
                line: i + 2,
                customer_id: format!("C{i}"),
                input: input(if i % 10 == 0 { "Weekly" } else { "Medium" }, 10.0 + i as f64),
            })
            .collect();

        let outcomes = run_batch(&Multiple(30.0), &rows);
        assert_eq!(outcomes.len(), 50);
        for (i, o) in outcomes.iter().enumerate() {
            assert_eq!(o.customer_id, format!("C{i}"));
            if i % 10 == 0 {
                assert!(matches!(o.outcome, Err(ClvError::PredictionFailed(_))));
            } else {
                let r = o.outcome.as_ref().unwrap();
                assert!((r.metrics.lifetime_months - 30.0).abs() < 1e-9);
            }
        }
    }
}
