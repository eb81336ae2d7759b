//! Prediction invocation.

use tracing::debug;

use crate::domain::ModelRecord;
use crate::error::ClvError;
use crate::models::Predictor;

/// Run the predictor on one record and return its CLV estimate.
///
/// Any predictor failure becomes `PredictionFailed` with the underlying
/// message. Non-finite outputs are failures too; negative ones are clamped to
/// zero so the estimate stays non-negative. Nothing is retried.
pub fn invoke(predictor: &dyn Predictor, record: &ModelRecord) -> Result<f64, ClvError> {
    let clv = predictor
        .predict(record)
        .map_err(|e| ClvError::PredictionFailed(e.to_string()))?;

    if !clv.is_finite() {
        return Err(ClvError::PredictionFailed(format!(
            "predictor '{}' returned a non-finite value ({clv})",
            predictor.name()
        )));
    }

    if clv < 0.0 {
        debug!(raw = clv, "clamping negative CLV estimate to zero");
        return Ok(0.0);
    }

    Ok(clv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Plan, Recency};
    use crate::models::ModelError;

    struct Fixed(Result<f64, ModelError>);

    impl Predictor for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _record: &ModelRecord) -> Result<f64, ModelError> {
            self.0.clone()
        }
    }

    fn record() -> ModelRecord {
        ModelRecord {
            creation_month: 1,
            plan: Plan::Prepaid,
            country: Country::Spain,
            monthly_amount: 80.0,
            recency: Recency::Old,
            frequency: "2".to_string(),
            age: 44.0,
            is_foreign: 1,
        }
    }

    #[test]
    fn passes_through_valid_estimate() {
        assert_eq!(invoke(&Fixed(Ok(4200.5)), &record()), Ok(4200.5));
    }

    #[test]
    fn predictor_error_becomes_prediction_failed() {
        let p = Fixed(Err(ModelError::SchemaMismatch("missing numeric column 'Tenure'".into())));
        let err = invoke(&p, &record()).unwrap_err();
        match err {
            ClvError::PredictionFailed(msg) => assert!(msg.contains("Tenure"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_estimate_is_rejected() {
        assert!(matches!(invoke(&Fixed(Ok(f64::NAN)), &record()), Err(ClvError::PredictionFailed(_))));
        assert!(matches!(
            invoke(&Fixed(Ok(f64::INFINITY)), &record()),
            Err(ClvError::PredictionFailed(_))
        ));
    }

    #[test]
    fn negative_estimate_clamps_to_zero() {
        assert_eq!(invoke(&Fixed(Ok(-12.0)), &record()), Ok(0.0));
    }
}
