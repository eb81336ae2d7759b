//! Export scored batch results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use chrono::{SecondsFormat, Utc};

use crate::app::pipeline::BatchOutcome;
use crate::error::AppError;

const HEADER: [&str; 11] = [
    "customer_id",
    "line",
    "clv",
    "tier",
    "lifetime_months",
    "churn_risk",
    "annual_revenue",
    "revenue_24m",
    "growth_potential",
    "error",
    "scored_at",
];

/// Write one CSV row per scored customer; failed rows carry only `error`.
pub fn write_results_csv(path: &Path, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let scored_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    for o in outcomes {
        let line = o.line.to_string();
        let row: Vec<String> = match &o.outcome {
            Ok(r) => vec![
                o.customer_id.clone(),
                line,
                format!("{:.2}", r.clv),
                r.tier.label().to_string(),
                format!("{:.4}", r.metrics.lifetime_months),
                r.metrics.churn_risk.label().to_string(),
                format!("{:.2}", r.metrics.annual_revenue),
                format!("{:.2}", r.metrics.revenue_24m),
                format!("{:.2}", r.metrics.growth_potential),
                String::new(),
                scored_at.clone(),
            ],
            Err(e) => {
                let mut row = vec![o.customer_id.clone(), line];
                row.extend(std::iter::repeat_n(String::new(), 7));
                row.push(e.to_string());
                row.push(scored_at.clone());
                row
            }
        };
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClvError;
    use crate::scoring::build_result;

    #[test]
    fn writes_scored_and_failed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.csv");
        let outcomes = vec![
            BatchOutcome {
                line: 2,
                customer_id: "C, 1".into(),
                outcome: build_result(2500.0, 59.0),
            },
            BatchOutcome {
                line: 3,
                customer_id: "C2".into(),
                outcome: Err(ClvError::InvalidMonthlyAmount(0.0)),
            },
        ];
        write_results_csv(&path, &outcomes).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), HEADER.len());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "C, 1");
        assert_eq!(&rows[0][3], "Standard");
        assert_eq!(&rows[0][5], "Low");
        assert_eq!(&rows[0][9], "");
        assert_eq!(&rows[1][2], "");
        assert!(rows[1][9].contains("invalid monthly amount"));
    }
}
