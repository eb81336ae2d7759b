//! Text rendering of predictions.

use crate::app::pipeline::{BatchOutcome, PredictionOutput};
use crate::domain::Tier;
use crate::io::ingest::RowError;
use crate::scoring::tier_floor;

/// Format one prediction: inputs, CLV, tier, metrics, recommendations.
pub fn format_prediction(output: &PredictionOutput, model_name: &str) -> String {
    let input = &output.input;
    let result = &output.result;
    let m = &result.metrics;
    let mut out = String::new();

    out.push_str("=== clv - Customer Lifetime Value ===\n");
    out.push_str(&format!("Model: {model_name}\n"));

    out.push_str("\nCustomer:\n");
    out.push_str(&format!(
        "- plan={} | country={} | foreign={}\n",
        input.plan.label(),
        input.country.label(),
        if input.foreign { "yes" } else { "no" },
    ));
    out.push_str(&format!(
        "- age={} | created month={} | monthly={} MAD\n",
        input.age,
        input.creation_month,
        fmt_mad(input.monthly_amount, 2),
    ));
    out.push_str(&format!(
        "- recency={} | frequency={} (rank {})\n",
        input.recency.label(),
        input.frequency,
        output.record.frequency,
    ));

    out.push_str("\nPrediction:\n");
    out.push_str(&format!("- CLV: {} MAD\n", fmt_mad(result.clv, 0)));
    out.push_str(&format!(
        "- Tier: {} ({})\n",
        result.tier.label(),
        tier_range(result.tier)
    ));

    out.push_str("\nMetrics:\n");
    out.push_str(&format!(
        "- Estimated lifetime: {:.1} months (churn risk: {})\n",
        m.lifetime_months,
        m.churn_risk.label()
    ));
    out.push_str(&format!("- Annual revenue: {} MAD\n", fmt_mad(m.annual_revenue, 0)));
    out.push_str(&format!("- 24-month revenue: {} MAD\n", fmt_mad(m.revenue_24m, 0)));
    out.push_str(&format!("- Growth potential: {} MAD\n", fmt_mad(m.growth_potential, 0)));

    out.push_str("\nRecommendations:\n");
    for line in result.recommendations {
        out.push_str(&format!("- {line}\n"));
    }

    out
}

/// Format a batch summary: counts per tier plus row-level problems.
pub fn format_batch_summary(outcomes: &[BatchOutcome], row_errors: &[RowError], rows_read: usize) -> String {
    let mut out = String::new();
    let scored: Vec<_> = outcomes.iter().filter_map(|o| o.outcome.as_ref().ok()).collect();

    out.push_str("=== clv - batch scoring ===\n");
    out.push_str(&format!(
        "Rows: read={rows_read} | scored={} | failed={} | skipped={}\n",
        scored.len(),
        outcomes.len() - scored.len(),
        row_errors.len(),
    ));

    if !scored.is_empty() {
        let total: f64 = scored.iter().map(|r| r.clv).sum();
        out.push_str(&format!(
            "CLV: total={} MAD | mean={} MAD\n",
            fmt_mad(total, 0),
            fmt_mad(total / scored.len() as f64, 0)
        ));

        out.push_str(&format!("\n{:<10} {:>8}\n", "tier", "count"));
        out.push_str(&format!("{:-<10} {:-<8}\n", "", ""));
        for tier in Tier::ALL {
            let n = scored.iter().filter(|r| r.tier == tier).count();
            out.push_str(&format!("{:<10} {:>8}\n", tier.label(), n));
        }
    }

    let failures: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.outcome.as_ref().err().map(|e| (o.line, o.customer_id.as_str(), e.to_string())))
        .collect();
    if !failures.is_empty() || !row_errors.is_empty() {
        out.push_str("\nProblems:\n");
        for e in row_errors {
            out.push_str(&format!(
                "- line {} {}: {}\n",
                e.line,
                e.id.as_deref().unwrap_or("-"),
                e.message
            ));
        }
        for (line, id, msg) in failures {
            out.push_str(&format!("- line {line} {id}: {msg}\n"));
        }
    }

    out
}

/// Human-readable band for a tier, e.g. `3,000 - 6,000 MAD`.
pub fn tier_range(tier: Tier) -> String {
    let floor = tier_floor(tier);
    match Tier::ALL.iter().position(|t| *t == tier).and_then(|i| Tier::ALL.get(i + 1)) {
        Some(next) => format!("{} - {} MAD", fmt_mad(floor, 0), fmt_mad(tier_floor(*next), 0)),
        None => format!(">= {} MAD", fmt_mad(floor, 0)),
    }
}

/// Format an amount with thousands separators and `decimals` places.
pub fn fmt_mad(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && s.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
