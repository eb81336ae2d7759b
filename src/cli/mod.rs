//! Command-line parsing for the CLV predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring code. Bounded value parsers here play the role of
//! the form's bounded widgets: anything that reaches the scorer is in range.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AGE_MAX, AGE_MIN, Country, Frequency, MIN_MONTHLY_AMOUNT, Plan, Recency};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "clv", version, about = "Customer Lifetime Value predictor")]
pub struct Cli {
    /// Local model artifact path (overrides CLV_MODEL_PATH).
    #[arg(long, global = true, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Remote artifact URL used when the local file is missing (overrides CLV_MODEL_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub model_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the CLV of one customer and print the report.
    Predict(PredictArgs),
    /// Score every customer in a CSV file.
    Batch(BatchArgs),
    /// Download the model artifact if it is not present locally.
    FetchModel(FetchArgs),
    /// Launch the interactive form.
    Tui(CustomerArgs),
}

/// Customer attributes, shared by `predict` and as TUI form defaults.
#[derive(Debug, Args, Clone)]
pub struct CustomerArgs {
    /// Account creation month (1-12). Defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: Option<u8>,

    /// Subscription plan.
    #[arg(long, value_enum, default_value_t = Plan::Postpaid)]
    pub plan: Plan,

    /// Country of residence.
    #[arg(long, value_enum, default_value_t = Country::Morocco)]
    pub country: Country,

    /// Monthly subscription amount (MAD).
    #[arg(long, default_value_t = 99.0, value_parser = parse_monthly_amount)]
    pub monthly: f64,

    /// Recency of the last interaction.
    #[arg(long, value_enum, default_value_t = Recency::Recent)]
    pub recency: Recency,

    /// Purchase/interaction frequency.
    #[arg(long, value_enum, default_value_t = Frequency::Medium)]
    pub frequency: Frequency,

    /// Customer age.
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u32).range(AGE_MIN as i64..=AGE_MAX as i64))]
    pub age: u32,

    /// Customer resides abroad.
    #[arg(long)]
    pub foreign: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub customer: CustomerArgs,

    /// Print the full result as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Customer CSV (creation_month, plan, country, monthly_amount, recency, frequency, age, foreign).
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write per-customer results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Download even if the artifact already exists.
    #[arg(long)]
    pub force: bool,
}

fn parse_monthly_amount(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("not a number: {e}"))?;
    if !v.is_finite() || v < MIN_MONTHLY_AMOUNT {
        return Err(format!("must be at least {MIN_MONTHLY_AMOUNT}"));
    }
    Ok(v)
}
