//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves settings
//! - sets up logging
//! - dispatches to single prediction, batch scoring, artifact fetch, or the TUI

use std::sync::Arc;

use chrono::{Datelike, Local};
use clap::Parser;
use tracing::info;

use crate::cli::{BatchArgs, Command, CustomerArgs, FetchArgs, PredictArgs};
use crate::config::Settings;
use crate::data::{FetchOutcome, ensure_artifact};
use crate::domain::RawInput;
use crate::error::AppError;
use crate::models::ModelStore;

pub mod pipeline;

const TUI_LOG_FILE: &str = "clv-tui.log";

/// Entry point for the `clv` binary.
pub fn run() -> Result<(), AppError> {
    // `clv` and `clv --plan fiber` behave like `clv tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::from_env()?.with_overrides(cli.model, cli.model_url);

    match &cli.command {
        Command::Tui(_) => crate::logging::init_file(std::path::Path::new(TUI_LOG_FILE))?,
        _ => crate::logging::init_stderr(),
    }

    match cli.command {
        Command::Predict(args) => handle_predict(args, settings),
        Command::Batch(args) => handle_batch(args, settings),
        Command::FetchModel(args) => handle_fetch(args, settings),
        Command::Tui(args) => handle_tui(args, settings),
    }
}

fn handle_predict(args: PredictArgs, settings: Settings) -> Result<(), AppError> {
    let store = ModelStore::new(settings);
    let predictor = store.get()?;

    let input = raw_input_from_args(&args.customer);
    let output = pipeline::run_prediction(predictor.as_ref(), &input)?;

    if args.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| AppError::new(4, format!("Failed to serialize result: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_prediction(&output, predictor.name()));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, settings: Settings) -> Result<(), AppError> {
    let batch = crate::io::ingest::load_customers(&args.input)?;

    let store = ModelStore::new(settings);
    let predictor = store.get()?;

    let outcomes = pipeline::run_batch(predictor.as_ref(), &batch.rows);

    println!(
        "{}",
        crate::report::format_batch_summary(&outcomes, &batch.row_errors, batch.rows_read)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &outcomes)?;
        info!(path = %path.display(), "batch results exported");
    }
    Ok(())
}

fn handle_fetch(args: FetchArgs, settings: Settings) -> Result<(), AppError> {
    match ensure_artifact(&settings, args.force)? {
        FetchOutcome::Present => {
            println!("Model already present: {}", settings.model_path.display());
        }
        FetchOutcome::Downloaded { bytes } => {
            println!("Downloaded model ({bytes} bytes) to {}", settings.model_path.display());
        }
    }
    Ok(())
}

fn handle_tui(args: CustomerArgs, settings: Settings) -> Result<(), AppError> {
    let store = Arc::new(ModelStore::new(settings));
    crate::tui::run(raw_input_from_args(&args), store)
}

/// Build the form submission from CLI flags.
pub fn raw_input_from_args(args: &CustomerArgs) -> RawInput {
    RawInput {
        creation_month: args.month.unwrap_or_else(current_month),
        plan: args.plan,
        country: args.country,
        monthly_amount: args.monthly,
        recency: args.recency,
        frequency: args.frequency.label().to_string(),
        age: args.age,
        foreign: args.foreign,
    }
}

fn current_month() -> u8 {
    // `month()` is always 1..=12.
    Local::now().month() as u8
}

const SUBCOMMANDS: [&str; 4] = ["predict", "batch", "fetch-model", "tui"];
/// Global flags that take a separate value.
const GLOBAL_VALUE_FLAGS: [&str; 2] = ["--model", "--model-url"];

/// Rewrite argv so `clv` defaults to `clv tui`.
///
/// Rules (leading global flags and their values are skipped first):
/// - `clv`                        -> `clv tui`
/// - `clv --plan fiber ...`       -> `clv tui --plan fiber ...`
/// - `clv --model m.json`         -> `clv --model m.json tui`
/// - `clv --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let mut idx = 1;
    while let Some(arg) = argv.get(idx) {
        if GLOBAL_VALUE_FLAGS.contains(&arg.as_str()) {
            idx += 2;
        } else if GLOBAL_VALUE_FLAGS
            .iter()
            .any(|flag| arg.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
        {
            idx += 1;
        } else {
            break;
        }
    }
    if idx >= argv.len() {
        argv.push("tui".to_string());
        return argv;
    }

    let arg = argv[idx].as_str();
    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version || SUBCOMMANDS.contains(&arg) {
        return argv;
    }

    // If the next token is a flag, treat it as "tui flags".
    if arg.starts_with('-') {
        argv.insert(idx, "tui".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Frequency, Plan, Recency};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["clv"])), argv(&["clv", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["clv", "--plan", "fiber"])),
            argv(&["clv", "tui", "--plan", "fiber"])
        );
    }

    #[test]
    fn explicit_commands_are_untouched() {
        for args in [
            &["clv", "predict", "--age", "40"][..],
            &["clv", "--help"][..],
            &["clv", "--model", "m.json", "batch", "--input", "c.csv"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn subcommand_names_as_flag_values_do_not_count() {
        assert_eq!(
            rewrite_args(argv(&["clv", "--model", "tui"])),
            argv(&["clv", "--model", "tui", "tui"])
        );
        assert_eq!(
            rewrite_args(argv(&["clv", "--model", "batch", "--plan", "fiber"])),
            argv(&["clv", "--model", "batch", "tui", "--plan", "fiber"])
        );
        assert_eq!(
            rewrite_args(argv(&["clv", "--plan", "fiber", "--model-url", "predict"])),
            argv(&["clv", "tui", "--plan", "fiber", "--model-url", "predict"])
        );
        assert_eq!(
            rewrite_args(argv(&["clv", "--model=m.json", "predict"])),
            argv(&["clv", "--model=m.json", "predict"])
        );
    }

    #[test]
    fn frequency_flag_becomes_label() {
        let args = CustomerArgs {
            month: Some(7),
            plan: Plan::Business,
            country: Country::Canada,
            monthly: 42.0,
            recency: Recency::Old,
            frequency: Frequency::Single,
            age: 50,
            foreign: true,
        };
        let raw = raw_input_from_args(&args);
        assert_eq!(raw.frequency, "Single");
        assert_eq!(raw.creation_month, 7);
        assert!(raw.foreign);
    }

    #[test]
    fn month_defaults_to_current() {
        let m = current_month();
        assert!((1..=12).contains(&m));
    }
}
