//! Batch customer CSV ingest.
//!
//! Turns a customer list into `RawInput`s ready for scoring.
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - Frequency labels are carried verbatim; the normalizer decides what they mean
//! - Non-positive monthly amounts are kept so the scorer reports them per row

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{AGE_MAX, AGE_MIN, Country, Plan, RawInput, Recency};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 8] = [
    "creation_month",
    "plan",
    "country",
    "monthly_amount",
    "recency",
    "frequency",
    "age",
    "foreign",
];

/// One parsed customer.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub line: usize,
    /// From the optional `customer_id` column, else `line-<n>`.
    pub customer_id: String,
    pub input: RawInput,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub rows: Vec<CustomerRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a customer CSV.
pub fn load_customers(path: &Path) -> Result<BatchInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    for col in REQUIRED_COLUMNS {
        if !header_map.contains_key(col) {
            return Err(AppError::new(2, format!("Missing required column: `{col}`")));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header line.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = field(&record, &header_map, "customer_id")
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match parse_row(&record, &header_map) {
            Ok(input) => rows.push(CustomerRow {
                line,
                customer_id: id.unwrap_or_else(|| format!("line-{line}")),
                input,
            }),
            Err(message) => row_errors.push(RowError { line, id, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(2, "No valid customer rows found in CSV."));
    }

    Ok(BatchInput {
        rows,
        row_errors,
        rows_read,
    })
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<RawInput, String> {
    let get = |name: &str| required(record, header_map, name);

    let creation_month: u8 = get("creation_month")?
        .parse()
        .map_err(|e| format!("invalid creation_month: {e}"))?;
    if !(1..=12).contains(&creation_month) {
        return Err(format!("creation_month {creation_month} outside 1-12"));
    }

    let plan_raw = get("plan")?;
    let plan = Plan::from_label(plan_raw).ok_or_else(|| format!("unknown plan '{plan_raw}'"))?;

    let country_raw = get("country")?;
    let country = Country::from_label(country_raw).ok_or_else(|| format!("unknown country '{country_raw}'"))?;

    let monthly_amount: f64 = get("monthly_amount")?
        .parse()
        .map_err(|e| format!("invalid monthly_amount: {e}"))?;
    if !monthly_amount.is_finite() {
        return Err("monthly_amount must be finite".to_string());
    }

    let recency_raw = get("recency")?;
    let recency = Recency::from_label(recency_raw).ok_or_else(|| format!("unknown recency '{recency_raw}'"))?;

    let frequency = get("frequency")?.to_string();

    let age: u32 = get("age")?.parse().map_err(|e| format!("invalid age: {e}"))?;
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Err(format!("age {age} outside {AGE_MIN}-{AGE_MAX}"));
    }

    let foreign = parse_flag(get("foreign")?)?;

    Ok(RawInput {
        creation_month,
        plan,
        country,
        monthly_amount,
        recency,
        frequency,
        age,
        foreign,
    })
}

fn required<'r>(record: &'r StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<&'r str, String> {
    field(record, header_map, name)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn parse_flag(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(format!("invalid foreign flag '{other}'")),
    }
}

fn field<'r>(record: &'r StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'r str> {
    header_map.get(name).and_then(|&idx| record.get(idx))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
