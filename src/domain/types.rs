//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - collected from CLI flags, the TUI form, or a batch CSV
//! - handed to the predictor in the exact column shape it was trained on
//! - rendered as text, JSON, or CSV

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Smallest monthly subscription amount (MAD) the form accepts.
pub const MIN_MONTHLY_AMOUNT: f64 = 1.0;
/// Age bounds enforced by the form.
pub const AGE_MIN: u32 = 18;
pub const AGE_MAX: u32 = 100;

/// Subscription plan catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Plan {
    Prepaid,
    Postpaid,
    Fiber,
    Business,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Plan::Prepaid, Plan::Postpaid, Plan::Fiber, Plan::Business];

    pub fn label(self) -> &'static str {
        match self {
            Plan::Prepaid => "Prepaid",
            Plan::Postpaid => "Postpaid",
            Plan::Fiber => "Fiber",
            Plan::Business => "Business",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        find_label(&Self::ALL, s, |p| p.label())
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Country of residence catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Country {
    Morocco,
    France,
    Spain,
    Belgium,
    Italy,
    Germany,
    Netherlands,
    Canada,
    #[serde(rename = "United States")]
    UnitedStates,
    #[serde(rename = "United Arab Emirates")]
    UnitedArabEmirates,
}

impl Country {
    pub const ALL: [Country; 10] = [
        Country::Morocco,
        Country::France,
        Country::Spain,
        Country::Belgium,
        Country::Italy,
        Country::Germany,
        Country::Netherlands,
        Country::Canada,
        Country::UnitedStates,
        Country::UnitedArabEmirates,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Country::Morocco => "Morocco",
            Country::France => "France",
            Country::Spain => "Spain",
            Country::Belgium => "Belgium",
            Country::Italy => "Italy",
            Country::Germany => "Germany",
            Country::Netherlands => "Netherlands",
            Country::Canada => "Canada",
            Country::UnitedStates => "United States",
            Country::UnitedArabEmirates => "United Arab Emirates",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        find_label(&Self::ALL, s, |c| c.label())
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// How recently the customer interacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Recency {
    Recent,
    Moderate,
    Old,
    #[serde(rename = "Very Old")]
    VeryOld,
}

impl Recency {
    pub const ALL: [Recency; 4] = [Recency::Recent, Recency::Moderate, Recency::Old, Recency::VeryOld];

    pub fn label(self) -> &'static str {
        match self {
            Recency::Recent => "Recent",
            Recency::Moderate => "Moderate",
            Recency::Old => "Old",
            Recency::VeryOld => "Very Old",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        find_label(&Self::ALL, s, |r| r.label())
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Purchase/interaction frequency as offered by the form.
///
/// The record keeps the label as a string (see `RawInput::frequency`) so that
/// labels from other sources reach the normalizer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Frequency {
    Single,
    Low,
    Medium,
    High,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [Frequency::Single, Frequency::Low, Frequency::Medium, Frequency::High];

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Single => "Single",
            Frequency::Low => "Low",
            Frequency::Medium => "Medium",
            Frequency::High => "High",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// One form submission, as collected from the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawInput {
    /// Account creation month, 1-12.
    pub creation_month: u8,
    pub plan: Plan,
    pub country: Country,
    /// Monthly subscription amount (MAD).
    pub monthly_amount: f64,
    pub recency: Recency,
    /// Frequency label, normally one of `Frequency::label()`.
    pub frequency: String,
    pub age: u32,
    pub foreign: bool,
}

/// The record shape the predictor was trained on.
///
/// Field names serialize to the training column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(rename = "Creation_Month")]
    pub creation_month: u8,
    #[serde(rename = "Plan")]
    pub plan: Plan,
    #[serde(rename = "Country")]
    pub country: Country,
    #[serde(rename = "Monthly_Amount")]
    pub monthly_amount: f64,
    #[serde(rename = "Recency")]
    pub recency: Recency,
    /// Ordinal rank, string-encoded (`"1"`..`"4"`).
    #[serde(rename = "Frequency")]
    pub frequency: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Is_Foreign")]
    pub is_foreign: u8,
}

impl ModelRecord {
    /// Numeric view of a column, if it has one.
    ///
    /// `Frequency` is numeric only when it holds an ordinal rank.
    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        match column {
            "Creation_Month" => Some(f64::from(self.creation_month)),
            "Monthly_Amount" => Some(self.monthly_amount),
            "Frequency" => self.frequency.parse::<f64>().ok(),
            "Age" => Some(self.age),
            "Is_Foreign" => Some(f64::from(self.is_foreign)),
            _ => None,
        }
    }

    /// Categorical view of a column (the level string the model was trained on).
    pub fn categorical_level(&self, column: &str) -> Option<String> {
        match column {
            "Creation_Month" => Some(self.creation_month.to_string()),
            "Plan" => Some(self.plan.label().to_string()),
            "Country" => Some(self.country.label().to_string()),
            "Recency" => Some(self.recency.label().to_string()),
            "Frequency" => Some(self.frequency.clone()),
            "Is_Foreign" => Some(self.is_foreign.to_string()),
            _ => None,
        }
    }
}

/// Named CLV bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Tier {
    Standard,
    Loyal,
    Premium,
    #[serde(rename = "VIP")]
    Vip,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Standard, Tier::Loyal, Tier::Premium, Tier::Vip];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Standard => "Standard",
            Tier::Loyal => "Loyal",
            Tier::Premium => "Premium",
            Tier::Vip => "VIP",
        }
    }
}

/// Qualitative churn bucket derived from estimated lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChurnRisk {
    Low,
    Moderate,
    High,
}

impl ChurnRisk {
    pub fn label(self) -> &'static str {
        match self {
            ChurnRisk::Low => "Low",
            ChurnRisk::Moderate => "Moderate",
            ChurnRisk::High => "High",
        }
    }
}

/// Secondary figures computed from the CLV and the monthly amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// CLV / monthly amount, unrounded.
    pub lifetime_months: f64,
    pub churn_risk: ChurnRisk,
    /// Monthly amount x 12.
    pub annual_revenue: f64,
    /// Monthly amount x 24.
    pub revenue_24m: f64,
    /// CLV uplift scenario (CLV x 1.2).
    pub growth_potential: f64,
}

/// Everything shown to the operator for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Non-negative CLV estimate (MAD).
    pub clv: f64,
    pub tier: Tier,
    pub metrics: DerivedMetrics,
    pub recommendations: &'static [&'static str],
}

fn find_label<T: Copy>(all: &[T], s: &str, label: impl Fn(T) -> &'static str) -> Option<T> {
    let wanted = s.trim();
    all.iter().copied().find(|v| label(*v).eq_ignore_ascii_case(wanted))
}

fn cycle<T: Copy + PartialEq>(all: &[T], cur: T, delta: isize) -> T {
    let n = all.len() as isize;
    let idx = all.iter().position(|v| *v == cur).unwrap_or(0) as isize;
    all[(idx + delta).rem_euclid(n) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Country::from_label("united arab emirates"), Some(Country::UnitedArabEmirates));
        assert_eq!(Recency::from_label(" Very Old "), Some(Recency::VeryOld));
        assert_eq!(Plan::from_label("fiber"), Some(Plan::Fiber));
        assert_eq!(Plan::from_label("Platinum"), None);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(Plan::Business.next(), Plan::Prepaid);
        assert_eq!(Plan::Prepaid.prev(), Plan::Business);
        assert_eq!(Frequency::Single.next(), Frequency::Low);
    }

    #[test]
    fn record_serializes_with_training_column_names() {
        let record = ModelRecord {
            creation_month: 3,
            plan: Plan::Postpaid,
            country: Country::UnitedStates,
            monthly_amount: 59.0,
            recency: Recency::VeryOld,
            frequency: "2".to_string(),
            age: 25.0,
            is_foreign: 1,
        };
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        for col in [
            "Creation_Month",
            "Plan",
            "Country",
            "Monthly_Amount",
            "Recency",
            "Frequency",
            "Age",
            "Is_Foreign",
        ] {
            assert!(obj.contains_key(col), "missing column {col}");
        }
        assert_eq!(obj["Country"], "United States");
        assert_eq!(obj["Recency"], "Very Old");
        assert_eq!(obj["Frequency"], "2");
    }

    #[test]
    fn frequency_is_numeric_only_when_ranked() {
        let mut record = ModelRecord {
            creation_month: 1,
            plan: Plan::Prepaid,
            country: Country::Morocco,
            monthly_amount: 10.0,
            recency: Recency::Recent,
            frequency: "3".to_string(),
            age: 40.0,
            is_foreign: 0,
        };
        assert_eq!(record.numeric_value("Frequency"), Some(3.0));
        record.frequency = "Sporadic".to_string();
        assert_eq!(record.numeric_value("Frequency"), None);
        assert_eq!(record.categorical_level("Frequency").as_deref(), Some("Sporadic"));
    }
}
