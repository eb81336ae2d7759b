//! CLV tiering and derived metrics.
//!
//! All thresholds are fixed business policy, in MAD and months. Bands are
//! half-open and checked in ascending order with `<`, so a value sitting on a
//! boundary belongs to the band that starts there.

use crate::domain::{ChurnRisk, DerivedMetrics, PredictionResult, Tier};
use crate::error::ClvError;

/// Upper (exclusive) CLV bound of each tier except the open-ended top one.
pub const TIER_BOUNDS: [(f64, Tier); 3] = [(3000.0, Tier::Standard), (6000.0, Tier::Loyal), (10000.0, Tier::Premium)];

/// Upper (exclusive) lifetime bound, in months, of the riskier churn buckets.
pub const CHURN_BOUNDS: [(f64, ChurnRisk); 2] = [(12.0, ChurnRisk::High), (24.0, ChurnRisk::Moderate)];

pub const GROWTH_FACTOR: f64 = 1.2;

/// Bucket a CLV estimate into its tier.
pub fn classify_tier(clv: f64) -> Tier {
    for (upper, tier) in TIER_BOUNDS {
        if clv < upper {
            return tier;
        }
    }
    Tier::Vip
}

/// Lower (inclusive) CLV bound of a tier.
pub fn tier_floor(tier: Tier) -> f64 {
    let mut floor = 0.0;
    for (upper, t) in TIER_BOUNDS {
        if t == tier {
            return floor;
        }
        floor = upper;
    }
    floor
}

/// Estimated remaining lifetime in months (`clv / monthly_amount`).
pub fn lifetime_months(clv: f64, monthly_amount: f64) -> Result<f64, ClvError> {
    if !(monthly_amount > 0.0) {
        return Err(ClvError::InvalidMonthlyAmount(monthly_amount));
    }
    Ok(clv / monthly_amount)
}

/// Bucket an estimated lifetime into a churn-risk level.
pub fn churn_risk(lifetime_months: f64) -> ChurnRisk {
    for (upper, risk) in CHURN_BOUNDS {
        if lifetime_months < upper {
            return risk;
        }
    }
    ChurnRisk::Low
}

pub fn derive_metrics(clv: f64, monthly_amount: f64) -> Result<DerivedMetrics, ClvError> {
    let lifetime = lifetime_months(clv, monthly_amount)?;
    Ok(DerivedMetrics {
        lifetime_months: lifetime,
        churn_risk: churn_risk(lifetime),
        annual_revenue: monthly_amount * 12.0,
        revenue_24m: monthly_amount * 24.0,
        growth_potential: clv * GROWTH_FACTOR,
    })
}

/// Strategy lines shown for each tier.
pub fn recommendations(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Standard => &[
            "Offer targeted upselling bundles",
            "Raise engagement with personalized communications",
            "Grant loyalty bonuses to grow usage",
        ],
        Tier::Loyal => &[
            "Keep satisfaction high with premium service",
            "Propose complementary services",
            "Start a referral program",
        ],
        Tier::Premium => &[
            "Route to priority customer care",
            "Extend exclusive offers",
            "Develop tailor-made services",
        ],
        Tier::Vip => &[
            "Assign a dedicated account manager",
            "Give early access to new offers",
            "Invite to exclusive events and premium perks",
        ],
    }
}

/// Assemble the full result for one CLV estimate.
pub fn build_result(clv: f64, monthly_amount: f64) -> Result<PredictionResult, ClvError> {
    let metrics = derive_metrics(clv, monthly_amount)?;
    let tier = classify_tier(clv);
    Ok(PredictionResult {
        clv,
        tier,
        metrics,
        recommendations: recommendations(tier),
    })
}
