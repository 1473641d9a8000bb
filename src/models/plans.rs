use serde::{Deserialize, Serialize};

/// Subscription tiers offered for purchase.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanTier::Basic),
            "pro" => Ok(PlanTier::Pro),
            _ => Err(format!("Invalid plan type: {}", s)),
        }
    }
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Pro => "pro",
        }
    }
}

/// Billing periods. The wire names ("6months", "1year") are part of the
/// payment API contract and must not change.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum BillingPeriod {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl std::str::FromStr for BillingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingPeriod::Monthly),
            "quarterly" => Ok(BillingPeriod::Quarterly),
            "6months" => Ok(BillingPeriod::SixMonths),
            "1year" => Ok(BillingPeriod::OneYear),
            _ => Err(format!("Invalid billing period: {}", s)),
        }
    }
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Quarterly => "quarterly",
            BillingPeriod::SixMonths => "6months",
            BillingPeriod::OneYear => "1year",
        }
    }

    /// Calendar months covered by one billing period.
    pub fn months(&self) -> u32 {
        match self {
            BillingPeriod::Monthly => 1,
            BillingPeriod::Quarterly => 3,
            BillingPeriod::SixMonths => 6,
            BillingPeriod::OneYear => 12,
        }
    }
}

pub const ALL_TIERS: [PlanTier; 2] = [PlanTier::Basic, PlanTier::Pro];

pub const ALL_PERIODS: [BillingPeriod; 4] = [
    BillingPeriod::Monthly,
    BillingPeriod::Quarterly,
    BillingPeriod::SixMonths,
    BillingPeriod::OneYear,
];

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PlanPrice {
    /// Amount in the smallest currency unit (paise).
    pub amount: i64,
    pub label: &'static str,
}

/// The authoritative price catalog. Charges are always computed from this
/// table, never from a client-supplied amount, so any client copy of these
/// numbers is display-only.
pub fn price_of(tier: PlanTier, period: BillingPeriod) -> PlanPrice {
    let (amount, label) = match (tier, period) {
        (PlanTier::Basic, BillingPeriod::Monthly) => (999, "Monthly"),
        (PlanTier::Basic, BillingPeriod::Quarterly) => (2499, "Quarterly"),
        (PlanTier::Basic, BillingPeriod::SixMonths) => (4999, "6 Months"),
        (PlanTier::Basic, BillingPeriod::OneYear) => (8999, "1 Year"),
        (PlanTier::Pro, BillingPeriod::Monthly) => (1999, "Monthly"),
        (PlanTier::Pro, BillingPeriod::Quarterly) => (5499, "Quarterly"),
        (PlanTier::Pro, BillingPeriod::SixMonths) => (9999, "6 Months"),
        (PlanTier::Pro, BillingPeriod::OneYear) => (17999, "1 Year"),
    };

    PlanPrice { amount, label }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::assert_gt;
    use std::str::FromStr;

    #[test]
    fn every_pair_has_a_strictly_positive_amount() {
        for tier in ALL_TIERS {
            for period in ALL_PERIODS {
                assert_gt!(price_of(tier, period).amount, 0);
            }
        }
    }

    #[test]
    fn published_amounts_match_the_catalog() {
        assert_eq!(price_of(PlanTier::Basic, BillingPeriod::Monthly).amount, 999);
        assert_eq!(price_of(PlanTier::Basic, BillingPeriod::Quarterly).amount, 2499);
        assert_eq!(price_of(PlanTier::Basic, BillingPeriod::SixMonths).amount, 4999);
        assert_eq!(price_of(PlanTier::Basic, BillingPeriod::OneYear).amount, 8999);
        assert_eq!(price_of(PlanTier::Pro, BillingPeriod::Monthly).amount, 1999);
        assert_eq!(price_of(PlanTier::Pro, BillingPeriod::Quarterly).amount, 5499);
        assert_eq!(price_of(PlanTier::Pro, BillingPeriod::SixMonths).amount, 9999);
        assert_eq!(price_of(PlanTier::Pro, BillingPeriod::OneYear).amount, 17999);
    }

    #[test]
    fn unknown_tier_is_rejected() {
        claim::assert_err!(PlanTier::from_str("enterprise"));
        claim::assert_err!(BillingPeriod::from_str("weekly"));
    }

    #[test]
    fn wire_names_round_trip() {
        for period in ALL_PERIODS {
            assert_eq!(BillingPeriod::from_str(period.as_str()).unwrap(), period);
        }
        assert_eq!(BillingPeriod::SixMonths.as_str(), "6months");
        assert_eq!(BillingPeriod::OneYear.as_str(), "1year");

        let json = serde_json::to_string(&BillingPeriod::SixMonths).unwrap();
        assert_eq!(json, "\"6months\"");
    }
}
