use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AgeBracket;

/// A saved what-if run: the calculator inputs as entered, one column per
/// claimable category, together with the computed comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: i64,
    pub gross_income: Decimal,
    pub age_bracket: AgeBracket,

    // Claimed amounts as entered (None when the category was not claimed)
    pub claimed_80c: Option<Decimal>,
    pub claimed_80d: Option<Decimal>,
    pub claimed_home_loan_interest: Option<Decimal>,
    pub claimed_education_loan_interest: Option<Decimal>,
    pub claimed_nps: Option<Decimal>,
    pub claimed_other: Option<Decimal>,

    // Computed values, supplied by the caller at save time
    pub taxable_income: Decimal,
    pub baseline_tax: Decimal,
    pub optimized_tax: Decimal,
    pub total_savings: Decimal,

    pub created_at: DateTime<Utc>,
}

/// For saving new scenarios (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScenarioRecord {
    pub gross_income: Decimal,
    pub age_bracket: AgeBracket,
    pub claimed_80c: Option<Decimal>,
    pub claimed_80d: Option<Decimal>,
    pub claimed_home_loan_interest: Option<Decimal>,
    pub claimed_education_loan_interest: Option<Decimal>,
    pub claimed_nps: Option<Decimal>,
    pub claimed_other: Option<Decimal>,
    pub taxable_income: Decimal,
    pub baseline_tax: Decimal,
    pub optimized_tax: Decimal,
    pub total_savings: Decimal,
}
