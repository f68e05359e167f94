use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::DeductionCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub incurred_on: NaiveDate,
    pub tax_deductible: bool,
    /// Deduction slot this expense can be claimed under, if any.
    pub section: Option<DeductionCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For recording new expenses (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub incurred_on: NaiveDate,
    pub tax_deductible: bool,
    pub section: Option<DeductionCategory>,
}
