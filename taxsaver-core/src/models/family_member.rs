use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: i64,
    pub name: String,
    pub relation: String,
    pub age: i32,
    pub income: Decimal,
    pub has_health_insurance: bool,
    pub investments: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For adding new members (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFamilyMember {
    pub name: String,
    pub relation: String,
    pub age: i32,
    pub income: Decimal,
    pub has_health_insurance: bool,
    pub investments: Decimal,
}
