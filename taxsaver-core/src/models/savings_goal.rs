use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalPriority {
    High,
    Medium,
    Low,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub category: String,
    pub target_date: NaiveDate,
    pub priority: GoalPriority,
    pub description: String,
    pub tax_benefit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// Progress toward the target, in percent. Zero-target goals report zero
    /// rather than dividing by zero.
    pub fn progress_percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        Decimal::ONE_HUNDRED * self.current_amount / self.target_amount
    }
}

/// For creating new goals (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavingsGoal {
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub category: String,
    pub target_date: NaiveDate,
    pub priority: GoalPriority,
    pub description: String,
    pub tax_benefit: Option<String>,
}
