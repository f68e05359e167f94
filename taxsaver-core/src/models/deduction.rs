use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AgeBracket;

/// Errors raised while recording deduction claims.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionError {
    /// A negative claim is a caller bug, never a domain value to clamp.
    #[error("negative amount {amount} claimed for {category}")]
    NegativeAmount {
        category: DeductionCategory,
        amount: Decimal,
    },
}

/// A claimable deduction slot.
///
/// Each category has a claim ceiling looked up via [`DeductionCategory::cap`];
/// education-loan interest and the catch-all slot are uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeductionCategory {
    Investments80c,
    Health80d,
    HomeLoanInterest,
    EducationLoanInterest,
    Nps80ccd1b,
    Other,
}

impl DeductionCategory {
    pub const ALL: [DeductionCategory; 6] = [
        Self::Investments80c,
        Self::Health80d,
        Self::HomeLoanInterest,
        Self::EducationLoanInterest,
        Self::Nps80ccd1b,
        Self::Other,
    ];

    /// Short code used on the CLI and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Investments80c => "80C",
            Self::Health80d => "80D",
            Self::HomeLoanInterest => "24B",
            Self::EducationLoanInterest => "80E",
            Self::Nps80ccd1b => "80CCD1B",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "80C" => Some(Self::Investments80c),
            "80D" => Some(Self::Health80d),
            "24B" => Some(Self::HomeLoanInterest),
            "80E" => Some(Self::EducationLoanInterest),
            "80CCD1B" => Some(Self::Nps80ccd1b),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label for listings and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Investments80c => "Section 80C investments (PPF, EPF, ELSS)",
            Self::Health80d => "Health insurance premium (Section 80D)",
            Self::HomeLoanInterest => "Home loan interest (Section 24b)",
            Self::EducationLoanInterest => "Education loan interest (Section 80E)",
            Self::Nps80ccd1b => "NPS contribution (Section 80CCD(1B))",
            Self::Other => "Other deductions",
        }
    }

    /// Claim ceiling for this category, if one exists.
    ///
    /// The health-insurance cap depends on the age bracket: senior brackets
    /// may claim up to 50,000, everyone else up to 25,000. That cross-cutting
    /// rule lives here so call sites never special-case it.
    pub fn cap(&self, age_bracket: AgeBracket) -> Option<Decimal> {
        match self {
            Self::Investments80c => Some(Decimal::from(150_000)),
            Self::Health80d if age_bracket.is_senior() => Some(Decimal::from(50_000)),
            Self::Health80d => Some(Decimal::from(25_000)),
            Self::HomeLoanInterest => Some(Decimal::from(200_000)),
            Self::EducationLoanInterest => None,
            Self::Nps80ccd1b => Some(Decimal::from(50_000)),
            Self::Other => None,
        }
    }
}

impl fmt::Display for DeductionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of deductions a taxpayer claims, keyed by category.
///
/// Amounts are stored as entered; caps apply when effective totals are
/// computed, so the original claim survives for display and storage.
/// Unclaimed categories are simply absent and count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionClaims {
    pub(crate) claims: BTreeMap<DeductionCategory, Decimal>,
}

impl DeductionClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a claim, replacing any earlier claim for the same category.
    pub fn claim(
        &mut self,
        category: DeductionCategory,
        amount: Decimal,
    ) -> Result<(), DeductionError> {
        if amount < Decimal::ZERO {
            return Err(DeductionError::NegativeAmount { category, amount });
        }
        self.claims.insert(category, amount);
        Ok(())
    }

    /// Claimed amount exactly as entered, if the category was claimed.
    pub fn get(&self, category: DeductionCategory) -> Option<Decimal> {
        self.claims.get(&category).copied()
    }

    /// Claimed amount as entered; absent categories count as zero.
    pub fn amount(&self, category: DeductionCategory) -> Decimal {
        self.get(category).unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeductionCategory, Decimal)> + '_ {
        self.claims.iter().map(|(&category, &amount)| (category, amount))
    }

    /// Re-check every stored amount.
    ///
    /// [`claim`](Self::claim) already rejects negatives, but claims can also
    /// arrive through deserialization, so calculators validate before use.
    pub fn validate(&self) -> Result<(), DeductionError> {
        for (category, amount) in self.iter() {
            if amount < Decimal::ZERO {
                return Err(DeductionError::NegativeAmount { category, amount });
            }
        }
        Ok(())
    }

    /// Effective claim for one category: `min(claimed, cap)`, or the claimed
    /// amount unchanged where no cap exists.
    pub fn allowed(&self, category: DeductionCategory, age_bracket: AgeBracket) -> Decimal {
        let claimed = self.amount(category);
        match category.cap(age_bracket) {
            Some(cap) => claimed.min(cap),
            None => claimed,
        }
    }

    /// Sum of effective claims across all claimed categories.
    pub fn total_allowed(&self, age_bracket: AgeBracket) -> Decimal {
        self.claims
            .keys()
            .map(|&category| self.allowed(category, age_bracket))
            .sum()
    }

    /// Best-case claim set: every capped category at its cap, whether or not
    /// it was claimed; uncapped categories keep the claimed amount (there is
    /// no ceiling to target, so nothing is invented for them).
    pub fn maximized(&self, age_bracket: AgeBracket) -> DeductionClaims {
        let mut claims = BTreeMap::new();
        for category in DeductionCategory::ALL {
            match category.cap(age_bracket) {
                Some(cap) => {
                    claims.insert(category, cap);
                }
                None => {
                    let claimed = self.amount(category);
                    if claimed > Decimal::ZERO {
                        claims.insert(category, claimed);
                    }
                }
            }
        }
        Self { claims }
    }
}
