//! The progressive slab schedule for the single modeled tax regime.
//!
//! # Slab table (FY 2023-24, new regime)
//!
//! | Lower bound (exclusive) | Upper bound (inclusive) | Marginal rate |
//! |-------------------------|-------------------------|---------------|
//! | 0                       | 300,000                 | 0%            |
//! | 300,000                 | 600,000                 | 5%            |
//! | 600,000                 | 900,000                 | 10%           |
//! | 900,000                 | 1,200,000               | 15%           |
//! | 1,200,000               | 1,500,000               | 20%           |
//! | 1,500,000               | open-ended              | 30%           |
//!
//! Tax is computed bottom-up: each slab taxes only the portion of income
//! falling inside it, so crossing into a higher slab never re-prices income
//! already taxed at a lower rate. A flat 4% health-and-education cess is then
//! applied to the computed tax (not to income).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxsaver_core::calculations::TaxRegime;
//!
//! let regime = TaxRegime::fy_2023_24();
//!
//! // 15,000 from the 5% slab plus 12,500 from the 10% slab.
//! assert_eq!(regime.marginal_tax(dec!(725000)), dec!(27500));
//! assert_eq!(regime.total_tax(dec!(725000)), dec!(28600.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::max;
use crate::models::TaxSlab;

/// Errors raised by [`TaxRegime::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegimeError {
    /// The schedule has no slabs at all.
    #[error("regime has no slabs")]
    NoSlabs,

    /// A slab does not start where the previous one ended (the first slab
    /// must start at zero).
    #[error("slab starting at {found} does not continue from {expected}")]
    SlabGap { expected: Decimal, found: Decimal },

    /// A slab's upper bound is not above its lower bound.
    #[error("slab upper bound {upper} is not above its lower bound {lower}")]
    EmptySlab { lower: Decimal, upper: Decimal },

    /// A marginal rate outside [0, 1].
    #[error("slab rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),

    /// An open-ended slab somewhere other than the top of the schedule.
    #[error("only the last slab may be open-ended")]
    OpenEndedSlabNotLast,

    /// The top slab has an upper bound, leaving high incomes unpriced.
    #[error("last slab must be open-ended, got upper bound {0}")]
    BoundedFinalSlab(Decimal),

    /// A cess rate outside [0, 1].
    #[error("cess rate must be between 0 and 1, got {0}")]
    InvalidCessRate(Decimal),

    #[error("standard deduction must be non-negative, got {0}")]
    NegativeStandardDeduction(Decimal),
}

/// A single tax regime: the slab table, the cess surcharge, and the flat
/// standard deduction every taxpayer receives.
///
/// Only one regime is modeled; [`TaxRegime::fy_2023_24`] is the built-in
/// schedule and there is no regime-comparison machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRegime {
    pub slabs: Vec<TaxSlab>,
    pub cess_rate: Decimal,
    pub standard_deduction: Decimal,
}

impl TaxRegime {
    /// The FY 2023-24 new-regime schedule with 4% cess and the fixed 50,000
    /// standard deduction.
    pub fn fy_2023_24() -> Self {
        Self {
            slabs: vec![
                TaxSlab {
                    lower: Decimal::ZERO,
                    upper: Some(Decimal::from(300_000)),
                    rate: Decimal::ZERO,
                },
                TaxSlab {
                    lower: Decimal::from(300_000),
                    upper: Some(Decimal::from(600_000)),
                    rate: Decimal::new(5, 2),
                },
                TaxSlab {
                    lower: Decimal::from(600_000),
                    upper: Some(Decimal::from(900_000)),
                    rate: Decimal::new(10, 2),
                },
                TaxSlab {
                    lower: Decimal::from(900_000),
                    upper: Some(Decimal::from(1_200_000)),
                    rate: Decimal::new(15, 2),
                },
                TaxSlab {
                    lower: Decimal::from(1_200_000),
                    upper: Some(Decimal::from(1_500_000)),
                    rate: Decimal::new(20, 2),
                },
                TaxSlab {
                    lower: Decimal::from(1_500_000),
                    upper: None,
                    rate: Decimal::new(30, 2),
                },
            ],
            cess_rate: Decimal::new(4, 2),
            standard_deduction: Decimal::from(50_000),
        }
    }

    /// Checks that the schedule is ascending, contiguous from zero, ends in
    /// exactly one open-ended slab, and carries rates within [0, 1].
    pub fn validate(&self) -> Result<(), RegimeError> {
        let Some(last) = self.slabs.last() else {
            return Err(RegimeError::NoSlabs);
        };
        if let Some(upper) = last.upper {
            return Err(RegimeError::BoundedFinalSlab(upper));
        }

        let mut expected_lower = Decimal::ZERO;
        for (i, slab) in self.slabs.iter().enumerate() {
            if slab.lower != expected_lower {
                return Err(RegimeError::SlabGap {
                    expected: expected_lower,
                    found: slab.lower,
                });
            }
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
                return Err(RegimeError::InvalidRate(slab.rate));
            }
            match slab.upper {
                Some(upper) if upper <= slab.lower => {
                    return Err(RegimeError::EmptySlab {
                        lower: slab.lower,
                        upper,
                    });
                }
                Some(upper) => expected_lower = upper,
                None if i + 1 != self.slabs.len() => {
                    return Err(RegimeError::OpenEndedSlabNotLast);
                }
                None => {}
            }
        }

        if self.cess_rate < Decimal::ZERO || self.cess_rate > Decimal::ONE {
            return Err(RegimeError::InvalidCessRate(self.cess_rate));
        }
        if self.standard_deduction < Decimal::ZERO {
            return Err(RegimeError::NegativeStandardDeduction(
                self.standard_deduction,
            ));
        }
        Ok(())
    }

    /// Marginal tax before cess: walks the slabs bottom-up and taxes the
    /// portion of `taxable_income` inside each one at its rate.
    ///
    /// Zero and negative inputs fall out of the same formula as zero tax;
    /// no special casing.
    pub fn marginal_tax(&self, taxable_income: Decimal) -> Decimal {
        let mut tax = Decimal::ZERO;
        for slab in &self.slabs {
            let above_lower = max(taxable_income - slab.lower, Decimal::ZERO);
            let in_slab = match slab.upper {
                Some(upper) => above_lower.min(upper - slab.lower),
                None => above_lower,
            };
            tax += in_slab * slab.rate;
        }
        tax
    }

    /// Health-and-education cess on the computed tax, not on income. Full
    /// precision is preserved; rounding happens at the display boundary.
    pub fn apply_cess(&self, tax_before_cess: Decimal) -> Decimal {
        tax_before_cess * (Decimal::ONE + self.cess_rate)
    }

    /// Total liability on `taxable_income`: marginal slab tax plus cess.
    pub fn total_tax(&self, taxable_income: Decimal) -> Decimal {
        self.apply_cess(self.marginal_tax(taxable_income))
    }
}
