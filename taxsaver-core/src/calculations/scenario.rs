//! Baseline-versus-optimized tax scenario computation.
//!
//! # Computation steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Basic exemption for the age bracket |
//! | 2    | Total deductions: standard deduction + capped claims |
//! | 3    | Taxable income: max(0, gross − exemption − deductions) |
//! | 4    | Marginal slab tax plus 4% cess (baseline) |
//! | 5    | Steps 2–4 again with every capped category at its cap (optimized) |
//! | 6    | Savings: baseline − optimized, with a guarded percentage |
//!
//! The optimized run deliberately assumes every capped category can be
//! claimed in full, whether or not the taxpayer claimed it; uncapped
//! categories are never inflated. This mirrors the planner's "how much could
//! you save" framing rather than a realistic optimizer.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxsaver_core::calculations::{ScenarioCalculator, TaxRegime, TaxScenarioInput};
//! use taxsaver_core::models::{AgeBracket, DeductionCategory, DeductionClaims};
//!
//! let regime = TaxRegime::fy_2023_24();
//!
//! let mut deductions = DeductionClaims::new();
//! deductions.claim(DeductionCategory::Investments80c, dec!(150000)).unwrap();
//! deductions.claim(DeductionCategory::Health80d, dec!(25000)).unwrap();
//!
//! let input = TaxScenarioInput {
//!     gross_income: dec!(1200000),
//!     age_bracket: AgeBracket::Under60,
//!     deductions,
//! };
//!
//! let calculator = ScenarioCalculator::new(&regime);
//! let result = calculator.calculate(&input).unwrap();
//!
//! // 1,200,000 − 250,000 exemption − 225,000 deductions − 50,000 standard.
//! assert_eq!(result.taxable_income, dec!(725000));
//! assert_eq!(result.baseline_tax, dec!(28600.00));
//! assert!(result.optimized_tax <= result.baseline_tax);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::max;
use crate::calculations::regime::{RegimeError, TaxRegime};
use crate::models::{AgeBracket, DeductionClaims, DeductionError};

/// Errors that can occur while computing a tax scenario.
///
/// This is the calculator's entire invalid-input surface; arithmetic edge
/// cases (zero income, no claims) are valid inputs that produce zero tax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxScenarioError {
    /// Negative gross income is a caller bug, never silently clamped.
    #[error("gross income must be non-negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error(transparent)]
    Deduction(#[from] DeductionError),

    #[error(transparent)]
    Regime(#[from] RegimeError),
}

/// Raw calculator inputs: one "Calculate" action's worth of form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxScenarioInput {
    /// Annual gross income.
    pub gross_income: Decimal,

    /// Age group; drives the basic exemption and the health-insurance cap.
    pub age_bracket: AgeBracket,

    /// Deductions as claimed. Unclaimed categories are absent and count as
    /// zero; the fixed standard deduction is not part of this set.
    pub deductions: DeductionClaims,
}

/// Computed comparison. A value object: recomputed per call, replaced
/// wholesale on the next calculation, never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxScenarioResult {
    /// Taxable income under the claims as entered.
    pub taxable_income: Decimal,

    /// Liability (with cess) under the claims as entered.
    pub baseline_tax: Decimal,

    /// Liability (with cess) with every capped category claimed at its cap.
    pub optimized_tax: Decimal,

    /// Gross income less the optimized liability.
    pub after_tax_income: Decimal,

    /// `baseline_tax − optimized_tax`, floored at zero.
    pub total_savings: Decimal,

    /// Savings as a percentage of the baseline; zero when the baseline
    /// itself is zero.
    pub savings_percentage: Decimal,
}

/// Calculator for the baseline/optimized comparison.
///
/// Borrows the regime so one schedule can serve any number of independent,
/// idempotent calculations.
#[derive(Debug, Clone)]
pub struct ScenarioCalculator<'a> {
    regime: &'a TaxRegime,
}

impl<'a> ScenarioCalculator<'a> {
    pub fn new(regime: &'a TaxRegime) -> Self {
        Self { regime }
    }

    /// Computes the full comparison for one input set.
    ///
    /// # Errors
    ///
    /// Returns [`TaxScenarioError`] if gross income is negative, any claim
    /// is negative, or the regime fails validation.
    pub fn calculate(
        &self,
        input: &TaxScenarioInput,
    ) -> Result<TaxScenarioResult, TaxScenarioError> {
        self.regime.validate()?;

        if input.gross_income < Decimal::ZERO {
            return Err(TaxScenarioError::NegativeGrossIncome(input.gross_income));
        }
        input.deductions.validate()?;

        if input.gross_income == Decimal::ZERO {
            warn!("gross income is zero; the computed scenario is trivially tax-free");
        }

        let age_bracket = input.age_bracket;
        let basic_exemption = age_bracket.basic_exemption();

        // Baseline: claims exactly as entered.
        let taxable_income = self.taxable_income(
            input.gross_income,
            basic_exemption,
            self.total_deductions(&input.deductions, age_bracket),
        );
        let baseline_tax = self.regime.total_tax(taxable_income);

        // Optimized: every capped category at its cap.
        let optimized_claims = input.deductions.maximized(age_bracket);
        let optimized_taxable = self.taxable_income(
            input.gross_income,
            basic_exemption,
            self.total_deductions(&optimized_claims, age_bracket),
        );
        let optimized_tax = self.regime.total_tax(optimized_taxable);

        let total_savings = max(baseline_tax - optimized_tax, Decimal::ZERO);
        let after_tax_income = input.gross_income - optimized_tax;
        let savings_percentage = self.savings_percentage(baseline_tax, total_savings);

        Ok(TaxScenarioResult {
            taxable_income,
            baseline_tax,
            optimized_tax,
            after_tax_income,
            total_savings,
            savings_percentage,
        })
    }

    /// Standard deduction plus the effective (capped) claim total.
    fn total_deductions(
        &self,
        claims: &DeductionClaims,
        age_bracket: AgeBracket,
    ) -> Decimal {
        self.regime.standard_deduction + claims.total_allowed(age_bracket)
    }

    /// Taxable income, floored at zero.
    fn taxable_income(
        &self,
        gross_income: Decimal,
        basic_exemption: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        max(gross_income - basic_exemption - total_deductions, Decimal::ZERO)
    }

    /// Savings as a percentage of the baseline, guarding the zero baseline.
    fn savings_percentage(
        &self,
        baseline_tax: Decimal,
        total_savings: Decimal,
    ) -> Decimal {
        if baseline_tax == Decimal::ZERO {
            return Decimal::ZERO;
        }
        Decimal::ONE_HUNDRED * total_savings / baseline_tax
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::calculations::common::round_half_up;
    use crate::models::DeductionCategory;

    use super::*;

    fn claims(entries: &[(DeductionCategory, Decimal)]) -> DeductionClaims {
        let mut claims = DeductionClaims::new();
        for &(category, amount) in entries {
            claims.claim(category, amount).unwrap();
        }
        claims
    }

    fn scenario_input(
        gross_income: Decimal,
        age_bracket: AgeBracket,
        deductions: DeductionClaims,
    ) -> TaxScenarioInput {
        TaxScenarioInput {
            gross_income,
            age_bracket,
            deductions,
        }
    }

    // =========================================================================
    // worked example from the planner
    // =========================================================================

    #[test]
    fn calculate_standard_case() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(
            dec!(1200000),
            AgeBracket::Under60,
            claims(&[
                (DeductionCategory::Investments80c, dec!(150000)),
                (DeductionCategory::Health80d, dec!(25000)),
            ]),
        );

        let result = calculator.calculate(&input).unwrap();

        // Deductions: 50,000 standard + 150,000 + 25,000 = 225,000.
        // Taxable: 1,200,000 − 250,000 − 225,000 = 725,000.
        assert_eq!(result.taxable_income, dec!(725000));
        // 27,500 slab tax × 1.04 cess.
        assert_eq!(result.baseline_tax, dec!(28600.00));
        // Optimized deductions: 50,000 + 150,000 + 25,000 + 200,000 + 50,000
        // = 475,000; taxable 475,000; slab tax 8,750; with cess 9,100.
        assert_eq!(result.optimized_tax, dec!(9100.00));
        assert_eq!(result.total_savings, dec!(19500.00));
        assert_eq!(result.after_tax_income, dec!(1190900.00));
        assert_eq!(round_half_up(result.savings_percentage), dec!(68.18));
    }

    #[test]
    fn calculate_senior_bracket_case() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(
            dec!(1000000),
            AgeBracket::SixtyToEighty,
            claims(&[(DeductionCategory::Health80d, dec!(40000))]),
        );

        let result = calculator.calculate(&input).unwrap();

        // The senior 80D cap admits the whole 40,000 claim:
        // 1,000,000 − 300,000 − (50,000 + 40,000) = 610,000.
        assert_eq!(result.taxable_income, dec!(610000));
        // 15,000 + 1,000 slab tax, with cess.
        assert_eq!(result.baseline_tax, dec!(16640.00));
        // Optimized caps (150,000 + 50,000 + 200,000 + 50,000 + standard)
        // push taxable income to 200,000: zero tax, 100% savings.
        assert_eq!(result.optimized_tax, dec!(0));
        assert_eq!(result.savings_percentage, dec!(100));
    }

    #[test]
    fn health_claim_above_non_senior_cap_is_limited() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(
            dec!(1000000),
            AgeBracket::Under60,
            claims(&[(DeductionCategory::Health80d, dec!(40000))]),
        );

        let result = calculator.calculate(&input).unwrap();

        // Only 25,000 of the 40,000 claim counts below the senior brackets.
        assert_eq!(result.taxable_income, dec!(675000));
    }

    // =========================================================================
    // invariants
    // =========================================================================

    #[test]
    fn optimized_never_exceeds_baseline() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);

        for gross in [dec!(0), dec!(400000), dec!(1200000), dec!(5000000)] {
            for age_bracket in [
                AgeBracket::Under60,
                AgeBracket::SixtyToEighty,
                AgeBracket::Over80,
            ] {
                let input = scenario_input(
                    gross,
                    age_bracket,
                    claims(&[(DeductionCategory::Investments80c, dec!(20000))]),
                );

                let result = calculator.calculate(&input).unwrap();

                assert!(
                    result.optimized_tax <= result.baseline_tax,
                    "optimized {} exceeded baseline {} at gross {gross}",
                    result.optimized_tax,
                    result.baseline_tax
                );
            }
        }
    }

    #[test]
    fn zero_income_produces_all_zero_result() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(dec!(0), AgeBracket::Under60, DeductionClaims::new());

        let result = calculator.calculate(&input).unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.baseline_tax, dec!(0));
        assert_eq!(result.optimized_tax, dec!(0));
        assert_eq!(result.total_savings, dec!(0));
        // No division by zero: the percentage is defined as zero here.
        assert_eq!(result.savings_percentage, dec!(0));
    }

    #[test]
    fn overlimit_claim_equals_claiming_exactly_the_cap() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);

        let at_cap = scenario_input(
            dec!(1200000),
            AgeBracket::Under60,
            claims(&[(DeductionCategory::Investments80c, dec!(150000))]),
        );
        let over_cap = scenario_input(
            dec!(1200000),
            AgeBracket::Under60,
            claims(&[(DeductionCategory::Investments80c, dec!(999999))]),
        );

        assert_eq!(
            calculator.calculate(&at_cap).unwrap(),
            calculator.calculate(&over_cap).unwrap()
        );
    }

    #[test]
    fn identical_inputs_yield_identical_results() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(
            dec!(987654),
            AgeBracket::Over80,
            claims(&[
                (DeductionCategory::Investments80c, dec!(120000)),
                (DeductionCategory::EducationLoanInterest, dec!(45000)),
            ]),
        );

        assert_eq!(
            calculator.calculate(&input).unwrap(),
            calculator.calculate(&input).unwrap()
        );
    }

    #[test]
    fn uncapped_claims_are_not_inflated_by_optimization() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);

        let without_education = scenario_input(dec!(2000000), AgeBracket::Under60, DeductionClaims::new());
        let with_education = scenario_input(
            dec!(2000000),
            AgeBracket::Under60,
            claims(&[(DeductionCategory::EducationLoanInterest, dec!(60000))]),
        );

        let bare = calculator.calculate(&without_education).unwrap();
        let with_loan = calculator.calculate(&with_education).unwrap();

        // The education-loan claim carries through the optimized run as
        // entered; the gap between the two optimized figures prices exactly
        // that 60,000 at the marginal rate.
        assert!(with_loan.optimized_tax < bare.optimized_tax);
    }

    // =========================================================================
    // invalid input
    // =========================================================================

    #[test]
    fn negative_gross_income_is_rejected() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(dec!(-1), AgeBracket::Under60, DeductionClaims::new());

        assert_eq!(
            calculator.calculate(&input),
            Err(TaxScenarioError::NegativeGrossIncome(dec!(-1)))
        );
    }

    #[test]
    fn negative_claim_smuggled_past_the_setter_is_rejected() {
        let regime = TaxRegime::fy_2023_24();
        let calculator = ScenarioCalculator::new(&regime);
        // Bypasses DeductionClaims::claim, as a deserialized value could.
        let deductions = DeductionClaims {
            claims: BTreeMap::from([(DeductionCategory::Other, dec!(-500))]),
        };
        let input = scenario_input(dec!(800000), AgeBracket::Under60, deductions);

        assert_eq!(
            calculator.calculate(&input),
            Err(TaxScenarioError::Deduction(DeductionError::NegativeAmount {
                category: DeductionCategory::Other,
                amount: dec!(-500),
            }))
        );
    }

    #[test]
    fn invalid_regime_is_rejected_before_any_arithmetic() {
        let mut regime = TaxRegime::fy_2023_24();
        regime.slabs.clear();
        let calculator = ScenarioCalculator::new(&regime);
        let input = scenario_input(dec!(800000), AgeBracket::Under60, DeductionClaims::new());

        assert_eq!(
            calculator.calculate(&input),
            Err(TaxScenarioError::Regime(RegimeError::NoSlabs))
        );
    }
}
