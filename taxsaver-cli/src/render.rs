//! Plain-text rendering for calculator output and planner reports.
//!
//! All display rounding happens here, at the presentation boundary; the
//! engine hands over full-precision values.

use std::collections::BTreeMap;
use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};
use taxsaver_core::calculations::common::round_half_up;
use taxsaver_core::calculations::{TaxScenarioInput, TaxScenarioResult};
use taxsaver_core::models::{Expense, FamilyMember, SavingsGoal};

/// Format a money amount with two decimals, rounded half-up.
pub fn money(amount: Decimal) -> String {
    format!("₹{:.2}", round_half_up(amount))
}

/// Format a percentage with one decimal, rounded half-up.
pub fn percent(value: Decimal) -> String {
    format!(
        "{}%",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// The baseline/optimized comparison panel.
pub fn scenario_summary(input: &TaxScenarioInput, result: &TaxScenarioResult) -> String {
    let mut out = String::new();
    out.push_str("Tax optimization results\n");
    out.push_str("========================\n");
    let _ = writeln!(out, "{:<26}{}", "Gross income", money(input.gross_income));
    let _ = writeln!(out, "{:<26}{}", "Age group", input.age_bracket.as_str());

    if input.deductions.is_empty() {
        out.push_str("Claimed deductions        none\n");
    } else {
        out.push_str("Claimed deductions\n");
        for (category, amount) in input.deductions.iter() {
            let _ = writeln!(
                out,
                "  {:<10}{:<14}{}",
                category.as_str(),
                money(amount),
                category.label()
            );
        }
    }

    let _ = writeln!(out, "{:<26}{}", "Taxable income", money(result.taxable_income));
    let _ = writeln!(
        out,
        "{:<26}{}",
        "Tax without optimization",
        money(result.baseline_tax)
    );
    let _ = writeln!(
        out,
        "{:<26}{}",
        "Tax with optimization",
        money(result.optimized_tax)
    );
    let _ = writeln!(
        out,
        "{:<26}{}",
        "After-tax income",
        money(result.after_tax_income)
    );
    let _ = writeln!(
        out,
        "{:<26}{} ({} reduction)",
        "You could save",
        money(result.total_savings),
        percent(result.savings_percentage)
    );
    out
}

/// The planner overview: family income, expense totals by deduction section,
/// and savings-goal progress.
pub fn planner_report(
    members: &[FamilyMember],
    expenses: &[Expense],
    goals: &[SavingsGoal],
) -> String {
    let mut out = String::new();
    out.push_str("Planner report\n");
    out.push_str("==============\n");

    let combined_income: Decimal = members.iter().map(|m| m.income).sum();
    let _ = writeln!(
        out,
        "Family members: {} (combined income {})",
        members.len(),
        money(combined_income)
    );

    let total_spend: Decimal = expenses.iter().map(|e| e.amount).sum();
    let _ = writeln!(out, "Expenses: {} totalling {}", expenses.len(), money(total_spend));

    let mut by_section: BTreeMap<&'static str, Decimal> = BTreeMap::new();
    let mut deductible_total = Decimal::ZERO;
    for expense in expenses.iter().filter(|e| e.tax_deductible) {
        deductible_total += expense.amount;
        let section = expense.section.map(|s| s.as_str()).unwrap_or("unassigned");
        *by_section.entry(section).or_insert(Decimal::ZERO) += expense.amount;
    }
    if !by_section.is_empty() {
        let _ = writeln!(out, "  Deductible {} across sections:", money(deductible_total));
        for (section, amount) in &by_section {
            let _ = writeln!(out, "    {:<12}{}", section, money(*amount));
        }
    }

    if goals.is_empty() {
        out.push_str("Savings goals: none\n");
    } else {
        out.push_str("Savings goals\n");
        for goal in goals {
            let _ = writeln!(
                out,
                "  [{}] {}: {} of {} ({})",
                goal.priority.as_str(),
                goal.title,
                money(goal.current_amount),
                money(goal.target_amount),
                percent(goal.progress_percentage())
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use taxsaver_core::calculations::{ScenarioCalculator, TaxRegime, TaxScenarioInput};
    use taxsaver_core::models::{
        AgeBracket, DeductionCategory, DeductionClaims, GoalPriority,
    };

    use super::*;

    #[test]
    fn money_pads_to_two_decimals() {
        assert_eq!(money(dec!(28600)), "₹28600.00");
        assert_eq!(money(dec!(9400.5)), "₹9400.50");
    }

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(money(dec!(19500.005)), "₹19500.01");
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(dec!(68.1818)), "68.2%");
        assert_eq!(percent(dec!(0)), "0%");
    }

    #[test]
    fn scenario_summary_shows_the_comparison() {
        let regime = TaxRegime::fy_2023_24();
        let mut deductions = DeductionClaims::new();
        deductions
            .claim(DeductionCategory::Investments80c, dec!(150000))
            .unwrap();
        deductions
            .claim(DeductionCategory::Health80d, dec!(25000))
            .unwrap();
        let input = TaxScenarioInput {
            gross_income: dec!(1200000),
            age_bracket: AgeBracket::Under60,
            deductions,
        };
        let result = ScenarioCalculator::new(&regime).calculate(&input).unwrap();

        let text = scenario_summary(&input, &result);

        assert!(text.contains("Tax without optimization  ₹28600.00"));
        assert!(text.contains("Tax with optimization     ₹9100.00"));
        assert!(text.contains("₹19500.00 (68.2% reduction)"));
        assert!(text.contains("80C"));
    }

    #[test]
    fn scenario_summary_handles_no_claims() {
        let regime = TaxRegime::fy_2023_24();
        let input = TaxScenarioInput {
            gross_income: dec!(300000),
            age_bracket: AgeBracket::Under60,
            deductions: DeductionClaims::new(),
        };
        let result = ScenarioCalculator::new(&regime).calculate(&input).unwrap();

        let text = scenario_summary(&input, &result);

        assert!(text.contains("Claimed deductions        none"));
        assert!(text.contains("(0% reduction)"));
    }

    #[test]
    fn planner_report_groups_deductible_spend_by_section() {
        let now = Utc::now();
        let expense = |amount, deductible, section| Expense {
            id: 1,
            category: "x".to_string(),
            description: "y".to_string(),
            amount,
            incurred_on: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            tax_deductible: deductible,
            section,
            created_at: now,
            updated_at: now,
        };
        let expenses = vec![
            expense(dec!(18500), true, Some(DeductionCategory::Health80d)),
            expense(dec!(20000), true, Some(DeductionCategory::Investments80c)),
            expense(dec!(9400.50), false, None),
        ];

        let text = planner_report(&[], &expenses, &[]);

        assert!(text.contains("Expenses: 3 totalling ₹47900.50"));
        assert!(text.contains("Deductible ₹38500.00 across sections:"));
        assert!(text.contains("80D"));
        assert!(text.contains("80C"));
        assert!(text.contains("Savings goals: none"));
    }

    #[test]
    fn planner_report_shows_goal_progress() {
        let now = Utc::now();
        let goal = SavingsGoal {
            id: 1,
            title: "ELSS top-up".to_string(),
            target_amount: dec!(150000),
            current_amount: dec!(60000),
            category: "Investments".to_string(),
            target_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            priority: GoalPriority::High,
            description: String::new(),
            tax_benefit: Some("80C".to_string()),
            created_at: now,
            updated_at: now,
        };

        let text = planner_report(&[], &[], &[goal]);

        assert!(text.contains("[High] ELSS top-up: ₹60000.00 of ₹150000.00 (40%)"));
    }
}
