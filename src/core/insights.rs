//! Read-only derivations the dashboard shows next to the payoff projection.
//! Everything here works on caller-owned records and never mutates them.

use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate};

use super::engine::{HORIZON_MONTHS, compute_payoff, strategy_order, total_min_payment};
use super::types::{
    CashFlow, CategorySpend, Debt, Expense, FinancialProfile, FocusPlan, LumpSumImpact, Milestone,
    PayoffDate, PortfolioSummary, StrategyComparison, Strategy,
};

pub fn summarize(debts: &[Debt]) -> PortfolioSummary {
    let total_balance: f64 = debts.iter().map(|d| d.balance).sum();
    let total_initial_balance: f64 = debts.iter().map(starting_balance).sum();
    let progress_percent = if total_initial_balance > 0.0 {
        (total_initial_balance - total_balance) / total_initial_balance * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        debt_count: debts.len(),
        total_balance,
        total_initial_balance,
        total_min_payment: total_min_payment(debts),
        progress_percent,
    }
}

/// A debt recorded without an opening balance (or with zero) counts from its
/// current balance.
fn starting_balance(debt: &Debt) -> f64 {
    match debt.initial_balance {
        Some(initial) if initial != 0.0 => initial,
        _ => debt.balance,
    }
}

/// Milestones reached by `debts` that are not already in `earned`, in
/// definition order.
pub fn new_milestones(debts: &[Debt], earned: &HashSet<Milestone>) -> Vec<Milestone> {
    let summary = summarize(debts);
    if debts.is_empty() || summary.total_initial_balance == 0.0 {
        return Vec::new();
    }

    let paid_fraction =
        (summary.total_initial_balance - summary.total_balance) / summary.total_initial_balance;

    Milestone::ALL
        .into_iter()
        .filter(|milestone| !earned.contains(milestone))
        .filter(|milestone| match milestone {
            Milestone::FirstDebtPaid => debts
                .iter()
                .any(|d| d.balance <= 0.0 && d.initial_balance.is_some_and(|i| i > 0.0)),
            Milestone::TenPercentDown => paid_fraction >= 0.10,
            Milestone::QuarterDown => paid_fraction >= 0.25,
            Milestone::HalfwayThere => paid_fraction >= 0.50,
        })
        .collect()
}

/// The debt to throw this month's extra money at. Ordering ignores balances
/// entirely, so a settled debt can still come first under avalanche.
pub fn focus_plan(debts: &[Debt], strategy: Strategy, extra_payment: f64) -> Option<FocusPlan> {
    let target = debts
        .iter()
        .min_by(|a, b| strategy_order(a, b, strategy))?;

    Some(FocusPlan {
        debt_id: target.id.clone(),
        debt_name: target.name.clone(),
        strategy,
        min_payment: target.min_payment,
        extra_payment,
        total_payment: target.min_payment + extra_payment,
    })
}

pub fn lump_sum_impact(
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
    lump_sum: f64,
) -> LumpSumImpact {
    let baseline = compute_payoff(debts, extra_payment, strategy, 0.0);
    let with_lump_sum = compute_payoff(debts, extra_payment, strategy, lump_sum);

    LumpSumImpact {
        lump_sum,
        baseline,
        with_lump_sum,
        months_saved: i64::from(baseline.months) - i64::from(with_lump_sum.months),
        interest_saved: baseline.total_interest - with_lump_sum.total_interest,
    }
}

pub fn compare_strategies(debts: &[Debt], extra_payment: f64) -> StrategyComparison {
    let avalanche = compute_payoff(debts, extra_payment, Strategy::Avalanche, 0.0);
    let snowball = compute_payoff(debts, extra_payment, Strategy::Snowball, 0.0);

    StrategyComparison {
        avalanche,
        snowball,
        interest_saved_by_avalanche: snowball.total_interest - avalanche.total_interest,
        months_saved_by_avalanche: i64::from(snowball.months) - i64::from(avalanche.months),
    }
}

/// First day of the month a payoff of `months` lands in. `None` for an empty
/// projection or one that hit the horizon.
pub fn payoff_date(start: NaiveDate, months: u32) -> PayoffDate {
    if months == 0 || months >= HORIZON_MONTHS {
        return None;
    }
    start
        .with_day(1)?
        .checked_add_months(Months::new(months))
}

pub fn cash_flow(
    profile: &FinancialProfile,
    expenses: &[Expense],
    debts: &[Debt],
    extra_payment: f64,
) -> CashFlow {
    let total_income = profile.base_salary + profile.overtime_rate * profile.overtime_hours;
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let total_min_payment = total_min_payment(debts);
    let available = total_income - total_expenses - total_min_payment;

    CashFlow {
        total_income,
        total_expenses,
        total_min_payment,
        available_for_debt: available.max(0.0),
        left_to_spend: (available - extra_payment).max(0.0),
    }
}

/// Per-category totals in first-seen order. Empty when nothing was spent.
pub fn spending_by_category(expenses: &[Expense]) -> Vec<CategorySpend> {
    let mut totals: Vec<CategorySpend> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(entry) => entry.total += expense.amount,
            None => totals.push(CategorySpend {
                category: expense.category,
                total: expense.amount,
                share_percent: 0.0,
            }),
        }
    }

    let grand_total: f64 = totals.iter().map(|t| t.total).sum();
    if grand_total == 0.0 {
        return Vec::new();
    }
    for entry in &mut totals {
        entry.share_percent = entry.total / grand_total * 100.0;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExpenseCategory;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn expense(name: &str, amount: f64, category: ExpenseCategory) -> Expense {
        Expense {
            name: name.to_string(),
            amount,
            category,
        }
    }

    #[test]
    fn summary_falls_back_to_current_balance_without_initial() {
        let debts = vec![
            Debt::new("a", 600.0, 20.0, 25.0).with_initial_balance(1_000.0),
            Debt::new("b", 1_000.0, 10.0, 50.0),
            Debt::new("c", 400.0, 10.0, 15.0).with_initial_balance(0.0),
        ];
        let summary = summarize(&debts);

        assert_eq!(summary.debt_count, 3);
        assert_approx(summary.total_balance, 2_000.0);
        assert_approx(summary.total_initial_balance, 2_400.0);
        assert_approx(summary.total_min_payment, 90.0);
        assert_approx(summary.progress_percent, 400.0 / 2_400.0 * 100.0);
    }

    #[test]
    fn summary_of_nothing_has_zero_progress() {
        let summary = summarize(&[]);
        assert_eq!(summary.debt_count, 0);
        assert_approx(summary.progress_percent, 0.0);
    }

    #[test]
    fn milestones_follow_paid_fraction() {
        let debts = vec![
            Debt::new("a", 0.0, 20.0, 25.0).with_initial_balance(300.0),
            Debt::new("b", 700.0, 10.0, 50.0).with_initial_balance(700.0),
        ];
        let reached = new_milestones(&debts, &HashSet::new());
        assert_eq!(
            reached,
            vec![
                Milestone::FirstDebtPaid,
                Milestone::TenPercentDown,
                Milestone::QuarterDown
            ]
        );
    }

    #[test]
    fn earned_milestones_are_not_repeated() {
        let debts = vec![Debt::new("a", 400.0, 20.0, 25.0).with_initial_balance(1_000.0)];
        let earned: HashSet<Milestone> =
            [Milestone::TenPercentDown, Milestone::QuarterDown].into_iter().collect();
        assert_eq!(new_milestones(&debts, &earned), vec![Milestone::HalfwayThere]);
    }

    #[test]
    fn first_debt_paid_needs_recorded_initial_balance() {
        let debts = vec![
            Debt::new("a", 0.0, 20.0, 25.0),
            Debt::new("b", 500.0, 10.0, 50.0),
        ];
        assert!(new_milestones(&debts, &HashSet::new()).is_empty());
    }

    #[test]
    fn milestones_skip_empty_portfolio() {
        assert!(new_milestones(&[], &HashSet::new()).is_empty());
        let zeroed = vec![Debt::new("a", 0.0, 20.0, 25.0)];
        assert!(new_milestones(&zeroed, &HashSet::new()).is_empty());
    }

    #[test]
    fn milestone_ids_round_trip() {
        for milestone in Milestone::ALL {
            assert_eq!(Milestone::from_id(milestone.id()), Some(milestone));
        }
        assert_eq!(Milestone::from_id("paid_99_percent"), None);
    }

    #[test]
    fn focus_plan_picks_strategy_head_without_filtering_balances() {
        let debts = vec![
            Debt::new("cheap", 2_000.0, 4.0, 60.0).with_name("Cheap loan"),
            Debt::new("settled", 0.0, 29.0, 35.0).with_name("Old card"),
        ];
        let avalanche = focus_plan(&debts, Strategy::Avalanche, 120.0).expect("plan");
        assert_eq!(avalanche.debt_id, "settled");
        assert_approx(avalanche.total_payment, 155.0);

        let snowball = focus_plan(&debts, Strategy::Snowball, 120.0).expect("plan");
        assert_eq!(snowball.debt_id, "settled");

        assert!(focus_plan(&[], Strategy::Snowball, 120.0).is_none());
    }

    #[test]
    fn lump_sum_impact_reports_savings() {
        let debts = vec![Debt::new("a", 5_000.0, 18.0, 150.0)];
        let impact = lump_sum_impact(&debts, 50.0, Strategy::Avalanche, 1_000.0);

        assert!(impact.months_saved > 0);
        assert!(impact.interest_saved > 0.0);
        assert_eq!(
            impact.months_saved,
            i64::from(impact.baseline.months) - i64::from(impact.with_lump_sum.months)
        );
    }

    #[test]
    fn comparison_favours_avalanche_on_interest() {
        let debts = vec![
            Debt::new("expensive", 5_000.0, 25.0, 100.0),
            Debt::new("cheap", 1_000.0, 5.0, 25.0),
        ];
        let comparison = compare_strategies(&debts, 200.0);
        assert!(comparison.interest_saved_by_avalanche > 0.0);
        assert_approx(
            comparison.interest_saved_by_avalanche,
            comparison.snowball.total_interest - comparison.avalanche.total_interest,
        );
    }

    #[test]
    fn payoff_date_lands_on_first_of_month() {
        assert_eq!(payoff_date(date(2026, 10, 14), 3), Some(date(2027, 1, 1)));
        assert_eq!(payoff_date(date(2026, 1, 31), 1), Some(date(2026, 2, 1)));
        assert_eq!(payoff_date(date(2026, 10, 14), 0), None);
        assert_eq!(payoff_date(date(2026, 10, 14), HORIZON_MONTHS), None);
    }

    #[test]
    fn cash_flow_clamps_at_zero() {
        let profile = FinancialProfile {
            base_salary: 3_000.0,
            overtime_rate: 25.0,
            overtime_hours: 8.0,
        };
        let expenses = vec![
            expense("Rent", 1_400.0, ExpenseCategory::Housing),
            expense("Groceries", 450.0, ExpenseCategory::Food),
        ];
        let debts = vec![Debt::new("a", 5_000.0, 18.0, 150.0)];

        let flow = cash_flow(&profile, &expenses, &debts, 500.0);
        assert_approx(flow.total_income, 3_200.0);
        assert_approx(flow.total_expenses, 1_850.0);
        assert_approx(flow.total_min_payment, 150.0);
        assert_approx(flow.available_for_debt, 1_200.0);
        assert_approx(flow.left_to_spend, 700.0);

        let stretched = cash_flow(&profile, &expenses, &debts, 5_000.0);
        assert_approx(stretched.left_to_spend, 0.0);

        let broke = cash_flow(&FinancialProfile::default(), &expenses, &debts, 0.0);
        assert_approx(broke.available_for_debt, 0.0);
    }

    #[test]
    fn spending_groups_by_category_in_first_seen_order() {
        let expenses = vec![
            expense("Netflix", 15.0, ExpenseCategory::Subscriptions),
            expense("Rent", 1_200.0, ExpenseCategory::Housing),
            expense("Spotify", 10.0, ExpenseCategory::Subscriptions),
            expense("Bus", 25.0, ExpenseCategory::Transport),
        ];
        let breakdown = spending_by_category(&expenses);

        let categories: Vec<ExpenseCategory> = breakdown.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                ExpenseCategory::Subscriptions,
                ExpenseCategory::Housing,
                ExpenseCategory::Transport
            ]
        );
        assert_approx(breakdown[0].total, 25.0);
        assert_approx(breakdown[0].share_percent, 2.0);
        let share_sum: f64 = breakdown.iter().map(|c| c.share_percent).sum();
        assert_approx(share_sum, 100.0);
    }

    #[test]
    fn spending_with_zero_total_is_empty() {
        assert!(spending_by_category(&[]).is_empty());
        let free = vec![expense("Library", 0.0, ExpenseCategory::Entertainment)];
        assert!(spending_by_category(&free).is_empty());
    }
}
