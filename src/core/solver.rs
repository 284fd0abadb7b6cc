use chrono::{Datelike, NaiveDate};

use super::engine::compute_payoff;
use super::types::{Debt, GoalSolveIteration, GoalSolveResult, Strategy};

/// Bisection steps for the goal solver. Resolution is `total balance / 2^30`.
pub const GOAL_SEARCH_ITERATIONS: u32 = 30;

/// Smallest extra monthly payment that clears `debts` within
/// `months_to_target` months, with the full bisection trace.
pub fn solve_goal(debts: &[Debt], strategy: Strategy, months_to_target: i64) -> GoalSolveResult {
    let search_max: f64 = debts.iter().map(|d| d.balance).sum();

    if months_to_target <= 0 {
        return GoalSolveResult {
            months_to_target,
            search_max,
            extra_payment: search_max,
            feasible: true,
            iterations: Vec::new(),
        };
    }

    let mut iterations = Vec::with_capacity(GOAL_SEARCH_ITERATIONS as usize);
    let mut lo = 0.0;
    let mut hi = search_max;
    let mut required = hi;
    let mut feasible = false;

    for it in 1..=GOAL_SEARCH_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        let result = compute_payoff(debts, mid, strategy, 0.0);
        let reached = i64::from(result.months) <= months_to_target;
        iterations.push(GoalSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            months: result.months,
            feasible: reached,
        });

        if reached {
            required = mid;
            hi = mid;
            feasible = true;
        } else {
            lo = mid;
        }
    }

    GoalSolveResult {
        months_to_target,
        search_max,
        extra_payment: required.max(0.0),
        feasible,
        iterations,
    }
}

pub fn solve_extra_payment_for_date(
    debts: &[Debt],
    strategy: Strategy,
    months_to_target: i64,
) -> f64 {
    solve_goal(debts, strategy, months_to_target).extra_payment
}

/// Whole calendar months from `today` to `goal_date`. Days are ignored, so
/// the 31st to the 1st of the next month counts as one month.
pub fn months_until(today: NaiveDate, goal_date: NaiveDate) -> i64 {
    let years = i64::from(goal_date.year()) - i64::from(today.year());
    let months = i64::from(goal_date.month()) - i64::from(today.month());
    years * 12 + months
}
