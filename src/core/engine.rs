use std::cmp::Ordering;

use super::types::{AmortizationRow, Debt, SimulationResult, Strategy};

/// Longest projection the simulator runs, in months (50 years).
pub const HORIZON_MONTHS: u32 = 600;

pub fn compute_payoff(
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
    lump_sum: f64,
) -> SimulationResult {
    if debts.is_empty() {
        return SimulationResult::ZERO;
    }

    let mut ledger = debts.to_vec();
    if lump_sum > 0.0 {
        apply_lump_sum(&mut ledger, strategy, lump_sum);
    }

    // Fixed for the whole run: a retired debt's minimum keeps flowing into the
    // target's pool instead of shrinking the monthly budget.
    let total_monthly_payment = total_min_payment(&ledger) + extra_payment;

    let mut months = 0;
    let mut total_interest = 0.0;
    while months < HORIZON_MONTHS && has_outstanding(&ledger) {
        months += 1;
        total_interest += accrue_interest(&mut ledger);

        let Some(target) = priority_target(&ledger, strategy) else {
            break;
        };
        let pool = pay_minimums(&mut ledger, target, total_monthly_payment);
        settle(&mut ledger[target], pool);
    }

    SimulationResult {
        months,
        total_interest,
    }
}

/// Month-by-month breakdown for the debt with id `target_id` while every debt
/// follows the global strategy. Paying the month's overall target when it is a
/// different debt still happens, it is just not reported in the row.
pub fn compute_amortization(
    target_id: &str,
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
) -> Vec<AmortizationRow> {
    let mut ledger = debts.to_vec();
    let Some(requested) = ledger.iter().position(|d| d.id == target_id) else {
        return Vec::new();
    };
    let total_monthly_payment = total_min_payment(&ledger) + extra_payment;

    let mut rows = Vec::new();
    let mut month = 0;
    while month < HORIZON_MONTHS && ledger[requested].balance > 0.0 {
        month += 1;

        let opening = ledger[requested].balance;
        accrue_interest(&mut ledger);
        let interest = ledger[requested].balance - opening;

        let Some(overall) = priority_target(&ledger, strategy) else {
            break;
        };

        let payment = if overall == requested {
            let pool = pay_minimums(&mut ledger, requested, total_monthly_payment);
            settle(&mut ledger[requested], pool)
        } else {
            // The requested debt is only paid its minimum, which comes out of
            // the pool along with every other non-target minimum.
            let before = ledger[requested].balance;
            let pool = pay_minimums(&mut ledger, overall, total_monthly_payment);
            settle(&mut ledger[overall], pool);
            before - ledger[requested].balance
        };

        rows.push(AmortizationRow {
            month,
            payment,
            principal: payment - interest,
            interest,
            ending_balance: ledger[requested].balance,
        });
    }
    rows
}

/// Strategy key ordering only. Equal keys compare equal so callers keep input
/// order for ties.
pub(crate) fn strategy_order(a: &Debt, b: &Debt, strategy: Strategy) -> Ordering {
    match strategy {
        Strategy::Avalanche => b.apr.total_cmp(&a.apr),
        Strategy::Snowball => a.balance.total_cmp(&b.balance),
    }
}

/// Strategy ordering with settled debts (balance <= 0) always last.
fn payment_order(a: &Debt, b: &Debt, strategy: Strategy) -> Ordering {
    match (a.balance > 0.0, b.balance > 0.0) {
        (true, true) => strategy_order(a, b, strategy),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Index of the first outstanding debt in payment order. Recomputed from
/// scratch every month.
fn priority_target(ledger: &[Debt], strategy: Strategy) -> Option<usize> {
    ledger
        .iter()
        .enumerate()
        .filter(|(_, debt)| debt.balance > 0.0)
        .min_by(|(_, a), (_, b)| payment_order(a, b, strategy))
        .map(|(idx, _)| idx)
}

fn apply_lump_sum(ledger: &mut [Debt], strategy: Strategy, lump_sum: f64) {
    if let Some(target) = priority_target(ledger, strategy) {
        let debt = &mut ledger[target];
        debt.balance -= debt.balance.min(lump_sum);
    }
}

pub(crate) fn total_min_payment(debts: &[Debt]) -> f64 {
    debts.iter().map(|d| d.min_payment).sum()
}

fn has_outstanding(ledger: &[Debt]) -> bool {
    ledger.iter().any(|d| d.balance > 0.0)
}

/// Adds one month of interest to every outstanding balance, returning the
/// total accrued.
fn accrue_interest(ledger: &mut [Debt]) -> f64 {
    let mut accrued = 0.0;
    for debt in ledger.iter_mut().filter(|d| d.balance > 0.0) {
        let interest = monthly_interest(debt.balance, debt.apr);
        debt.balance += interest;
        accrued += interest;
    }
    accrued
}

fn monthly_interest(balance: f64, apr: f64) -> f64 {
    balance * (apr / 100.0) / 12.0
}

/// Pays the minimum on every outstanding debt except `target`, returning what
/// is left of `pool`.
fn pay_minimums(ledger: &mut [Debt], target: usize, pool: f64) -> f64 {
    let mut pool = pool;
    for (idx, debt) in ledger.iter_mut().enumerate() {
        if idx == target || debt.balance <= 0.0 {
            continue;
        }
        let payment = debt.balance.min(debt.min_payment);
        debt.balance -= payment;
        pool -= payment;
    }
    pool
}

fn settle(debt: &mut Debt, pool: f64) -> f64 {
    let payment = debt.balance.min(pool);
    debt.balance -= payment;
    payment
}
