mod engine;
mod insights;
mod solver;
mod types;

pub use engine::{HORIZON_MONTHS, compute_amortization, compute_payoff};
pub use insights::{
    cash_flow, compare_strategies, focus_plan, lump_sum_impact, new_milestones, payoff_date,
    spending_by_category, summarize,
};
pub use solver::{GOAL_SEARCH_ITERATIONS, months_until, solve_extra_payment_for_date, solve_goal};
pub use types::{
    AmortizationRow, CashFlow, CategorySpend, Debt, Expense, ExpenseCategory, FinancialProfile,
    FocusPlan, GoalSolveIteration, GoalSolveResult, LumpSumImpact, Milestone, PayoffDate,
    PortfolioSummary, SimulationResult, Strategy, StrategyComparison,
};
