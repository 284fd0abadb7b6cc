use std::collections::HashSet;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    AmortizationRow, CashFlow, CategorySpend, Debt, Expense, ExpenseCategory, FinancialProfile,
    FocusPlan, GoalSolveResult, HORIZON_MONTHS, LumpSumImpact, Milestone, PayoffDate,
    PortfolioSummary, SimulationResult, Strategy, StrategyComparison, cash_flow,
    compare_strategies, compute_amortization, compute_payoff, focus_plan, lump_sum_impact,
    months_until, new_milestones, payoff_date, solve_goal, spending_by_category, summarize,
};

mod cli;
mod error;

pub use cli::{Cli, CliStrategy, Commands, PlanArgs, run};
pub use error::ApiError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiStrategy {
    #[default]
    #[serde(alias = "Avalanche", alias = "AVALANCHE")]
    Avalanche,
    #[serde(alias = "Snowball", alias = "SNOWBALL")]
    Snowball,
}

impl From<ApiStrategy> for Strategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => Strategy::Avalanche,
            ApiStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtPayload {
    id: Option<String>,
    name: Option<String>,
    balance: Option<f64>,
    apr: Option<f64>,
    min_payment: Option<f64>,
    initial_balance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PayoffPayload {
    debts: Vec<DebtPayload>,
    extra_payment: Option<f64>,
    strategy: Option<ApiStrategy>,
    lump_sum: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AmortizationPayload {
    debts: Vec<DebtPayload>,
    target_id: Option<String>,
    extra_payment: Option<f64>,
    strategy: Option<ApiStrategy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    debts: Vec<DebtPayload>,
    strategy: Option<ApiStrategy>,
    months_to_target: Option<i64>,
    goal_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    debts: Vec<DebtPayload>,
    extra_payment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryPayload {
    debts: Vec<DebtPayload>,
    strategy: Option<ApiStrategy>,
    extra_payment: Option<f64>,
    earned: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfilePayload {
    base_salary: Option<f64>,
    overtime_rate: Option<f64>,
    overtime_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExpensePayload {
    name: Option<String>,
    amount: Option<f64>,
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BudgetPayload {
    profile: ProfilePayload,
    expenses: Vec<ExpensePayload>,
    debts: Vec<DebtPayload>,
    extra_payment: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayoffResponse {
    strategy: Strategy,
    extra_payment: f64,
    lump_sum: f64,
    #[serde(flatten)]
    result: SimulationResult,
    /// False when the projection hit the horizon.
    payoff_feasible: bool,
    payoff_date: PayoffDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AmortizationResponse {
    target_id: String,
    target_name: String,
    strategy: Strategy,
    extra_payment: f64,
    rows: Vec<AmortizationRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    strategy: Strategy,
    #[serde(flatten)]
    goal: GoalSolveResult,
    projected: SimulationResult,
    payoff_date: PayoffDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    extra_payment: f64,
    #[serde(flatten)]
    comparison: StrategyComparison,
    avalanche_payoff_date: PayoffDate,
    snowball_payoff_date: PayoffDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WhatIfResponse {
    strategy: Strategy,
    #[serde(flatten)]
    impact: LumpSumImpact,
    baseline_payoff_date: PayoffDate,
    new_payoff_date: PayoffDate,
}

#[derive(Debug, Serialize)]
struct MilestoneResponse {
    id: &'static str,
    title: &'static str,
}

impl From<Milestone> for MilestoneResponse {
    fn from(value: Milestone) -> Self {
        Self {
            id: value.id(),
            title: value.title(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    summary: PortfolioSummary,
    focus: Option<FocusPlan>,
    new_milestones: Vec<MilestoneResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetResponse {
    cash_flow: CashFlow,
    spending: Vec<CategorySpend>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Missing, negative and non-finite amounts all become zero.
fn amount(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn debts_from_payload(payloads: Vec<DebtPayload>) -> Result<Vec<Debt>, ApiError> {
    let mut seen = HashSet::with_capacity(payloads.len());
    payloads
        .into_iter()
        .enumerate()
        .map(|(idx, payload)| {
            let id = payload
                .id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .ok_or(ApiError::EmptyDebtId(idx + 1))?;
            if !seen.insert(id.clone()) {
                return Err(ApiError::DuplicateDebtId(id));
            }
            let name = payload
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| id.clone());

            Ok(Debt {
                id,
                name,
                balance: amount(payload.balance),
                apr: amount(payload.apr),
                min_payment: amount(payload.min_payment),
                initial_balance: payload.initial_balance.map(|v| amount(Some(v))),
            })
        })
        .collect()
}

fn expense_from_payload(payload: ExpensePayload) -> Expense {
    Expense {
        name: payload.name.unwrap_or_default(),
        amount: amount(payload.amount),
        category: payload
            .category
            .as_deref()
            .map(parse_category)
            .unwrap_or(ExpenseCategory::Other),
    }
}

fn parse_category(raw: &str) -> ExpenseCategory {
    match raw.trim().to_ascii_lowercase().as_str() {
        "housing" => ExpenseCategory::Housing,
        "utilities" => ExpenseCategory::Utilities,
        "food" => ExpenseCategory::Food,
        "transport" => ExpenseCategory::Transport,
        "entertainment" => ExpenseCategory::Entertainment,
        "subscriptions" => ExpenseCategory::Subscriptions,
        _ => ExpenseCategory::Other,
    }
}

fn profile_from_payload(payload: ProfilePayload) -> FinancialProfile {
    FinancialProfile {
        base_salary: amount(payload.base_salary),
        overtime_rate: amount(payload.overtime_rate),
        overtime_hours: amount(payload.overtime_hours),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/payoff", post(payoff_handler))
        .route("/api/amortization", post(amortization_handler))
        .route("/api/goal", post(goal_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/what-if", post(what_if_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/budget", post(budget_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "paydown HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn payoff_handler(
    payload: Result<Json<PayoffPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let strategy: Strategy = payload.strategy.unwrap_or_default().into();
    debug!(debts = debts.len(), ?strategy, "payoff request");

    let response = payoff_response(
        &debts,
        amount(payload.extra_payment),
        strategy,
        amount(payload.lump_sum),
        today(),
    );
    Ok(json_response(StatusCode::OK, response))
}

async fn amortization_handler(
    payload: Result<Json<AmortizationPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let target_id = payload.target_id.ok_or(ApiError::MissingTarget)?;
    let strategy: Strategy = payload.strategy.unwrap_or_default().into();
    debug!(debts = debts.len(), ?strategy, target = %target_id, "amortization request");

    let response =
        amortization_response(&debts, &target_id, amount(payload.extra_payment), strategy)?;
    Ok(json_response(StatusCode::OK, response))
}

async fn goal_handler(
    payload: Result<Json<GoalPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let strategy: Strategy = payload.strategy.unwrap_or_default().into();
    let today = today();
    let months_to_target = match (payload.months_to_target, payload.goal_date) {
        (Some(months), _) => months,
        (None, Some(goal_date)) => months_until(today, goal_date),
        (None, None) => return Err(ApiError::MissingGoal),
    };
    debug!(debts = debts.len(), ?strategy, months_to_target, "goal request");

    let response = goal_response(&debts, strategy, months_to_target, today);
    Ok(json_response(StatusCode::OK, response))
}

async fn compare_handler(
    payload: Result<Json<ComparePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    debug!(debts = debts.len(), "compare request");

    let response = compare_response(&debts, amount(payload.extra_payment), today());
    Ok(json_response(StatusCode::OK, response))
}

async fn what_if_handler(
    payload: Result<Json<PayoffPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let strategy: Strategy = payload.strategy.unwrap_or_default().into();
    debug!(debts = debts.len(), ?strategy, "what-if request");

    let impact = lump_sum_impact(
        &debts,
        amount(payload.extra_payment),
        strategy,
        amount(payload.lump_sum),
    );
    let today = today();
    let response = WhatIfResponse {
        strategy,
        baseline_payoff_date: payoff_date(today, impact.baseline.months),
        new_payoff_date: payoff_date(today, impact.with_lump_sum.months),
        impact,
    };
    Ok(json_response(StatusCode::OK, response))
}

async fn summary_handler(
    payload: Result<Json<SummaryPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let strategy: Strategy = payload.strategy.unwrap_or_default().into();
    debug!(debts = debts.len(), ?strategy, "summary request");

    let earned: HashSet<Milestone> = payload
        .earned
        .iter()
        .filter_map(|id| Milestone::from_id(id))
        .collect();
    let response = SummaryResponse {
        summary: summarize(&debts),
        focus: focus_plan(&debts, strategy, amount(payload.extra_payment)),
        new_milestones: new_milestones(&debts, &earned)
            .into_iter()
            .map(MilestoneResponse::from)
            .collect(),
    };
    Ok(json_response(StatusCode::OK, response))
}

async fn budget_handler(
    payload: Result<Json<BudgetPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let debts = debts_from_payload(payload.debts)?;
    let profile = profile_from_payload(payload.profile);
    let expenses: Vec<Expense> = payload
        .expenses
        .into_iter()
        .map(expense_from_payload)
        .collect();
    debug!(
        debts = debts.len(),
        expenses = expenses.len(),
        "budget request"
    );

    let response = BudgetResponse {
        cash_flow: cash_flow(&profile, &expenses, &debts, amount(payload.extra_payment)),
        spending: spending_by_category(&expenses),
    };
    Ok(json_response(StatusCode::OK, response))
}

fn payoff_response(
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
    lump_sum: f64,
    today: NaiveDate,
) -> PayoffResponse {
    let result = compute_payoff(debts, extra_payment, strategy, lump_sum);
    PayoffResponse {
        strategy,
        extra_payment,
        lump_sum,
        result,
        payoff_feasible: result.months < HORIZON_MONTHS,
        payoff_date: payoff_date(today, result.months),
    }
}

fn amortization_response(
    debts: &[Debt],
    target_id: &str,
    extra_payment: f64,
    strategy: Strategy,
) -> Result<AmortizationResponse, ApiError> {
    let target = debts
        .iter()
        .find(|d| d.id == target_id)
        .ok_or_else(|| ApiError::UnknownTarget(target_id.to_string()))?;

    Ok(AmortizationResponse {
        target_id: target.id.clone(),
        target_name: target.name.clone(),
        strategy,
        extra_payment,
        rows: compute_amortization(target_id, debts, extra_payment, strategy),
    })
}

fn goal_response(
    debts: &[Debt],
    strategy: Strategy,
    months_to_target: i64,
    today: NaiveDate,
) -> GoalResponse {
    let goal = solve_goal(debts, strategy, months_to_target);
    let projected = compute_payoff(debts, goal.extra_payment, strategy, 0.0);
    GoalResponse {
        strategy,
        goal,
        projected,
        payoff_date: payoff_date(today, projected.months),
    }
}

fn compare_response(debts: &[Debt], extra_payment: f64, today: NaiveDate) -> CompareResponse {
    let comparison = compare_strategies(debts, extra_payment);
    CompareResponse {
        extra_payment,
        avalanche_payoff_date: payoff_date(today, comparison.avalanche.months),
        snowball_payoff_date: payoff_date(today, comparison.snowball.months),
        comparison,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
