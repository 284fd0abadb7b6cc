use chrono::NaiveDate;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest APR first.
    Avalanche,
    /// Smallest balance first.
    Snowball,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    /// Annual percentage rate in percent, e.g. 19.99.
    pub apr: f64,
    pub min_payment: f64,
    /// Balance when the debt was first recorded. Only used for progress reporting.
    pub initial_balance: Option<f64>,
}

impl Debt {
    pub fn new(id: impl Into<String>, balance: f64, apr: f64, min_payment: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            balance,
            apr,
            min_payment,
            initial_balance: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = Some(initial_balance);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub months: u32,
    pub total_interest: f64,
}

impl SimulationResult {
    pub const ZERO: Self = Self {
        months: 0,
        total_interest: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Raw balance after this month's payment. Can be a tiny negative residual;
    /// use [`AmortizationRow::display_balance`] when presenting it.
    #[serde(serialize_with = "serialize_floored")]
    pub ending_balance: f64,
}

impl AmortizationRow {
    pub fn display_balance(&self) -> f64 {
        self.ending_balance.max(0.0)
    }
}

fn serialize_floored<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub debt_count: usize,
    pub total_balance: f64,
    pub total_initial_balance: f64,
    pub total_min_payment: f64,
    pub progress_percent: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Milestone {
    FirstDebtPaid,
    TenPercentDown,
    QuarterDown,
    HalfwayThere,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::FirstDebtPaid,
        Milestone::TenPercentDown,
        Milestone::QuarterDown,
        Milestone::HalfwayThere,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Milestone::FirstDebtPaid => "paid_off_first",
            Milestone::TenPercentDown => "paid_10_percent",
            Milestone::QuarterDown => "paid_25_percent",
            Milestone::HalfwayThere => "paid_50_percent",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Milestone::FirstDebtPaid => "First Debt Paid!",
            Milestone::TenPercentDown => "10% Down!",
            Milestone::QuarterDown => "25% Crushed!",
            Milestone::HalfwayThere => "Halfway There!",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusPlan {
    pub debt_id: String,
    pub debt_name: String,
    pub strategy: Strategy,
    pub min_payment: f64,
    pub extra_payment: f64,
    pub total_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpSumImpact {
    pub lump_sum: f64,
    pub baseline: SimulationResult,
    pub with_lump_sum: SimulationResult,
    pub months_saved: i64,
    pub interest_saved: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: SimulationResult,
    pub snowball: SimulationResult,
    /// Positive when avalanche pays less interest.
    pub interest_saved_by_avalanche: f64,
    pub months_saved_by_avalanche: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialProfile {
    pub base_salary: f64,
    pub overtime_rate: f64,
    pub overtime_hours: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum ExpenseCategory {
    Housing,
    Utilities,
    Food,
    Transport,
    Entertainment,
    Subscriptions,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub name: String,
    pub amount: f64,
    pub category: ExpenseCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_min_payment: f64,
    pub available_for_debt: f64,
    pub left_to_spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: ExpenseCategory,
    pub total: f64,
    pub share_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub months: u32,
    pub feasible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub months_to_target: i64,
    pub search_max: f64,
    pub extra_payment: f64,
    /// False when the search ran and no probed candidate reached the target,
    /// in which case `extra_payment` is the upper search bound.
    pub feasible: bool,
    pub iterations: Vec<GoalSolveIteration>,
}

/// Calendar month a payoff lands in, or `None` when it is outside the horizon.
pub type PayoffDate = Option<NaiveDate>;
