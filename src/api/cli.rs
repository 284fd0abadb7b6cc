use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use super::{
    ApiError, DebtPayload, amortization_response, amount, compare_response, debts_from_payload,
    goal_response, payoff_response, run_http_server,
};
use crate::core::{Debt, Strategy, months_until};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    Avalanche,
    Snowball,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "paydown",
    about = "Debt payoff projections and amortization schedules (avalanche or snowball)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, env = "PAYDOWN_PORT", default_value_t = 8080)]
        port: u16,
    },

    /// Months to payoff and total interest
    Payoff {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, default_value_t = 0.0, help = "One-time payment applied before month 1")]
        lump_sum: f64,
    },

    /// Month-by-month schedule for one debt
    Schedule {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, help = "Id of the debt to report")]
        target: String,
    },

    /// Extra monthly payment needed to be debt free by a goal
    Goal {
        #[arg(long, help = "JSON array of debts")]
        debts: PathBuf,
        #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
        strategy: CliStrategy,
        #[arg(
            long,
            conflicts_with = "goal_date",
            required_unless_present = "goal_date",
            allow_negative_numbers = true
        )]
        months: Option<i64>,
        #[arg(long, help = "Goal date as YYYY-MM-DD")]
        goal_date: Option<NaiveDate>,
    },

    /// Avalanche and snowball side by side
    Compare {
        #[arg(long, help = "JSON array of debts")]
        debts: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        extra_payment: f64,
    },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[arg(long, help = "JSON array of debts")]
    debts: PathBuf,
    #[arg(long, default_value_t = 0.0)]
    extra_payment: f64,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
}

pub async fn run(cli: Cli) -> Result<(), ApiError> {
    if let Commands::Serve { port } = cli.command {
        return Ok(run_http_server(port).await?);
    }
    if let Some(output) = execute(&cli.command, Local::now().date_naive())? {
        println!("{output}");
    }
    Ok(())
}

/// Runs a one-shot subcommand and renders its result as pretty JSON. `serve`
/// has no one-shot output.
fn execute(command: &Commands, today: NaiveDate) -> Result<Option<String>, ApiError> {
    let rendered = match command {
        Commands::Serve { .. } => return Ok(None),
        Commands::Payoff { plan, lump_sum } => {
            let debts = load_debts(&plan.debts)?;
            let strategy: Strategy = plan.strategy.into();
            debug!(debts = debts.len(), ?strategy, "payoff");
            serde_json::to_string_pretty(&payoff_response(
                &debts,
                amount(Some(plan.extra_payment)),
                strategy,
                amount(Some(*lump_sum)),
                today,
            ))?
        }
        Commands::Schedule { plan, target } => {
            let debts = load_debts(&plan.debts)?;
            let strategy: Strategy = plan.strategy.into();
            debug!(debts = debts.len(), ?strategy, %target, "schedule");
            serde_json::to_string_pretty(&amortization_response(
                &debts,
                target,
                amount(Some(plan.extra_payment)),
                strategy,
            )?)?
        }
        Commands::Goal {
            debts,
            strategy,
            months,
            goal_date,
        } => {
            let debts = load_debts(debts)?;
            let months_to_target = match (months, goal_date) {
                (Some(months), _) => *months,
                (None, Some(goal_date)) => months_until(today, *goal_date),
                (None, None) => return Err(ApiError::MissingGoal),
            };
            serde_json::to_string_pretty(&goal_response(
                &debts,
                (*strategy).into(),
                months_to_target,
                today,
            ))?
        }
        Commands::Compare {
            debts,
            extra_payment,
        } => {
            let debts = load_debts(debts)?;
            serde_json::to_string_pretty(&compare_response(
                &debts,
                amount(Some(*extra_payment)),
                today,
            ))?
        }
    };
    Ok(Some(rendered))
}

fn load_debts(path: &Path) -> Result<Vec<Debt>, ApiError> {
    let raw = fs::read_to_string(path).map_err(|source| ApiError::DebtFile {
        path: path.display().to_string(),
        source,
    })?;
    let payloads: Vec<DebtPayload> =
        serde_json::from_str(&raw).map_err(|source| ApiError::DebtFileFormat {
            path: path.display().to_string(),
            source,
        })?;
    debts_from_payload(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::{Value, json};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn write_debt_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "paydown-{name}-{}.json",
            std::process::id()
        ));
        fs::write(&path, contents).expect("failed to write debt file");
        path
    }

    fn sample_debt_file(name: &str) -> PathBuf {
        write_debt_file(
            name,
            r#"[
                {"id": "a", "name": "Card", "balance": 500, "apr": 20, "minPayment": 25},
                {"id": "b", "name": "Loan", "balance": 1000, "apr": 10, "minPayment": 50}
            ]"#,
        )
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_payoff_flags() {
        let cli = Cli::try_parse_from([
            "paydown",
            "payoff",
            "--debts",
            "debts.json",
            "--extra-payment",
            "150",
            "--strategy",
            "snowball",
            "--lump-sum",
            "500",
        ])
        .expect("valid args");

        match cli.command {
            Commands::Payoff { plan, lump_sum } => {
                assert_eq!(plan.debts, PathBuf::from("debts.json"));
                assert_eq!(plan.extra_payment, 150.0);
                assert_eq!(plan.strategy, CliStrategy::Snowball);
                assert_eq!(lump_sum, 500.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn goal_needs_exactly_one_target() {
        assert!(Cli::try_parse_from(["paydown", "goal", "--debts", "d.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "paydown",
                "goal",
                "--debts",
                "d.json",
                "--months",
                "12",
                "--goal-date",
                "2030-01-01"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from([
            "paydown",
            "goal",
            "--debts",
            "d.json",
            "--goal-date",
            "2030-01-01",
        ])
        .expect("valid args");
        match cli.command {
            Commands::Goal { goal_date, .. } => assert_eq!(goal_date, Some(date(2030, 1, 1))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_has_no_one_shot_output() {
        let command = Commands::Serve { port: 8080 };
        assert!(execute(&command, date(2026, 10, 14)).expect("no-op").is_none());
    }

    #[test]
    fn execute_payoff_reads_debt_file() {
        let path = sample_debt_file("payoff");
        let command = Commands::Payoff {
            plan: PlanArgs {
                debts: path.clone(),
                extra_payment: 100.0,
                strategy: CliStrategy::Avalanche,
            },
            lump_sum: 0.0,
        };

        let output = execute(&command, date(2026, 10, 14))
            .expect("payoff runs")
            .expect("payoff output");
        let json: Value = serde_json::from_str(&output).expect("json output");
        assert!(json["months"].as_u64().expect("months") > 0);
        assert_eq!(json["strategy"], json!("avalanche"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn execute_schedule_rejects_unknown_target() {
        let path = sample_debt_file("schedule");
        let command = Commands::Schedule {
            plan: PlanArgs {
                debts: path.clone(),
                extra_payment: 0.0,
                strategy: CliStrategy::Avalanche,
            },
            target: "zzz".to_string(),
        };

        let err = execute(&command, date(2026, 10, 14)).expect_err("unknown target");
        assert!(matches!(err, ApiError::UnknownTarget(_)));
        fs::remove_file(path).ok();
    }

    #[test]
    fn execute_goal_uses_goal_date() {
        let path = write_debt_file(
            "goal",
            r#"[{"id": "a", "balance": 1200, "apr": 0, "minPayment": 100}]"#,
        );
        let command = Commands::Goal {
            debts: path.clone(),
            strategy: CliStrategy::Snowball,
            months: None,
            goal_date: Some(date(2027, 4, 20)),
        };

        let output = execute(&command, date(2026, 10, 14))
            .expect("goal runs")
            .expect("goal output");
        let json: Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(json["monthsToTarget"], json!(6));
        let extra = json["extraPayment"].as_f64().expect("extra");
        assert!((extra - 100.0).abs() < 1e-3, "got {extra}");
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_debt_file_is_reported() {
        let command = Commands::Compare {
            debts: PathBuf::from("/definitely/not/here.json"),
            extra_payment: 0.0,
        };
        let err = execute(&command, date(2026, 10, 14)).expect_err("missing file");
        assert!(matches!(err, ApiError::DebtFile { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn malformed_debt_file_is_reported() {
        let path = write_debt_file("malformed", r#"{"id": "a"}"#);
        let command = Commands::Compare {
            debts: path.clone(),
            extra_payment: 0.0,
        };
        let err = execute(&command, date(2026, 10, 14)).expect_err("not an array");
        assert!(matches!(err, ApiError::DebtFileFormat { .. }));
        fs::remove_file(path).ok();
    }
}
