//! CLI command handlers.
//!
//! Each handler builds a report string; [`run_cli`] prints it or reports the
//! error and exits with failure.

use std::path::Path;
use std::process::ExitCode;

use crate::config::PlannerConfig;
use crate::error::{ModelError, ModelResult};
use crate::models::{
    CapacityModel, FailureProbabilityModel, FailureQuery, QueueQuery, QueueingModel,
    ScalabilityLawModel, ScalabilityQuery, UslScenario, CONSENSUS_PROTOCOLS,
    SYSTEM_SCENARIOS,
};
use crate::sweep::{linspace, ScalingSweep, MAX_SWEEP_POINTS};

use super::output::{
    format_degradation_table, format_failure_report, format_load_table, format_queue_report,
    format_scenarios, format_usl_table, help_text, version_text, ScenarioRow, UslRow,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    let config = match load_config(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match execute(&args.command, &config) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Load the configuration file, or defaults when none is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> ModelResult<PlannerConfig> {
    path.map_or_else(|| Ok(PlannerConfig::default()), PlannerConfig::load)
}

/// Run a command against a configuration and return its report.
///
/// # Errors
///
/// Returns the first model or configuration error encountered.
pub fn execute(command: &Command, config: &PlannerConfig) -> ModelResult<String> {
    match *command {
        Command::Failure {
            total_nodes,
            num_failures,
            failure_prob,
        } => failure(FailureQuery::new(total_nodes, num_failures, failure_prob)),
        Command::Queue {
            arrival_rate,
            service_rate,
            max_queue_size,
        } => queue(QueueQuery {
            arrival_rate,
            service_rate,
            max_queue_size,
        }),
        Command::Table {
            service_rate,
            max_queue_size,
        } => table(config, service_rate, max_queue_size),
        Command::Degrade {
            service_rate,
            max_queue_size,
            points,
        } => degrade(config, service_rate, max_queue_size, points),
        Command::Usl {
            sigma,
            kappa,
            max_nodes,
        } => usl(config, sigma, kappa, max_nodes),
        Command::Scenarios => scenarios(config),
        Command::Defaults => config.to_yaml(),
        Command::Help => Ok(help_text().to_string()),
        Command::Version => Ok(version_text()),
    }
}

fn failure(query: FailureQuery) -> ModelResult<String> {
    let result = FailureProbabilityModel.analyze(query)?;
    Ok(format_failure_report(&query, &result))
}

fn queue(query: QueueQuery) -> ModelResult<String> {
    let result = QueueingModel.analyze(query)?;
    Ok(format_queue_report(&query, &result))
}

fn table(
    config: &PlannerConfig,
    service_rate: Option<f64>,
    max_queue_size: Option<u64>,
) -> ModelResult<String> {
    let mut sweep = config.load_table();
    if let Some(rate) = service_rate {
        sweep.service_rate = rate;
    }
    if max_queue_size.is_some() {
        sweep.max_queue_size = max_queue_size;
    }

    let points = sweep.queueing()?;
    let queue_ceiling = config
        .display
        .queue_ceiling
        .or_else(|| sweep.max_queue_size.map(|k| k as f64));
    Ok(format_load_table(
        sweep.service_rate,
        sweep.max_queue_size,
        queue_ceiling,
        &points,
    ))
}

fn degrade(
    config: &PlannerConfig,
    service_rate: Option<f64>,
    max_queue_size: Option<u64>,
    points: Option<usize>,
) -> ModelResult<String> {
    let mut sweep = config.load_range()?;
    if let Some(rate) = service_rate {
        sweep.service_rate = rate;
    }
    if max_queue_size.is_some() {
        sweep.max_queue_size = max_queue_size;
    }
    if let Some(points) = points {
        sweep.loads_percent = linspace(
            config.sweep.load_start_percent,
            config.sweep.load_end_percent,
            points,
        )?;
    }

    let comparison = sweep.comparison()?;
    Ok(format_degradation_table(
        &comparison,
        config.display.latency_ceiling_ms,
    ))
}

/// Integral node counts from 1 to `max_nodes`, one table row each.
fn node_sweep(max_nodes: f64) -> ModelResult<ScalingSweep> {
    if !(1.0..=MAX_SWEEP_POINTS as f64).contains(&max_nodes) {
        return Err(ModelError::invalid(
            "max_nodes",
            max_nodes,
            format!("must lie in [1, {MAX_SWEEP_POINTS}]"),
        ));
    }
    let top = max_nodes.floor();
    Ok(ScalingSweep::new(top, (top as usize).max(2)))
}

fn usl(
    config: &PlannerConfig,
    sigma: f64,
    kappa: f64,
    max_nodes: Option<f64>,
) -> ModelResult<String> {
    let sweep = node_sweep(max_nodes.unwrap_or(config.scalability.max_nodes))?;
    let optimal = ScalabilityLawModel::optimal_node_count(sigma, kappa)?;

    let base = &config.scalability;
    let rows = sweep
        .evaluate(sigma, kappa)?
        .into_iter()
        .map(|result| {
            let query = ScalabilityQuery::new(result.node_count, sigma, kappa);
            Ok(UslRow {
                result,
                throughput: ScalabilityLawModel::throughput(base.base_throughput, query)?,
                response_time_ms: ScalabilityLawModel::response_time(
                    base.base_response_time_ms,
                    query,
                )?,
            })
        })
        .collect::<ModelResult<Vec<_>>>()?;

    Ok(format_usl_table(sigma, kappa, optimal, &rows))
}

fn scenario_rows(scenarios: &[UslScenario], max_nodes: f64) -> ModelResult<Vec<ScenarioRow>> {
    scenarios
        .iter()
        .map(|&scenario| {
            Ok(ScenarioRow {
                scenario,
                optimal: ScalabilityLawModel::optimal_node_count(scenario.sigma, scenario.kappa)?,
                speedup_at_max: ScalabilityLawModel::speedup(
                    max_nodes,
                    scenario.sigma,
                    scenario.kappa,
                )?,
            })
        })
        .collect()
}

fn scenarios(config: &PlannerConfig) -> ModelResult<String> {
    let max_nodes = config.scalability.max_nodes;
    let mut report = format_scenarios(
        "System Scalability Profiles",
        max_nodes,
        &scenario_rows(&SYSTEM_SCENARIOS, max_nodes)?,
    );
    report.push('\n');
    report.push_str(&format_scenarios(
        "Consensus Protocol Overhead",
        max_nodes,
        &scenario_rows(&CONSENSUS_PROTOCOLS, max_nodes)?,
    ));

    Ok(report)
}
