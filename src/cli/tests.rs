//! CLI module tests.

use super::args::{Args, Command};
use super::commands::{execute, load_config, run_cli};
use super::output::{format_bounded, format_odds, format_percent, help_text, version_text};
use crate::config::PlannerConfig;
use crate::models::{Bounded, OneInX};
use std::path::PathBuf;
use std::process::ExitCode;

fn run(command: Command) -> String {
    execute(&command, &PlannerConfig::default()).expect("command succeeds")
}

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["capplan"]);
    assert_eq!(args.command, Command::Help);
    assert_eq!(args.config_path, None);
}

#[test]
fn test_parse_help_and_version() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["capplan", flag]).command, Command::Help);
    }
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["capplan", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command() {
    let args = Args::parse_from(["capplan", "plot"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_failure_command() {
    let args = Args::parse_from(["capplan", "failure", "5", "3", "0.01"]);
    assert_eq!(
        args.command,
        Command::Failure {
            total_nodes: 5,
            num_failures: 3,
            failure_prob: 0.01,
        }
    );
}

#[test]
fn test_parse_failure_command_missing_args() {
    let args = Args::parse_from(["capplan", "failure", "5"]);
    assert_eq!(args.command, Command::Help);

    let args = Args::parse_from(["capplan", "failure", "five", "3", "0.01"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_queue_command() {
    let args = Args::parse_from(["capplan", "queue", "90", "100"]);
    assert_eq!(
        args.command,
        Command::Queue {
            arrival_rate: 90.0,
            service_rate: 100.0,
            max_queue_size: None,
        }
    );

    let args = Args::parse_from(["capplan", "queue", "90", "100", "--queue-size", "50"]);
    assert_eq!(
        args.command,
        Command::Queue {
            arrival_rate: 90.0,
            service_rate: 100.0,
            max_queue_size: Some(50),
        }
    );
}

#[test]
fn test_parse_queue_command_flag_in_positional_slot() {
    let args = Args::parse_from(["capplan", "queue", "90", "--queue-size", "50"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_table_command() {
    let args = Args::parse_from(["capplan", "table"]);
    assert_eq!(
        args.command,
        Command::Table {
            service_rate: None,
            max_queue_size: None,
        }
    );

    let args = Args::parse_from([
        "capplan",
        "table",
        "--service-rate",
        "250",
        "--queue-size",
        "10",
    ]);
    assert_eq!(
        args.command,
        Command::Table {
            service_rate: Some(250.0),
            max_queue_size: Some(10),
        }
    );
}

#[test]
fn test_parse_degrade_command() {
    let args = Args::parse_from(["capplan", "degrade", "--points", "20"]);
    assert_eq!(
        args.command,
        Command::Degrade {
            service_rate: None,
            max_queue_size: None,
            points: Some(20),
        }
    );
}

#[test]
fn test_parse_invalid_flag_value_ignored() {
    let args = Args::parse_from(["capplan", "degrade", "--points", "many"]);
    assert_eq!(
        args.command,
        Command::Degrade {
            service_rate: None,
            max_queue_size: None,
            points: None,
        }
    );
}

#[test]
fn test_parse_usl_command() {
    let args = Args::parse_from(["capplan", "usl", "0.05", "0.005", "--max-nodes", "64"]);
    assert_eq!(
        args.command,
        Command::Usl {
            sigma: 0.05,
            kappa: 0.005,
            max_nodes: Some(64.0),
        }
    );
}

#[test]
fn test_parse_usl_negative_value_is_positional() {
    // Rejected later by the model, not by the parser.
    let args = Args::parse_from(["capplan", "usl", "-0.1", "0"]);
    assert_eq!(
        args.command,
        Command::Usl {
            sigma: -0.1,
            kappa: 0.0,
            max_nodes: None,
        }
    );
}

#[test]
fn test_parse_config_flag_anywhere() {
    let args = Args::parse_from(["capplan", "--config", "plan.yaml", "scenarios"]);
    assert_eq!(args.command, Command::Scenarios);
    assert_eq!(args.config_path, Some(PathBuf::from("plan.yaml")));

    let args = Args::parse_from(["capplan", "defaults", "--config", "plan.yaml"]);
    assert_eq!(args.command, Command::Defaults);
    assert_eq!(args.config_path, Some(PathBuf::from("plan.yaml")));
}

#[test]
fn test_parse_config_flag_without_value() {
    let args = Args::parse_from(["capplan", "scenarios", "--config"]);
    assert_eq!(args.command, Command::Scenarios);
    assert_eq!(args.config_path, None);
}

// ============================================================================
// Formatting tests
// ============================================================================

#[test]
fn test_format_odds_thousands_separators() {
    assert_eq!(format_odds(OneInX::Odds(1.0)), "1 in 1");
    assert_eq!(format_odds(OneInX::Odds(999.0)), "1 in 999");
    assert_eq!(format_odds(OneInX::Odds(3_355.0)), "1 in 3,355");
    assert_eq!(format_odds(OneInX::Odds(1_234_567.0)), "1 in 1,234,567");
    assert_eq!(format_odds(OneInX::Never), "never");
}

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(0.000_297, 8), "0.02970000%");
    assert_eq!(format_percent(0.9, 1), "90.0%");
}

#[test]
fn test_format_bounded() {
    assert_eq!(format_bounded(Bounded::Finite(8.1), 2), "8.10");
    assert_eq!(format_bounded(Bounded::Unbounded, 2), "inf");
}

#[test]
fn test_help_and_version_text() {
    assert!(help_text().contains("USAGE:"));
    assert!(help_text().contains("--queue-size"));
    assert!(version_text().starts_with("capplan "));
}

// ============================================================================
// Command execution tests
// ============================================================================

#[test]
fn test_failure_report() {
    let report = run(Command::Failure {
        total_nodes: 3,
        num_failures: 2,
        failure_prob: 0.01,
    });
    assert!(report.contains("Total Nodes: 3"));
    assert!(report.contains("Individual Node Failure Probability: 1.0%"));
    assert!(report.contains("Probability of exactly 2 failures: 0.02970000%"));
    assert!(report.contains("Probability of 2 or more failures: 0.02980000%"));
    assert!(report.contains("1 in 3,355"));
}

#[test]
fn test_failure_report_never() {
    let report = run(Command::Failure {
        total_nodes: 10,
        num_failures: 1,
        failure_prob: 0.0,
    });
    assert!(report.contains("never"));
}

#[test]
fn test_failure_invalid_probability_is_error() {
    let err = execute(
        &Command::Failure {
            total_nodes: 3,
            num_failures: 1,
            failure_prob: 1.5,
        },
        &PlannerConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_invalid_parameter());
    assert_eq!(err.parameter_name(), Some("failure_prob"));
}

#[test]
fn test_queue_report_stable() {
    let report = run(Command::Queue {
        arrival_rate: 90.0,
        service_rate: 100.0,
        max_queue_size: None,
    });
    assert!(report.contains("System Utilization: 90.0%"));
    assert!(report.contains("Average Queue Length: 8.10"));
    assert!(report.contains("Average Wait Time: 100.00 ms"));
    assert!(report.contains("System Status: STABLE"));
    assert!(!report.contains("Drop Probability"));
}

#[test]
fn test_queue_report_overloaded() {
    let report = run(Command::Queue {
        arrival_rate: 110.0,
        service_rate: 100.0,
        max_queue_size: None,
    });
    assert!(report.contains("Average Queue Length: inf"));
    assert!(report.contains("Effective Throughput: 100.00"));
    assert!(report.contains("Dropped Requests: 10.00"));
    assert!(report.contains("System Status: OVERLOADED"));
}

#[test]
fn test_queue_report_with_buffer() {
    let report = run(Command::Queue {
        arrival_rate: 110.0,
        service_rate: 100.0,
        max_queue_size: Some(1000),
    });
    assert!(report.contains("Max Queue Size: 1000"));
    assert!(report.contains("Drop Probability"));
    assert!(!report.contains("inf"));
}

#[test]
fn test_table_uses_config_levels() {
    let report = run(Command::Table {
        service_rate: None,
        max_queue_size: None,
    });
    let config = PlannerConfig::default();
    // title, service rate, queue size, two rules, header
    assert_eq!(report.lines().count(), 6 + config.sweep.load_levels.len());
    assert!(report.contains("Queue Size: 1000"));
    assert!(report.contains("OVERLOADED"));
}

#[test]
fn test_table_overrides() {
    let report = run(Command::Table {
        service_rate: Some(250.0),
        max_queue_size: Some(10),
    });
    assert!(report.contains("Service Rate: 250 requests/second"));
    assert!(report.contains("Queue Size: 10"));
}

#[test]
fn test_degrade_clamps_latency() {
    let report = run(Command::Degrade {
        service_rate: None,
        max_queue_size: None,
        points: Some(5),
    });
    // 200% load: 1000 queued at μ_eff = 50/s is 20 s, above the 10 s ceiling
    assert!(report.contains("10000.0"));
    assert!(report.contains("degraded"));
    assert!(report.contains("normal"));
    assert!(!report.contains("inf"));
}

#[test]
fn test_degrade_without_buffer_is_error() {
    let config = PlannerConfig::builder().max_queue_size(None).build();
    let err = execute(
        &Command::Degrade {
            service_rate: None,
            max_queue_size: None,
            points: None,
        },
        &config,
    )
    .unwrap_err();
    assert_eq!(err.parameter_name(), Some("max_queue_size"));
}

#[test]
fn test_usl_report() {
    let report = run(Command::Usl {
        sigma: 0.1,
        kappa: 0.0,
        max_nodes: Some(8.0),
    });
    assert!(report.contains("Optimal node count: 3.2 nodes"));
    // title, optimum, two rules, header, 8 rows
    assert_eq!(report.lines().count(), 5 + 8);
}

#[test]
fn test_usl_single_node_prints_one_row() {
    let report = run(Command::Usl {
        sigma: 0.1,
        kappa: 0.0,
        max_nodes: Some(1.0),
    });
    assert_eq!(report.lines().count(), 5 + 1);
}

#[test]
fn test_usl_huge_max_nodes_is_error() {
    let args = Args::parse_from(["capplan", "usl", "0.1", "0", "--max-nodes", "1e19"]);
    let err = execute(&args.command, &PlannerConfig::default()).unwrap_err();
    assert_eq!(err.parameter_name(), Some("max_nodes"));

    let exit = run_cli(Args::parse_from(["capplan", "usl", "0.1", "0", "--max-nodes", "1e19"]));
    assert_ne!(exit, ExitCode::SUCCESS);
}

#[test]
fn test_degrade_huge_points_is_error() {
    let args = Args::parse_from(["capplan", "degrade", "--points", "18446744073709551615"]);
    let err = execute(&args.command, &PlannerConfig::default()).unwrap_err();
    assert_eq!(err.parameter_name(), Some("points"));
}

#[test]
fn test_degrade_defaults_follow_config_range() {
    let config = PlannerConfig::default();
    let report = run(Command::Degrade {
        service_rate: None,
        max_queue_size: None,
        points: None,
    });
    // title, ceiling note, two rules, header
    assert_eq!(report.lines().count(), 5 + config.sweep.points);

    let expected = config.load_range().expect("valid").loads_percent.len();
    assert_eq!(report.lines().count(), 5 + expected);
}

#[test]
fn test_usl_outside_domain() {
    let report = run(Command::Usl {
        sigma: 2.0,
        kappa: 0.1,
        max_nodes: Some(4.0),
    });
    assert!(report.contains("none (below one node)"));
}

#[test]
fn test_usl_invalid_parameters() {
    let config = PlannerConfig::default();
    let err = execute(
        &Command::Usl {
            sigma: -0.1,
            kappa: 0.0,
            max_nodes: None,
        },
        &config,
    )
    .unwrap_err();
    assert_eq!(err.parameter_name(), Some("sigma"));

    let err = execute(
        &Command::Usl {
            sigma: 0.1,
            kappa: 0.0,
            max_nodes: Some(0.0),
        },
        &config,
    )
    .unwrap_err();
    assert_eq!(err.parameter_name(), Some("max_nodes"));
}

#[test]
fn test_scenarios_report() {
    let report = run(Command::Scenarios);
    assert!(report.contains("System Scalability Profiles"));
    assert!(report.contains("Consensus Protocol Overhead"));
    assert!(report.contains("Basic Paxos"));
    assert!(report.contains("unbounded"));
}

#[test]
fn test_defaults_report_is_loadable_yaml() {
    let yaml = run(Command::Defaults);
    let parsed = PlannerConfig::from_yaml(&yaml).expect("round trip");
    assert_eq!(parsed, PlannerConfig::default());
}

#[test]
fn test_help_and_version_commands() {
    assert!(run(Command::Help).contains("COMMANDS:"));
    assert!(run(Command::Version).starts_with("capplan"));
}

// ============================================================================
// Entry point tests
// ============================================================================

#[test]
fn test_load_config_defaults_without_path() {
    let config = load_config(None).expect("defaults");
    assert_eq!(config, PlannerConfig::default());
}

#[test]
fn test_run_cli_success() {
    let exit = run_cli(Args::parse_from(["capplan", "failure", "10", "0", "0.1"]));
    assert_eq!(exit, ExitCode::SUCCESS);
}

#[test]
fn test_run_cli_invalid_parameter_fails() {
    let exit = run_cli(Args::parse_from(["capplan", "queue", "-5", "100"]));
    assert_ne!(exit, ExitCode::SUCCESS);
}

#[test]
fn test_run_cli_missing_config_fails() {
    let exit = run_cli(Args::parse_from([
        "capplan",
        "--config",
        "/nonexistent/capplan.yaml",
        "table",
    ]));
    assert_ne!(exit, ExitCode::SUCCESS);
}
