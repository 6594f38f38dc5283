//! CLI argument parsing.
//!
//! Hand-rolled so that parsing can be tested from any iterator of strings.
//! A malformed command line prints a diagnostic and falls back to help.

use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
    /// Optional YAML file overriding the planner defaults.
    pub config_path: Option<PathBuf>,
}

/// Available CLI commands.
///
/// Optional fields left as `None` fall back to the loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Binomial failure odds for a cluster
    Failure {
        /// Cluster size.
        total_nodes: u64,
        /// Failures to evaluate.
        num_failures: u64,
        /// Per-node failure probability.
        failure_prob: f64,
    },
    /// Queueing report for one arrival rate
    Queue {
        /// Arrival rate (requests/second).
        arrival_rate: f64,
        /// Service rate (requests/second).
        service_rate: f64,
        /// Buffer capacity; unbounded when absent.
        max_queue_size: Option<u64>,
    },
    /// Queueing metrics over the fixed load table
    Table {
        /// Service rate override.
        service_rate: Option<f64>,
        /// Buffer capacity override.
        max_queue_size: Option<u64>,
    },
    /// Ideal vs degraded behaviour over a load range
    Degrade {
        /// Service rate override.
        service_rate: Option<f64>,
        /// Buffer capacity override.
        max_queue_size: Option<u64>,
        /// Sample count override.
        points: Option<usize>,
    },
    /// Scalability law table for one profile
    Usl {
        /// Contention penalty.
        sigma: f64,
        /// Coherency penalty.
        kappa: f64,
        /// Largest node count override.
        max_nodes: Option<f64>,
    },
    /// Compare the built-in scalability profiles
    Scenarios,
    /// Print the effective configuration as YAML
    Defaults,
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(mut args: Vec<String>) -> Self {
        let config_path = take_flag(&mut args, "--config").map(PathBuf::from);

        if args.len() < 2 {
            return Self {
                command: Command::Help,
                config_path,
            };
        }

        let command = match args[1].as_str() {
            "failure" => Self::parse_failure_command(&args),
            "queue" => Self::parse_queue_command(&args),
            "table" => Command::Table {
                service_rate: flag_value(&args, "--service-rate"),
                max_queue_size: flag_value(&args, "--queue-size"),
            },
            "degrade" => Command::Degrade {
                service_rate: flag_value(&args, "--service-rate"),
                max_queue_size: flag_value(&args, "--queue-size"),
                points: flag_value(&args, "--points"),
            },
            "usl" => Self::parse_usl_command(&args),
            "scenarios" => Command::Scenarios,
            "defaults" => Command::Defaults,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self {
            command,
            config_path,
        }
    }

    /// Parse the 'failure' command arguments.
    fn parse_failure_command(args: &[String]) -> Command {
        let parsed = (
            positional::<u64>(args, 2),
            positional::<u64>(args, 3),
            positional::<f64>(args, 4),
        );
        match parsed {
            (Some(total_nodes), Some(num_failures), Some(failure_prob)) => Command::Failure {
                total_nodes,
                num_failures,
                failure_prob,
            },
            _ => {
                eprintln!("Error: 'failure' command requires <nodes> <failures> <probability>");
                Command::Help
            }
        }
    }

    /// Parse the 'queue' command arguments.
    fn parse_queue_command(args: &[String]) -> Command {
        match (positional::<f64>(args, 2), positional::<f64>(args, 3)) {
            (Some(arrival_rate), Some(service_rate)) => Command::Queue {
                arrival_rate,
                service_rate,
                max_queue_size: flag_value(args, "--queue-size"),
            },
            _ => {
                eprintln!("Error: 'queue' command requires <arrival-rate> <service-rate>");
                Command::Help
            }
        }
    }

    /// Parse the 'usl' command arguments.
    fn parse_usl_command(args: &[String]) -> Command {
        match (positional::<f64>(args, 2), positional::<f64>(args, 3)) {
            (Some(sigma), Some(kappa)) => Command::Usl {
                sigma,
                kappa,
                max_nodes: flag_value(args, "--max-nodes"),
            },
            _ => {
                eprintln!("Error: 'usl' command requires <sigma> <kappa>");
                Command::Help
            }
        }
    }
}

/// Remove `flag <value>` from anywhere in `args`, returning the value.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 < args.len() {
        let value = args.remove(pos + 1);
        args.remove(pos);
        Some(value)
    } else {
        eprintln!("Error: '{flag}' requires a value");
        args.remove(pos);
        None
    }
}

/// Parse the argument at `index`, unless it is missing or a flag.
fn positional<T: FromStr>(args: &[String], index: usize) -> Option<T> {
    args.get(index)
        .filter(|a| !a.starts_with("--"))
        .and_then(|a| a.parse().ok())
}

/// Parse the value following `flag`. An unparsable value is reported and ignored.
fn flag_value<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    let pos = args.iter().position(|a| a == flag)?;
    let raw = args.get(pos + 1)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            eprintln!("Warning: ignoring invalid value '{raw}' for {flag}");
            None
        }
    }
}
