//! CLI output formatting.
//!
//! Every formatter returns a `String` so reports can be asserted on in
//! tests; only `run_cli` writes to stdout.

use std::fmt::Write as _;

use crate::models::{
    Bounded, FailureQuery, FailureResult, LoadComparison, LoadZone, OneInX, OptimalNodeCount,
    QueueQuery, QueueResult, ScalabilityResult, UslScenario,
};
use crate::sweep::LoadPoint;

const RULE_WIDE: usize = 95;
const RULE_NARROW: usize = 50;

/// Version line, including the git hash captured at build time.
#[must_use]
pub fn version_text() -> String {
    let hash = option_env!("GIT_HASH").map_or("unknown", |h| h.get(..12).unwrap_or(h));
    format!("capplan {} ({hash})\n", env!("CARGO_PKG_VERSION"))
}

/// Help message.
#[must_use]
pub fn help_text() -> &'static str {
    r"capplan - Closed-form capacity planning models

USAGE:
    capplan [--config <file.yaml>] <COMMAND> [OPTIONS]

COMMANDS:
    failure <nodes> <failures> <prob>
                                Odds of <failures> or more node failures

    queue <arrival> <service>   M/M/1 report for one load
        --queue-size <K>        Finite buffer capacity (default: unbounded)

    table                       Queue metrics over the fixed load table
        --service-rate <R>      Service rate (default: from config)
        --queue-size <K>        Buffer capacity (default: from config)

    degrade                     Ideal vs degraded throughput and latency
        --service-rate <R>      Service rate (default: from config)
        --queue-size <K>        Buffer capacity (default: from config)
        --points <N>            Load samples (default: from config)

    usl <sigma> <kappa>         Universal Scalability Law speedup table
        --max-nodes <N>         Largest node count (default: from config)

    scenarios                   Compare built-in scalability profiles
    defaults                    Print the effective configuration
    help                        Show this help message
    version                     Show version information

EXAMPLES:
    capplan failure 5 3 0.01
    capplan queue 90 100 --queue-size 1000
    capplan table --service-rate 250
    capplan usl 0.05 0.005 --max-nodes 64

LOGGING:
    Set RUST_LOG (e.g. RUST_LOG=capplan=debug) to trace model decisions on stderr.
"
}

/// Insert `,` every three digits of a non-negative integer string.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// "1 in 3,355" phrasing, or `never` when the probability vanished.
#[must_use]
pub fn format_odds(odds: OneInX) -> String {
    match odds {
        OneInX::Odds(x) => format!("1 in {}", group_thousands(&format!("{x:.0}"))),
        OneInX::Never => "never".to_string(),
    }
}

/// A probability as a percentage with `decimals` places.
#[must_use]
pub fn format_percent(probability: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", probability * 100.0)
}

/// A possibly unbounded value with `decimals` places, `inf` otherwise.
#[must_use]
pub fn format_bounded(value: Bounded, decimals: usize) -> String {
    match value {
        Bounded::Finite(v) => format!("{v:.decimals$}"),
        Bounded::Unbounded => "inf".to_string(),
    }
}

/// Failure analysis report.
#[must_use]
pub fn format_failure_report(query: &FailureQuery, result: &FailureResult) -> String {
    let k = query.num_failures;
    let mut out = String::new();
    let _ = writeln!(out, "Failure Analysis:");
    let _ = writeln!(out, "Total Nodes: {}", query.total_nodes);
    let _ = writeln!(out, "Number of Failures: {k}");
    let _ = writeln!(
        out,
        "Individual Node Failure Probability: {}",
        format_percent(query.failure_prob, 1)
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
    let _ = writeln!(
        out,
        "Probability of exactly {k} failures: {}",
        format_percent(result.exact_prob, 8)
    );
    let _ = writeln!(
        out,
        "Probability of {k} or more failures: {}",
        format_percent(result.cumulative_prob, 8)
    );
    let _ = match result.one_in_x {
        OneInX::Odds(_) => writeln!(
            out,
            "This is approximately a {} chance",
            format_odds(result.one_in_x)
        ),
        OneInX::Never => writeln!(out, "This outcome is too unlikely to represent (never)"),
    };
    out
}

/// Single-load queueing report.
#[must_use]
pub fn format_queue_report(query: &QueueQuery, result: &QueueResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "System Analysis:");
    let _ = writeln!(out, "Arrival Rate: {:.1} requests/second", query.arrival_rate);
    let _ = writeln!(out, "Service Rate: {:.1} requests/second", query.service_rate);
    if let Some(k) = query.max_queue_size {
        let _ = writeln!(out, "Max Queue Size: {k}");
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
    let _ = writeln!(
        out,
        "System Utilization: {}",
        format_percent(result.utilization, 1)
    );
    let _ = writeln!(
        out,
        "Average Queue Length: {}",
        format_bounded(result.avg_queue_length, 2)
    );
    let _ = writeln!(
        out,
        "Average Wait Time: {} ms",
        format_bounded(result.avg_wait_time.map(|s| s * 1000.0), 2)
    );
    let _ = writeln!(
        out,
        "Effective Throughput: {:.2} requests/second",
        result.effective_throughput
    );
    let _ = writeln!(
        out,
        "Dropped Requests: {:.2} requests/second",
        result.dropped_rate
    );
    if query.max_queue_size.is_some() {
        let _ = writeln!(
            out,
            "Drop Probability: {}",
            format_percent(result.drop_probability, 4)
        );
    }
    let _ = writeln!(out, "System Status: {}", result.status);
    out
}

/// Queue metrics per load level.
///
/// Unbounded queue lengths are shown as `queue_ceiling` when one is given.
#[must_use]
pub fn format_load_table(
    service_rate: f64,
    max_queue_size: Option<u64>,
    queue_ceiling: Option<f64>,
    points: &[LoadPoint<QueueResult>],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "System Performance Analysis");
    let _ = writeln!(out, "Service Rate: {service_rate} requests/second");
    let _ = match max_queue_size {
        Some(k) => writeln!(out, "Queue Size: {k}"),
        None => writeln!(out, "Queue Size: unbounded"),
    };
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));
    let _ = writeln!(
        out,
        "{:<10} {:<12} {:<12} {:<12} {:<12} {:<12} {:<10}",
        "Load %", "Throughput", "Latency(ms)", "Queue Len", "Dropped/s", "Utilization", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));

    for point in points {
        let r = &point.result;
        let latency = format_bounded(r.avg_wait_time.map(|s| s * 1000.0), 1);
        let queue = match queue_ceiling {
            Some(ceiling) => format!("{:.1}", r.avg_queue_length.clamp_to(ceiling)),
            None => format_bounded(r.avg_queue_length, 1),
        };
        let _ = writeln!(
            out,
            "{:<10.1} {:<12.1} {:<12} {:<12} {:<12.1} {:<12.1} {:<10}",
            point.load_percent,
            r.effective_throughput,
            latency,
            queue,
            r.dropped_rate,
            r.utilization * 100.0,
            r.status
        );
    }
    out
}

/// Ideal vs degraded behaviour per load level, latencies capped at
/// `latency_ceiling_ms`.
#[must_use]
pub fn format_degradation_table(
    points: &[LoadPoint<LoadComparison>],
    latency_ceiling_ms: f64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ideal vs Realistic Performance");
    let _ = writeln!(out, "Latency capped at {latency_ceiling_ms:.0} ms for display");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));
    let _ = writeln!(
        out,
        "{:<8} {:<11} {:<13} {:<11} {:<13} {:<10} {:<11} {:<8}",
        "Load %",
        "Ideal TPS",
        "Ideal Lat(ms)",
        "Real TPS",
        "Real Lat(ms)",
        "Queue",
        "Dropped/s",
        "Zone"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));

    for point in points {
        let c = &point.result;
        let zone = match c.realistic.zone {
            LoadZone::Normal => "normal",
            LoadZone::Degraded => "degraded",
        };
        let _ = writeln!(
            out,
            "{:<8.1} {:<11.1} {:<13.1} {:<11.1} {:<13.1} {:<10.1} {:<11.1} {:<8}",
            point.load_percent,
            c.ideal_throughput,
            c.ideal_latency
                .map(|s| s * 1000.0)
                .clamp_to(latency_ceiling_ms),
            c.realistic.throughput,
            c.realistic
                .latency
                .map(|s| s * 1000.0)
                .clamp_to(latency_ceiling_ms),
            c.realistic.queue_length,
            c.realistic.drop_rate,
            zone
        );
    }
    out
}

/// One row of a scalability table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UslRow {
    /// Speedup and efficiency at this node count.
    pub result: ScalabilityResult,
    /// Cluster throughput (requests/second).
    pub throughput: f64,
    /// Cluster response time (milliseconds).
    pub response_time_ms: f64,
}

/// Speedup table for one (σ, κ) profile.
#[must_use]
pub fn format_usl_table(
    sigma: f64,
    kappa: f64,
    optimal: OptimalNodeCount,
    rows: &[UslRow],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Universal Scalability Law (σ = {sigma}, κ = {kappa})");
    let _ = writeln!(out, "Optimal node count: {optimal}");
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW + 14));
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:<12} {:<16} {:<14}",
        "Nodes", "Speedup", "Efficiency", "Throughput/s", "Response(ms)"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW + 14));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8.0} {:<10.3} {:<12} {:<16.1} {:<14.2}",
            row.result.node_count,
            row.result.speedup,
            format_percent(row.result.efficiency, 1),
            row.throughput,
            row.response_time_ms
        );
    }
    out
}

/// One profile in a scenario comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioRow {
    /// The (σ, κ) profile.
    pub scenario: UslScenario,
    /// Where its speedup peaks.
    pub optimal: OptimalNodeCount,
    /// Speedup at the comparison node count.
    pub speedup_at_max: f64,
}

/// Side-by-side comparison of named profiles.
#[must_use]
pub fn format_scenarios(title: &str, max_nodes: f64, rows: &[ScenarioRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));
    let _ = writeln!(
        out,
        "{:<42} {:<7} {:<7} {:<24} S({max_nodes:.0})",
        "Profile", "σ", "κ", "Optimal"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDE));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<42} {:<7} {:<7} {:<24} {:.2}",
            row.scenario.name,
            row.scenario.sigma,
            row.scenario.kappa,
            row.optimal.to_string(),
            row.speedup_at_max
        );
    }
    out
}
