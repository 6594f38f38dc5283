//! M/M/1 and M/M/1/K queue metrics.
//!
//! # Governing Equations
//!
//! ```text
//! ρ = λ/μ
//!
//! Unbounded buffer (M/M/1), ρ < 1:
//!   L_q = ρ²/(1-ρ)          (waiting, excludes the one in service)
//!   L   = ρ/(1-ρ)
//!   W   = L/λ                (Little's Law: L = λW)
//!
//! Finite capacity K (M/M/1/K), any ρ > 0:
//!   p_n = (1-ρ)ρⁿ / (1-ρ^(K+1)),   n = 0..K     (p_n = 1/(K+1) at ρ = 1)
//!   drop = p_K
//!   λ_eff = λ(1 - p_K)
//!   W = L/λ_eff
//! ```
//!
//! The finite-capacity closed form is used for every ρ, including ρ ≥ 1:
//! a bounded queue never diverges, it sheds load instead. Only the unbounded
//! queue with ρ ≥ 1 produces [`Bounded::Unbounded`] metrics.

use super::{require_capacity, require_positive, utilization, Bounded, CapacityModel};
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this value of `-ln(ρ)·(K+1)` the mean occupancy is taken from its
/// Taylor expansion around ρ = 1, where the closed form cancels badly.
const NEAR_CRITICAL: f64 = 1e-4;

/// Input for [`QueueingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueQuery {
    /// Arrival rate λ (requests/second).
    pub arrival_rate: f64,
    /// Service rate μ (requests/second).
    pub service_rate: f64,
    /// System capacity K; `None` = unbounded buffer.
    pub max_queue_size: Option<u64>,
}

impl QueueQuery {
    /// Query for an unbounded M/M/1 queue.
    #[must_use]
    pub const fn unbounded(arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            max_queue_size: None,
        }
    }

    /// Query for an M/M/1/K queue with capacity `max_queue_size`.
    #[must_use]
    pub const fn bounded(arrival_rate: f64, service_rate: f64, max_queue_size: u64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            max_queue_size: Some(max_queue_size),
        }
    }
}

/// Stability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    /// ρ < 1.
    Stable,
    /// ρ ≥ 1.
    Overloaded,
}

impl QueueStatus {
    /// Classify a utilization.
    #[must_use]
    pub fn from_utilization(rho: f64) -> Self {
        if rho < 1.0 {
            Self::Stable
        } else {
            Self::Overloaded
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Stable => "STABLE",
            Self::Overloaded => "OVERLOADED",
        })
    }
}

/// Output of [`QueueingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueResult {
    /// ρ = λ/μ as a fraction (callers scale to %).
    pub utilization: f64,
    /// Mean number waiting, excluding the one in service.
    pub avg_queue_length: Bounded,
    /// Mean number in system, L.
    pub avg_system_length: Bounded,
    /// Mean time in system, W (seconds).
    pub avg_wait_time: Bounded,
    /// Requests completed per second.
    pub effective_throughput: f64,
    /// Requests dropped per second.
    pub dropped_rate: f64,
    /// Fraction of arrivals dropped.
    pub drop_probability: f64,
    /// Stability classification.
    pub status: QueueStatus,
}

/// Summary of the M/M/1/K stationary distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Occupancy {
    /// p_0: system empty.
    p_empty: f64,
    /// p_K: buffer full, arrivals blocked.
    p_full: f64,
    /// Mean number in system.
    mean: f64,
}

impl Occupancy {
    /// Stationary distribution of a birth-death chain on `0..=k` with ratio `rho`.
    fn of(rho: f64, k: u64) -> Self {
        if rho > 1.0 {
            // State n under ρ is state K-n under 1/ρ.
            let mirrored = Self::at_most_critical(rho.recip(), k);
            return Self {
                p_empty: mirrored.p_full,
                p_full: mirrored.p_empty,
                mean: k as f64 - mirrored.mean,
            };
        }
        Self::at_most_critical(rho, k)
    }

    /// `rho <= 1`, written with x = -ln ρ ≥ 0 so that ρ^K never overflows.
    fn at_most_critical(rho: f64, k: u64) -> Self {
        let k_f = k as f64;
        let x = -rho.ln();

        if x < f64::MIN_POSITIVE {
            // ρ = 1: uniform over K+1 states.
            let p = (k_f + 1.0).recip();
            return Self {
                p_empty: p,
                p_full: p,
                mean: k_f / 2.0,
            };
        }

        let one_minus_rho = -(-x).exp_m1();
        let one_minus_rho_k1 = -(-(k_f + 1.0) * x).exp_m1();
        let rho_k = (-k_f * x).exp();

        let p_empty = one_minus_rho / one_minus_rho_k1;
        let p_full = p_empty * rho_k;

        let mean = if x * (k_f + 1.0) < NEAR_CRITICAL {
            // d/dx E[n] = -Var[n]; Var of uniform on 0..K is K(K+2)/12.
            k_f / 2.0 - x * k_f * (k_f + 2.0) / 12.0
        } else {
            rho / one_minus_rho - (k_f + 1.0) * rho_k * rho / one_minus_rho_k1
        };

        Self {
            p_empty,
            p_full,
            mean: mean.clamp(0.0, k_f),
        }
    }
}

/// Single-server queue with Poisson arrivals and exponential service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueingModel;

impl QueueingModel {
    /// Unbounded buffer.
    fn infinite_buffer(arrival_rate: f64, service_rate: f64, rho: f64) -> QueueResult {
        if rho >= 1.0 {
            tracing::debug!(
                arrival_rate,
                service_rate,
                utilization = rho,
                "unbounded queue is unstable"
            );
            return QueueResult {
                utilization: rho,
                avg_queue_length: Bounded::Unbounded,
                avg_system_length: Bounded::Unbounded,
                avg_wait_time: Bounded::Unbounded,
                effective_throughput: service_rate,
                dropped_rate: arrival_rate - service_rate,
                drop_probability: 1.0 - rho.recip(),
                status: QueueStatus::Overloaded,
            };
        }

        let idle = 1.0 - rho;
        let avg_system_length = rho / idle;
        QueueResult {
            utilization: rho,
            avg_queue_length: Bounded::from_f64(rho * rho / idle),
            avg_system_length: Bounded::from_f64(avg_system_length),
            avg_wait_time: Bounded::from_f64(avg_system_length / arrival_rate),
            effective_throughput: arrival_rate,
            dropped_rate: 0.0,
            drop_probability: 0.0,
            status: QueueStatus::Stable,
        }
    }

    /// Finite capacity `k`.
    fn finite_buffer(arrival_rate: f64, rho: f64, k: u64) -> QueueResult {
        let occupancy = Occupancy::of(rho, k);
        let drop_probability = occupancy.p_full;
        let effective_throughput = arrival_rate * (1.0 - drop_probability);
        // L_q = L - P(server busy)
        let waiting = (occupancy.mean - (1.0 - occupancy.p_empty)).max(0.0);

        QueueResult {
            utilization: rho,
            avg_queue_length: Bounded::Finite(waiting),
            avg_system_length: Bounded::Finite(occupancy.mean),
            avg_wait_time: Bounded::ratio(occupancy.mean, effective_throughput),
            effective_throughput,
            dropped_rate: arrival_rate * drop_probability,
            drop_probability,
            status: QueueStatus::from_utilization(rho),
        }
    }

    /// Blocking probability p_K of an M/M/1/K queue.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error for non-positive `rho` or `k = 0`.
    pub fn blocking_probability(rho: f64, k: u64) -> ModelResult<f64> {
        let rho = require_positive("utilization", rho)?;
        let k = require_capacity("max_queue_size", k)?;
        Ok(Occupancy::of(rho, k).p_full)
    }
}

impl CapacityModel for QueueingModel {
    type Query = QueueQuery;
    type Output = QueueResult;

    fn name(&self) -> &'static str {
        "M/M/1 Queue"
    }

    fn analyze(&self, query: QueueQuery) -> ModelResult<QueueResult> {
        let rho = utilization(query.arrival_rate, query.service_rate)?;

        let result = match query.max_queue_size {
            None => Self::infinite_buffer(query.arrival_rate, query.service_rate, rho),
            Some(k) => {
                let k = require_capacity("max_queue_size", k)?;
                Self::finite_buffer(query.arrival_rate, rho, k)
            }
        };

        tracing::trace!(
            utilization = result.utilization,
            throughput = result.effective_throughput,
            status = %result.status,
            "queue analysis"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(query: QueueQuery) -> QueueResult {
        QueueingModel.analyze(query).expect("valid query")
    }

    fn finite(value: Bounded) -> f64 {
        value.finite().expect("finite metric")
    }

    // =========================================================================
    // Unbounded buffer
    // =========================================================================

    #[test]
    fn test_stable_ninety_percent() {
        let result = analyze(QueueQuery::unbounded(90.0, 100.0));
        assert!((result.utilization - 0.9).abs() < 1e-12);
        assert!((finite(result.avg_queue_length) - 8.1).abs() < 1e-9);
        assert!((finite(result.avg_system_length) - 9.0).abs() < 1e-9);
        assert!((finite(result.avg_wait_time) - 0.1).abs() < 1e-9);
        assert!((result.effective_throughput - 90.0).abs() < 1e-12);
        assert!(result.dropped_rate.abs() < f64::EPSILON);
        assert_eq!(result.status, QueueStatus::Stable);
    }

    #[test]
    fn test_littles_law_holds() {
        for &lambda in &[10.0, 50.0, 75.0, 99.0] {
            let result = analyze(QueueQuery::unbounded(lambda, 100.0));
            let l = finite(result.avg_system_length);
            let w = finite(result.avg_wait_time);
            assert!((l - lambda * w).abs() < 1e-9, "λ={lambda}");
        }
    }

    #[test]
    fn test_overloaded_without_buffer() {
        let result = analyze(QueueQuery::unbounded(110.0, 100.0));
        assert_eq!(result.status, QueueStatus::Overloaded);
        assert!((result.dropped_rate - 10.0).abs() < 1e-9);
        assert!((result.effective_throughput - 100.0).abs() < 1e-12);
        assert!(result.avg_queue_length.is_unbounded());
        assert!(result.avg_wait_time.is_unbounded());
    }

    #[test]
    fn test_exactly_saturated_without_buffer() {
        let result = analyze(QueueQuery::unbounded(100.0, 100.0));
        assert_eq!(result.status, QueueStatus::Overloaded);
        assert!(result.avg_system_length.is_unbounded());
        assert!(result.dropped_rate.abs() < 1e-12);
    }

    // =========================================================================
    // Finite buffer (M/M/1/K)
    // =========================================================================

    #[test]
    fn test_small_buffer_exact_distribution() {
        // ρ = 0.5, K = 2: p = (4/7, 2/7, 1/7)
        let result = analyze(QueueQuery::bounded(50.0, 100.0, 2));
        assert!((result.drop_probability - 1.0 / 7.0).abs() < 1e-12);
        assert!((finite(result.avg_system_length) - 4.0 / 7.0).abs() < 1e-12);
        assert!((finite(result.avg_queue_length) - 1.0 / 7.0).abs() < 1e-12);
        assert!((result.effective_throughput - 50.0 * 6.0 / 7.0).abs() < 1e-9);
        assert!((finite(result.avg_wait_time) - 4.0 / 300.0).abs() < 1e-12);
        assert_eq!(result.status, QueueStatus::Stable);
    }

    #[test]
    fn test_critical_load_is_uniform() {
        for k in [1_u64, 10, 1_000] {
            let result = analyze(QueueQuery::bounded(100.0, 100.0, k));
            let expected = 1.0 / (k as f64 + 1.0);
            assert!(
                (result.drop_probability - expected).abs() < 1e-15,
                "K={k}: {}",
                result.drop_probability
            );
            assert!((finite(result.avg_system_length) - k as f64 / 2.0).abs() < 1e-9);
            assert_eq!(result.status, QueueStatus::Overloaded);
        }
    }

    #[test]
    fn test_near_critical_is_continuous() {
        let k = 1_000;
        let at = analyze(QueueQuery::bounded(100.0, 100.0, k));
        let below = analyze(QueueQuery::bounded(100.0 - 1e-9, 100.0, k));
        let above = analyze(QueueQuery::bounded(100.0 + 1e-9, 100.0, k));
        for side in [below, above] {
            assert!((side.drop_probability - at.drop_probability).abs() < 1e-9);
            let delta = finite(side.avg_system_length) - finite(at.avg_system_length);
            assert!(delta.abs() < 1e-3, "delta = {delta}");
        }
    }

    #[test]
    fn test_overloaded_with_buffer_sheds_load() {
        // Large K: throughput → μ and drop → 1 - 1/ρ
        let result = analyze(QueueQuery::bounded(110.0, 100.0, 1_000));
        assert_eq!(result.status, QueueStatus::Overloaded);
        assert!((result.effective_throughput - 100.0).abs() < 1e-6);
        assert!((result.dropped_rate - 10.0).abs() < 1e-6);
        // L → K - r/(1-r), r = 1/1.1
        assert!((finite(result.avg_system_length) - 990.0).abs() < 1e-6);
        assert!(!result.avg_wait_time.is_unbounded());
    }

    #[test]
    fn test_heavy_overload_single_slot() {
        // ρ = 2, K = 1: p = (1/3, 2/3)
        let result = analyze(QueueQuery::bounded(200.0, 100.0, 1));
        assert!((result.drop_probability - 2.0 / 3.0).abs() < 1e-12);
        assert!((finite(result.avg_system_length) - 2.0 / 3.0).abs() < 1e-12);
        assert!(finite(result.avg_queue_length).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_overload_does_not_overflow() {
        let result = analyze(QueueQuery::bounded(1e12, 1.0, 1_000_000));
        assert!(result.drop_probability.is_finite());
        assert!(result.drop_probability <= 1.0);
        assert!(finite(result.avg_system_length) <= 1_000_000.0);
    }

    #[test]
    fn test_drop_probability_shrinks_with_buffer() {
        let mut previous = 1.0;
        for k in [1_u64, 2, 5, 10, 50, 100, 1_000] {
            let p = QueueingModel::blocking_probability(0.8, k).expect("valid");
            assert!((0.0..1.0).contains(&p));
            assert!(p < previous, "K={k}");
            previous = p;
        }
        assert!(previous < 1e-90);
    }

    #[test]
    fn test_large_buffer_matches_mm1() {
        let bounded = analyze(QueueQuery::bounded(90.0, 100.0, 1_000));
        let unbounded = analyze(QueueQuery::unbounded(90.0, 100.0));
        assert!(bounded.drop_probability < 1e-40);
        assert!(
            (finite(bounded.avg_queue_length) - finite(unbounded.avg_queue_length)).abs() < 1e-9
        );
        assert!((finite(bounded.avg_wait_time) - finite(unbounded.avg_wait_time)).abs() < 1e-9);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_invalid_rates() {
        let model = QueueingModel;
        let err = model.analyze(QueueQuery::unbounded(0.0, 100.0)).unwrap_err();
        assert_eq!(err.parameter_name(), Some("arrival_rate"));
        let err = model.analyze(QueueQuery::unbounded(10.0, -1.0)).unwrap_err();
        assert_eq!(err.parameter_name(), Some("service_rate"));
        let err = model.analyze(QueueQuery::unbounded(f64::NAN, 1.0)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let err = QueueingModel
            .analyze(QueueQuery::bounded(10.0, 100.0, 0))
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("max_queue_size"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(QueueStatus::Stable.to_string(), "STABLE");
        assert_eq!(format!("{:<12}|", QueueStatus::Overloaded), "OVERLOADED  |");
        let json = serde_json::to_string(&QueueStatus::Overloaded).expect("serialize");
        assert_eq!(json, "\"OVERLOADED\"");
    }
}
