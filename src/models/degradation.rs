//! Post-saturation degradation model.
//!
//! # Governing Equations
//!
//! ```text
//! ρ = λ/μ
//!
//! Normal zone (ρ < 1):
//!   queue      = ρ²/(1-ρ)
//!   throughput = λ
//!   latency    = queue/λ
//!
//! Degraded zone (ρ ≥ 1):
//!   factor     = 1 + (ρ-1)²          (quadratic penalty)
//!   μ_eff      = μ/factor
//!   throughput = min(λ, μ_eff)
//!   queue      = K                   (buffer saturated)
//!   latency    = K/μ_eff
//!   drops      = λ - throughput
//! ```
//!
//! Real systems slow down rather than stopping at saturation. At ρ = 1 the
//! factor is 1, so throughput approaches μ from both sides without a jump.

use super::{require_capacity, utilization, Bounded, CapacityModel};
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};

/// Input for [`DegradationModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationQuery {
    /// Arrival rate λ (requests/second).
    pub arrival_rate: f64,
    /// Nominal service rate μ (requests/second).
    pub service_rate: f64,
    /// Buffer capacity K.
    pub max_queue_size: u64,
}

impl DegradationQuery {
    /// Create a query.
    #[must_use]
    pub const fn new(arrival_rate: f64, service_rate: f64, max_queue_size: u64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            max_queue_size,
        }
    }
}

/// Which branch of the model produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadZone {
    /// ρ < 1.
    Normal,
    /// ρ ≥ 1.
    Degraded,
}

/// Output of [`DegradationModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationResult {
    /// Completed requests per second.
    pub throughput: f64,
    /// Queueing latency (seconds).
    pub latency: Bounded,
    /// Mean queue length, never above K.
    pub queue_length: f64,
    /// Dropped requests per second.
    pub drop_rate: f64,
    /// ρ × 100, capped at 100.
    pub utilization_percent: f64,
    /// `1 + (ρ-1)²` in the degraded zone, 1 otherwise.
    pub degradation_factor: f64,
    /// Branch of the model.
    pub zone: LoadZone,
}

/// Ideal M/M/1 prediction side by side with the degraded one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadComparison {
    /// ρ × 100 (uncapped).
    pub load_percent: f64,
    /// λ below saturation, μ at or above.
    pub ideal_throughput: f64,
    /// M/M/1 time in system `1/(μ-λ)`; unbounded at or above saturation.
    pub ideal_latency: Bounded,
    /// The degradation model for the same load.
    pub realistic: DegradationResult,
}

/// Throughput and latency with graceful degradation beyond saturation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegradationModel;

impl DegradationModel {
    /// Compare the ideal queueing prediction with the degraded one.
    ///
    /// # Errors
    ///
    /// Same conditions as [`CapacityModel::analyze`].
    pub fn compare(&self, query: DegradationQuery) -> ModelResult<LoadComparison> {
        let realistic = self.analyze(query)?;
        let rho = query.arrival_rate / query.service_rate;

        let (ideal_throughput, ideal_latency) = if rho < 1.0 {
            (
                query.arrival_rate,
                Bounded::ratio(1.0, query.service_rate - query.arrival_rate),
            )
        } else {
            (query.service_rate, Bounded::Unbounded)
        };

        Ok(LoadComparison {
            load_percent: rho * 100.0,
            ideal_throughput,
            ideal_latency,
            realistic,
        })
    }
}

impl CapacityModel for DegradationModel {
    type Query = DegradationQuery;
    type Output = DegradationResult;

    fn name(&self) -> &'static str {
        "Realistic Degradation"
    }

    fn analyze(&self, query: DegradationQuery) -> ModelResult<DegradationResult> {
        let rho = utilization(query.arrival_rate, query.service_rate)?;
        let capacity = require_capacity("max_queue_size", query.max_queue_size)? as f64;
        let utilization_percent = (rho * 100.0).min(100.0);

        if rho < 1.0 {
            let queue = rho * rho / (1.0 - rho);
            return Ok(DegradationResult {
                throughput: query.arrival_rate,
                latency: Bounded::ratio(queue, query.arrival_rate),
                queue_length: queue.min(capacity),
                drop_rate: 0.0,
                utilization_percent,
                degradation_factor: 1.0,
                zone: LoadZone::Normal,
            });
        }

        let overload = rho - 1.0;
        let degradation_factor = 1.0 + overload * overload;
        let effective_service_rate = query.service_rate / degradation_factor;
        let throughput = query.arrival_rate.min(effective_service_rate);
        let latency = Bounded::ratio(capacity, effective_service_rate);

        if latency.is_unbounded() {
            tracing::debug!(
                utilization = rho,
                degradation_factor,
                "effective service rate collapsed to zero"
            );
        }
        tracing::trace!(utilization = rho, throughput, "degraded zone");

        Ok(DegradationResult {
            throughput,
            latency,
            queue_length: capacity,
            drop_rate: query.arrival_rate - throughput,
            utilization_percent,
            degradation_factor,
            zone: LoadZone::Degraded,
        })
    }
}
