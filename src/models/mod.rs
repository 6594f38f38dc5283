//! Closed-form capacity planning models.
//!
//! Four independent, stateless models, each taking explicit parameters and
//! returning a plain result record:
//!
//! 1. [`failure`] - Binomial node-failure statistics
//! 2. [`queueing`] - M/M/1 and M/M/1/K utilization, queue length, wait, loss
//! 3. [`degradation`] - Throughput and latency collapse beyond saturation
//! 4. [`scalability`] - Universal Scalability Law speedup and optimum
//!
//! # Unbounded results
//!
//! A queue with no buffer and ρ ≥ 1 has no finite mean length. Such outcomes
//! are carried by [`Bounded::Unbounded`] rather than a non-finite float, so
//! arithmetic on a result cannot silently propagate `inf` into a caller.
//!
//! # Concurrency
//!
//! Models are unit structs holding no state. Every call is a pure function of
//! its query and can run on any thread without synchronization.

pub mod binomial;
pub mod degradation;
pub mod failure;
pub mod queueing;
pub mod scalability;

pub use binomial::Binomial;
pub use degradation::{
    DegradationModel, DegradationQuery, DegradationResult, LoadComparison, LoadZone,
};
pub use failure::{FailureProbabilityModel, FailureQuery, FailureResult, OneInX};
pub use queueing::{QueueQuery, QueueResult, QueueStatus, QueueingModel};
pub use scalability::{
    OptimalNodeCount, ScalabilityLawModel, ScalabilityQuery, ScalabilityResult, UslScenario,
    CONSENSUS_PROTOCOLS, SYSTEM_SCENARIOS,
};

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common trait for all capacity models.
pub trait CapacityModel {
    /// Validated input record.
    type Query;
    /// Result record.
    type Output;

    /// Model name for display.
    fn name(&self) -> &'static str;

    /// Evaluate the model for one query.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] when a query field is outside
    /// the model's domain.
    fn analyze(&self, query: Self::Query) -> ModelResult<Self::Output>;
}

/// A quantity that is either a finite value or mathematically unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Bounded {
    /// Finite, non-negative value.
    Finite(f64),
    /// Grows without bound (e.g. an unstable queue with no buffer).
    Unbounded,
}

impl Bounded {
    /// Wrap a float, mapping non-finite values to [`Bounded::Unbounded`].
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self::Finite(value)
        } else {
            Self::Unbounded
        }
    }

    /// `numerator / denominator`, unbounded when the denominator is not positive.
    #[must_use]
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Self::from_f64(numerator / denominator)
        } else {
            Self::Unbounded
        }
    }

    /// The finite value, if any.
    #[must_use]
    pub const fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded => None,
        }
    }

    /// Whether the quantity is unbounded.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Clamp to a display ceiling: finite values are capped, unbounded ones
    /// become the ceiling itself.
    #[must_use]
    pub fn clamp_to(self, ceiling: f64) -> f64 {
        match self {
            Self::Finite(v) => v.min(ceiling),
            Self::Unbounded => ceiling,
        }
    }

    /// Apply `f` to a finite value; unbounded stays unbounded.
    #[must_use]
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Finite(v) => Self::from_f64(f(v)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

impl fmt::Display for Bounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => fmt::Display::fmt(v, f),
            Self::Unbounded => f.pad("inf"),
        }
    }
}

// =============================================================================
// Parameter guards
// =============================================================================

/// Reject NaN, infinities and values ≤ 0.
pub(crate) fn require_positive(name: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        tracing::debug!(parameter = name, value, "rejected non-positive parameter");
        Err(ModelError::invalid(name, value, "must be a finite value greater than 0"))
    }
}

/// Reject NaN, infinities and negative values.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        tracing::debug!(parameter = name, value, "rejected negative parameter");
        Err(ModelError::invalid(name, value, "must be a finite value of at least 0"))
    }
}

/// Reject anything outside `[0, 1]`, including NaN.
pub(crate) fn require_probability(name: &'static str, value: f64) -> ModelResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        tracing::debug!(parameter = name, value, "rejected probability outside [0, 1]");
        Err(ModelError::invalid(name, value, "must lie in [0, 1]"))
    }
}

/// Reject a zero buffer size.
pub(crate) fn require_capacity(name: &'static str, value: u64) -> ModelResult<u64> {
    if value > 0 {
        Ok(value)
    } else {
        tracing::debug!(parameter = name, value, "rejected zero capacity");
        Err(ModelError::invalid(name, value, "must be at least 1"))
    }
}

/// Utilization ρ = λ/μ, rejected when the quotient over- or underflows.
pub(crate) fn utilization(arrival_rate: f64, service_rate: f64) -> ModelResult<f64> {
    let rho = require_positive("arrival_rate", arrival_rate)?
        / require_positive("service_rate", service_rate)?;
    if rho.is_finite() && rho > 0.0 {
        Ok(rho)
    } else {
        Err(ModelError::invalid(
            "utilization",
            rho,
            "arrival_rate / service_rate must be finite and greater than 0",
        ))
    }
}
