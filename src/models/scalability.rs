//! Universal Scalability Law.
//!
//! # Governing Equation
//!
//! ```text
//! S(N) = N / (1 + σ(N-1) + κN(N-1))
//!
//! Where:
//!   N = node count (continuous, N ≥ 1)
//!   σ = contention: serialized work, grows linearly with N
//!   κ = coherency: pairwise crosstalk, grows quadratically with N
//!
//! Optimal node count:
//!   κ = 0, σ = 0  →  unbounded (linear scaling)
//!   κ = 0, σ > 0  →  1/√σ
//!   κ > 0         →  √((1-σ)/(2κ))
//! ```
//!
//! Every function here is O(1) and allocation-free so collaborators can
//! sample hundreds of curve points per frame.

use super::{require_non_negative, require_positive, CapacityModel};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input for [`ScalabilityLawModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalabilityQuery {
    /// Node count N ≥ 1 (need not be integral).
    pub node_count: f64,
    /// Contention penalty σ ≥ 0.
    pub sigma: f64,
    /// Coherency penalty κ ≥ 0.
    pub kappa: f64,
}

impl ScalabilityQuery {
    /// Create a query.
    #[must_use]
    pub const fn new(node_count: f64, sigma: f64, kappa: f64) -> Self {
        Self {
            node_count,
            sigma,
            kappa,
        }
    }
}

/// Output of [`ScalabilityLawModel::analyze`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalabilityResult {
    /// Node count evaluated.
    pub node_count: f64,
    /// Throughput relative to a single node.
    pub speedup: f64,
    /// Speedup per node, `S(N)/N`.
    pub efficiency: f64,
}

/// Node count that maximizes speedup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptimalNodeCount {
    /// Finite optimum N ≥ 1.
    At(f64),
    /// No contention and no coherency cost: speedup grows without limit.
    Unbounded,
    /// The analytic optimum is not a node count ≥ 1 (e.g. σ > 1).
    OutsideDomain,
}

impl OptimalNodeCount {
    /// The finite optimum, if any.
    #[must_use]
    pub const fn nodes(self) -> Option<f64> {
        match self {
            Self::At(n) => Some(n),
            Self::Unbounded | Self::OutsideDomain => None,
        }
    }
}

impl fmt::Display for OptimalNodeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(n) => write!(f, "{n:.1} nodes"),
            Self::Unbounded => f.write_str("unbounded"),
            Self::OutsideDomain => f.write_str("none (below one node)"),
        }
    }
}

/// A named (σ, κ) profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UslScenario {
    /// Display name.
    pub name: &'static str,
    /// Contention penalty.
    pub sigma: f64,
    /// Coherency penalty.
    pub kappa: f64,
}

impl UslScenario {
    /// Create a named profile.
    #[must_use]
    pub const fn new(name: &'static str, sigma: f64, kappa: f64) -> Self {
        Self { name, sigma, kappa }
    }
}

/// Reference system profiles, from ideal to poorly designed.
pub const SYSTEM_SCENARIOS: [UslScenario; 5] = [
    UslScenario::new("Ideal System (No Overhead)", 0.0, 0.0),
    UslScenario::new("Well-Designed System", 0.05, 0.005),
    UslScenario::new("Legacy System (High Coordination)", 0.3, 0.005),
    UslScenario::new("Complex Consensus (High Communication)", 0.05, 0.05),
    UslScenario::new("Poorly Designed System", 0.3, 0.05),
];

/// Typical overhead of consensus protocols.
pub const CONSENSUS_PROTOCOLS: [UslScenario; 5] = [
    UslScenario::new("Single Leader (Raft)", 0.05, 0.001),
    UslScenario::new("Multi-Paxos (Optimized)", 0.1, 0.005),
    UslScenario::new("Basic Paxos", 0.2, 0.02),
    UslScenario::new("Byzantine Fault Tolerance", 0.4, 0.08),
    UslScenario::new("Complex Multi-Round Protocol", 0.6, 0.15),
];

/// Universal Scalability Law model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalabilityLawModel;

impl ScalabilityLawModel {
    fn validate_penalties(sigma: f64, kappa: f64) -> ModelResult<()> {
        require_non_negative("sigma", sigma)?;
        require_non_negative("kappa", kappa)?;
        Ok(())
    }

    /// `S(N) = N / (1 + σ(N-1) + κN(N-1))`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error when `node_count < 1` or a penalty
    /// is negative (or any argument is not finite).
    pub fn speedup(node_count: f64, sigma: f64, kappa: f64) -> ModelResult<f64> {
        if !(node_count.is_finite() && node_count >= 1.0) {
            return Err(ModelError::invalid(
                "node_count",
                node_count,
                "must be a finite value of at least 1",
            ));
        }
        Self::validate_penalties(sigma, kappa)?;

        let n = node_count;
        Ok(n / (1.0 + sigma * (n - 1.0) + kappa * n * (n - 1.0)))
    }

    /// Node count at which speedup peaks.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error for negative or non-finite penalties.
    pub fn optimal_node_count(sigma: f64, kappa: f64) -> ModelResult<OptimalNodeCount> {
        Self::validate_penalties(sigma, kappa)?;

        if sigma > 1.0 {
            tracing::debug!(sigma, kappa, "contention above 1 has no optimum");
            return Ok(OptimalNodeCount::OutsideDomain);
        }

        let nodes = if kappa > 0.0 {
            ((1.0 - sigma) / (2.0 * kappa)).sqrt()
        } else if sigma > 0.0 {
            sigma.sqrt().recip()
        } else {
            return Ok(OptimalNodeCount::Unbounded);
        };

        if nodes.is_infinite() {
            tracing::debug!(sigma, kappa, "coherency penalty too small to bound the optimum");
            Ok(OptimalNodeCount::Unbounded)
        } else if nodes >= 1.0 {
            Ok(OptimalNodeCount::At(nodes))
        } else {
            tracing::debug!(sigma, kappa, nodes, "optimum below a single node");
            Ok(OptimalNodeCount::OutsideDomain)
        }
    }

    /// Cluster throughput given single-node throughput.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::speedup`], plus a non-positive base.
    pub fn throughput(base_throughput: f64, query: ScalabilityQuery) -> ModelResult<f64> {
        let base = require_positive("base_throughput", base_throughput)?;
        Ok(base * Self::speedup(query.node_count, query.sigma, query.kappa)?)
    }

    /// Response time given single-node response time.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::speedup`], plus a non-positive base.
    pub fn response_time(base_response_time: f64, query: ScalabilityQuery) -> ModelResult<f64> {
        let base = require_positive("base_response_time", base_response_time)?;
        Ok(base / Self::speedup(query.node_count, query.sigma, query.kappa)?)
    }
}

impl CapacityModel for ScalabilityLawModel {
    type Query = ScalabilityQuery;
    type Output = ScalabilityResult;

    fn name(&self) -> &'static str {
        "Universal Scalability Law"
    }

    fn analyze(&self, query: ScalabilityQuery) -> ModelResult<ScalabilityResult> {
        let speedup = Self::speedup(query.node_count, query.sigma, query.kappa)?;
        Ok(ScalabilityResult {
            node_count: query.node_count,
            speedup,
            efficiency: speedup / query.node_count,
        })
    }
}
