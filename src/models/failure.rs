//! Node-failure probability under a binomial model.
//!
//! # Governing Equation
//!
//! ```text
//! Each of n nodes fails independently with probability p.
//!
//! exact      = P(X = k)
//! cumulative = P(X ≥ k) = 1 - P(X ≤ k-1)      (= 1 when k = 0)
//! one_in_x   = floor(1 / cumulative)
//! ```

use super::binomial::Binomial;
use super::{require_probability, CapacityModel};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input for [`FailureProbabilityModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureQuery {
    /// Cluster size.
    pub total_nodes: u64,
    /// Number of failures to evaluate.
    pub num_failures: u64,
    /// Independent per-node failure probability.
    pub failure_prob: f64,
}

impl FailureQuery {
    /// Create a query.
    #[must_use]
    pub const fn new(total_nodes: u64, num_failures: u64, failure_prob: f64) -> Self {
        Self {
            total_nodes,
            num_failures,
            failure_prob,
        }
    }
}

/// "1 in X" odds of seeing at least `num_failures` failures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OneInX {
    /// `floor(1 / cumulative_prob)`, an integral value ≥ 1.
    Odds(f64),
    /// The cumulative probability is zero in floating point.
    Never,
}

impl OneInX {
    /// Odds for a cumulative probability.
    #[must_use]
    pub fn from_probability(cumulative_prob: f64) -> Self {
        if cumulative_prob > 0.0 {
            let odds = (1.0 / cumulative_prob).floor();
            if odds.is_finite() {
                return Self::Odds(odds);
            }
        }
        Self::Never
    }

    /// The finite odds, if any.
    #[must_use]
    pub const fn odds(self) -> Option<f64> {
        match self {
            Self::Odds(x) => Some(x),
            Self::Never => None,
        }
    }
}

impl fmt::Display for OneInX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odds(x) => write!(f, "1 in {x:.0}"),
            Self::Never => f.write_str("never"),
        }
    }
}

/// Output of [`FailureProbabilityModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureResult {
    /// P(exactly `num_failures` failures).
    pub exact_prob: f64,
    /// P(`num_failures` or more failures). Always ≥ `exact_prob`.
    pub cumulative_prob: f64,
    /// Odds phrasing of `cumulative_prob`.
    pub one_in_x: OneInX,
}

/// Binomial failure statistics for a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureProbabilityModel;

impl FailureProbabilityModel {
    fn validate(query: &FailureQuery) -> ModelResult<()> {
        if query.total_nodes == 0 {
            return Err(ModelError::invalid(
                "total_nodes",
                query.total_nodes,
                "must be at least 1",
            ));
        }
        if query.num_failures > query.total_nodes {
            return Err(ModelError::invalid(
                "num_failures",
                query.num_failures,
                format!("must not exceed total_nodes ({})", query.total_nodes),
            ));
        }
        require_probability("failure_prob", query.failure_prob)?;
        Ok(())
    }
}

impl CapacityModel for FailureProbabilityModel {
    type Query = FailureQuery;
    type Output = FailureResult;

    fn name(&self) -> &'static str {
        "Node Failure Probability"
    }

    fn analyze(&self, query: FailureQuery) -> ModelResult<FailureResult> {
        Self::validate(&query)?;
        let dist = Binomial::new(query.total_nodes, query.failure_prob)?;

        let exact_prob = dist.pmf(query.num_failures);
        // P(X ≥ k) ⊇ P(X = k); max() only absorbs rounding between the two sums.
        let cumulative_prob = dist.at_least(query.num_failures).max(exact_prob);
        let one_in_x = OneInX::from_probability(cumulative_prob);

        if one_in_x == OneInX::Never {
            tracing::debug!(
                total_nodes = query.total_nodes,
                num_failures = query.num_failures,
                failure_prob = query.failure_prob,
                "cumulative failure probability is zero in f64"
            );
        }
        tracing::trace!(exact_prob, cumulative_prob, "failure analysis");

        Ok(FailureResult {
            exact_prob,
            cumulative_prob,
            one_in_x,
        })
    }
}
