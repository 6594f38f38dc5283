//! Parameter sweeps over the capacity models.
//!
//! Charts and tables evaluate a model at many points: load from 10% to 200%
//! of capacity, or node count from 1 to N. Every point is an independent
//! query, so the order of evaluation carries no meaning and a sweep can be
//! split across threads freely.

use crate::error::{ModelError, ModelResult};
use crate::models::{
    CapacityModel, DegradationModel, DegradationQuery, DegradationResult, LoadComparison,
    QueueQuery, QueueResult, QueueingModel, ScalabilityLawModel, ScalabilityQuery,
    ScalabilityResult,
};
use serde::{Deserialize, Serialize};

/// Largest number of samples a single sweep may request.
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// `points` evenly spaced values from `start` to `end` inclusive.
///
/// # Errors
///
/// Returns an invalid-parameter error when `points` is outside
/// `2..=MAX_SWEEP_POINTS`, a bound is not finite, or `start > end`.
pub fn linspace(start: f64, end: f64, points: usize) -> ModelResult<Vec<f64>> {
    if !(2..=MAX_SWEEP_POINTS).contains(&points) {
        return Err(ModelError::invalid(
            "points",
            points,
            format!("must be between 2 and {MAX_SWEEP_POINTS}"),
        ));
    }
    if !start.is_finite() {
        return Err(ModelError::invalid("start", start, "must be finite"));
    }
    if !(end.is_finite() && end >= start) {
        return Err(ModelError::invalid(
            "end",
            end,
            format!("must be finite and not below start ({start})"),
        ));
    }

    let step = (end - start) / (points - 1) as f64;
    let mut values: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    // Pin the last sample so accumulated rounding never overshoots `end`.
    if let Some(last) = values.last_mut() {
        *last = end;
    }
    Ok(values)
}

/// One evaluated load level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadPoint<T> {
    /// Offered load as a percentage of the service rate.
    pub load_percent: f64,
    /// Arrival rate derived from the load, `load/100 × μ`.
    pub arrival_rate: f64,
    /// Model output at this load.
    pub result: T,
}

/// A set of load levels against one server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSweep {
    /// Service rate μ shared by every point.
    pub service_rate: f64,
    /// Buffer capacity; `None` means an unbounded queue.
    pub max_queue_size: Option<u64>,
    /// Offered load levels in percent.
    pub loads_percent: Vec<f64>,
}

impl LoadSweep {
    /// Evenly spaced loads between two percentages.
    ///
    /// # Errors
    ///
    /// Same conditions as [`linspace`].
    pub fn from_range(
        service_rate: f64,
        max_queue_size: Option<u64>,
        start_percent: f64,
        end_percent: f64,
        points: usize,
    ) -> ModelResult<Self> {
        Ok(Self {
            service_rate,
            max_queue_size,
            loads_percent: linspace(start_percent, end_percent, points)?,
        })
    }

    /// An explicit table of load levels.
    #[must_use]
    pub fn from_levels(
        service_rate: f64,
        max_queue_size: Option<u64>,
        loads_percent: impl Into<Vec<f64>>,
    ) -> Self {
        Self {
            service_rate,
            max_queue_size,
            loads_percent: loads_percent.into(),
        }
    }

    fn arrival_rate(&self, load_percent: f64) -> f64 {
        load_percent / 100.0 * self.service_rate
    }

    /// Queueing metrics at every load level.
    ///
    /// # Errors
    ///
    /// Fails on the first level the queueing model rejects (for example a
    /// zero or negative load).
    pub fn queueing(&self) -> ModelResult<Vec<LoadPoint<QueueResult>>> {
        let model = QueueingModel;
        self.loads_percent
            .iter()
            .map(|&load_percent| {
                let arrival_rate = self.arrival_rate(load_percent);
                let query = QueueQuery {
                    arrival_rate,
                    service_rate: self.service_rate,
                    max_queue_size: self.max_queue_size,
                };
                Ok(LoadPoint {
                    load_percent,
                    arrival_rate,
                    result: model.analyze(query)?,
                })
            })
            .collect()
    }

    /// Degradation metrics at every load level.
    ///
    /// # Errors
    ///
    /// Fails when the sweep has no buffer size, or on the first level the
    /// degradation model rejects.
    pub fn degradation(&self) -> ModelResult<Vec<LoadPoint<DegradationResult>>> {
        self.degradation_points(|model, query| model.analyze(query))
    }

    /// Ideal M/M/1 and degraded predictions side by side at every load level.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::degradation`].
    pub fn comparison(&self) -> ModelResult<Vec<LoadPoint<LoadComparison>>> {
        self.degradation_points(|model, query| model.compare(query))
    }

    fn degradation_points<T>(
        &self,
        eval: impl Fn(&DegradationModel, DegradationQuery) -> ModelResult<T>,
    ) -> ModelResult<Vec<LoadPoint<T>>> {
        let Some(max_queue_size) = self.max_queue_size else {
            return Err(ModelError::invalid(
                "max_queue_size",
                "none",
                "the degradation model needs a finite buffer",
            ));
        };

        let model = DegradationModel;
        self.loads_percent
            .iter()
            .map(|&load_percent| {
                let arrival_rate = self.arrival_rate(load_percent);
                let query = DegradationQuery::new(arrival_rate, self.service_rate, max_queue_size);
                Ok(LoadPoint {
                    load_percent,
                    arrival_rate,
                    result: eval(&model, query)?,
                })
            })
            .collect()
    }
}

/// Speedup curve from one node up to `max_nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingSweep {
    /// Largest node count sampled.
    pub max_nodes: f64,
    /// Number of samples, including both ends.
    pub points: usize,
}

impl ScalingSweep {
    /// Create a sweep.
    #[must_use]
    pub const fn new(max_nodes: f64, points: usize) -> Self {
        Self { max_nodes, points }
    }

    /// Evaluate the scalability law for one (σ, κ) profile.
    ///
    /// A single-node sweep yields one sample.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error when `max_nodes < 1`, fewer than two
    /// points are requested, or a penalty is negative.
    pub fn evaluate(&self, sigma: f64, kappa: f64) -> ModelResult<Vec<ScalabilityResult>> {
        if !(self.max_nodes.is_finite() && self.max_nodes >= 1.0) {
            return Err(ModelError::invalid(
                "max_nodes",
                self.max_nodes,
                "must be a finite value of at least 1",
            ));
        }

        let mut nodes = linspace(1.0, self.max_nodes, self.points)?;
        nodes.dedup();

        let model = ScalabilityLawModel;
        nodes
            .into_iter()
            .map(|n| model.analyze(ScalabilityQuery::new(n, sigma, kappa)))
            .collect()
    }
}
