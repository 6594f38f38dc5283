//! Configuration system with YAML schema and validation.
//!
//! The models take fully explicit parameters. Default parameters for the
//! reporting and chart front ends (service rate, buffer size, load table,
//! display ceilings) live here instead, validated in two passes:
//! - Schema validation via `validator` derive
//! - Semantic validation of cross-field constraints

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ModelError, ModelResult};
use crate::sweep::{LoadSweep, MAX_SWEEP_POINTS};

/// Top-level planner configuration.
///
/// Every section defaults when absent, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Queue defaults.
    #[validate(nested)]
    #[serde(default)]
    pub queue: QueueDefaults,

    /// Load sweep defaults.
    #[validate(nested)]
    #[serde(default)]
    pub sweep: SweepDefaults,

    /// Display ceilings for unbounded values.
    #[validate(nested)]
    #[serde(default)]
    pub display: DisplayDefaults,

    /// Scalability defaults.
    #[validate(nested)]
    #[serde(default)]
    pub scalability: ScalabilityDefaults,
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl PlannerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading planner configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> ModelResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the YAML emitter fails.
    pub fn to_yaml(&self) -> ModelResult<String> {
        serde_yaml::to_string(self).map_err(|e| ModelError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> ModelResult<()> {
        if !is_positive(self.queue.service_rate) {
            return Err(ModelError::config(format!(
                "service_rate must be positive, got {}",
                self.queue.service_rate
            )));
        }
        if self.queue.max_queue_size == Some(0) {
            return Err(ModelError::config("max_queue_size must be at least 1"));
        }

        let sweep = &self.sweep;
        if !is_positive(sweep.load_start_percent) {
            return Err(ModelError::config(format!(
                "load_start_percent must be positive, got {}",
                sweep.load_start_percent
            )));
        }
        if sweep.load_start_percent >= sweep.load_end_percent {
            return Err(ModelError::config(format!(
                "load_start_percent ({}) must be below load_end_percent ({})",
                sweep.load_start_percent, sweep.load_end_percent
            )));
        }
        if let Some(level) = sweep.load_levels.iter().find(|l| !is_positive(**l)) {
            return Err(ModelError::config(format!(
                "load levels must be positive, got {level}"
            )));
        }

        if !is_positive(self.display.latency_ceiling_ms) {
            return Err(ModelError::config("latency_ceiling_ms must be positive"));
        }
        if self.display.queue_ceiling.is_some_and(|c| !is_positive(c)) {
            return Err(ModelError::config("queue_ceiling must be positive"));
        }

        if !(1.0..=MAX_SWEEP_POINTS as f64).contains(&self.scalability.max_nodes) {
            return Err(ModelError::config(format!(
                "max_nodes must lie in [1, {MAX_SWEEP_POINTS}], got {}",
                self.scalability.max_nodes
            )));
        }

        Ok(())
    }

    /// Sweep over the continuous load range.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if the range is degenerate.
    pub fn load_range(&self) -> ModelResult<LoadSweep> {
        LoadSweep::from_range(
            self.queue.service_rate,
            self.queue.max_queue_size,
            self.sweep.load_start_percent,
            self.sweep.load_end_percent,
            self.sweep.points,
        )
    }

    /// Sweep over the fixed load table.
    #[must_use]
    pub fn load_table(&self) -> LoadSweep {
        LoadSweep::from_levels(
            self.queue.service_rate,
            self.queue.max_queue_size,
            self.sweep.load_levels.clone(),
        )
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            queue: QueueDefaults::default(),
            sweep: SweepDefaults::default(),
            display: DisplayDefaults::default(),
            scalability: ScalabilityDefaults::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct PlannerConfigBuilder {
    service_rate: Option<f64>,
    max_queue_size: Option<Option<u64>>,
    latency_ceiling_ms: Option<f64>,
}

impl PlannerConfigBuilder {
    /// Set the service rate (requests/second).
    #[must_use]
    pub const fn service_rate(mut self, rate: f64) -> Self {
        self.service_rate = Some(rate);
        self
    }

    /// Set the buffer capacity; `None` selects an unbounded queue.
    #[must_use]
    pub const fn max_queue_size(mut self, size: Option<u64>) -> Self {
        self.max_queue_size = Some(size);
        self
    }

    /// Set the latency display ceiling in milliseconds.
    #[must_use]
    pub const fn latency_ceiling_ms(mut self, ceiling: f64) -> Self {
        self.latency_ceiling_ms = Some(ceiling);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> PlannerConfig {
        let mut config = PlannerConfig::default();

        if let Some(rate) = self.service_rate {
            config.queue.service_rate = rate;
        }

        if let Some(size) = self.max_queue_size {
            config.queue.max_queue_size = size;
        }

        if let Some(ceiling) = self.latency_ceiling_ms {
            config.display.latency_ceiling_ms = ceiling;
        }

        config
    }
}

/// Default server parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct QueueDefaults {
    /// Service rate μ (requests/second).
    #[serde(default = "default_service_rate")]
    pub service_rate: f64,
    /// Buffer capacity K; `null` for an unbounded queue.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: Option<u64>,
}

const fn default_service_rate() -> f64 {
    100.0
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_queue_size() -> Option<u64> {
    Some(1000)
}

impl Default for QueueDefaults {
    fn default() -> Self {
        Self {
            service_rate: default_service_rate(),
            max_queue_size: default_max_queue_size(),
        }
    }
}

/// Default load sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SweepDefaults {
    /// First load level of the continuous range (percent).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_load_start")]
    pub load_start_percent: f64,
    /// Last load level of the continuous range (percent).
    #[serde(default = "default_load_end")]
    pub load_end_percent: f64,
    /// Samples in the continuous range.
    #[validate(range(min = 2, max = 100_000))]
    #[serde(default = "default_points")]
    pub points: usize,
    /// Fixed table of load levels (percent).
    #[validate(length(min = 1))]
    #[serde(default = "default_load_levels")]
    pub load_levels: Vec<f64>,
}

const fn default_load_start() -> f64 {
    10.0
}

const fn default_load_end() -> f64 {
    200.0
}

const fn default_points() -> usize {
    100
}

fn default_load_levels() -> Vec<f64> {
    vec![
        10.0, 30.0, 50.0, 70.0, 80.0, 90.0, 95.0, 99.0, 100.0, 110.0, 120.0, 150.0,
    ]
}

impl Default for SweepDefaults {
    fn default() -> Self {
        Self {
            load_start_percent: default_load_start(),
            load_end_percent: default_load_end(),
            points: default_points(),
            load_levels: default_load_levels(),
        }
    }
}

/// Finite stand-ins for unbounded values on charts and tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DisplayDefaults {
    /// Latency ceiling in milliseconds.
    #[serde(default = "default_latency_ceiling")]
    pub latency_ceiling_ms: f64,
    /// Queue length ceiling; defaults to the buffer size when `None`.
    #[serde(default)]
    pub queue_ceiling: Option<f64>,
}

const fn default_latency_ceiling() -> f64 {
    10_000.0
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            latency_ceiling_ms: default_latency_ceiling(),
            queue_ceiling: None,
        }
    }
}

/// Defaults for scalability reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ScalabilityDefaults {
    /// Largest node count in a speedup table.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: f64,
    /// Single-node throughput (requests/second).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_base_throughput")]
    pub base_throughput: f64,
    /// Single-node response time (milliseconds).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_base_response_time")]
    pub base_response_time_ms: f64,
}

const fn default_max_nodes() -> f64 {
    32.0
}

const fn default_base_throughput() -> f64 {
    1000.0
}

const fn default_base_response_time() -> f64 {
    10.0
}

impl Default for ScalabilityDefaults {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            base_throughput: default_base_throughput(),
            base_response_time_ms: default_base_response_time(),
        }
    }
}
