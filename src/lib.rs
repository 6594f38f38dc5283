//! # capplan
//!
//! Closed-form capacity planning for distributed systems.
//!
//! Four stateless models, each a pure function of an explicit query:
//! - Node-failure probability under a binomial model
//! - M/M/1 and M/M/1/K queueing metrics
//! - Throughput and latency degradation beyond saturation
//! - Universal Scalability Law speedup and optimal node count
//!
//! ## Example
//!
//! ```rust
//! use capplan::prelude::*;
//!
//! let result = QueueingModel
//!     .analyze(QueueQuery::unbounded(90.0, 100.0))
//!     .expect("valid rates");
//! assert_eq!(result.status, QueueStatus::Stable);
//! assert_eq!(result.avg_queue_length.finite().map(|q| q.round()), Some(8.0));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod sweep;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{PlannerConfig, PlannerConfigBuilder};
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::models::{
        Bounded, CapacityModel, DegradationModel, DegradationQuery, DegradationResult,
        FailureProbabilityModel, FailureQuery, FailureResult, LoadZone, OneInX,
        OptimalNodeCount, QueueQuery, QueueResult, QueueStatus, QueueingModel,
        ScalabilityLawModel, ScalabilityQuery, ScalabilityResult,
    };
    pub use crate::sweep::{linspace, LoadPoint, LoadSweep, ScalingSweep, MAX_SWEEP_POINTS};
}

/// Re-export for public API
pub use error::{ModelError, ModelResult};
