//! Success and latency measurement harness for agent coordination.
//!
//! Wrap each coordination call as a future producing an [`Outcome`], run it through a
//! [`CoordinationTestFramework`] singly or in concurrent batches, then grade the accumulated
//! results with [`calculate_metrics`] and [`CoordinationReport`].

mod error;
mod framework;
mod metrics;
mod outcome;
mod report;

pub use error::{CoordinationError, Result};
pub use framework::{CoordinationTest, CoordinationTestFramework, CoordinationTestResult};
pub use metrics::{
    calculate_metrics, CoordinationMetrics, TARGET_AVERAGE_RESPONSE_SECS, TARGET_SUCCESS_RATE,
};
pub use outcome::Outcome;
pub use report::{CoordinationReport, TestSummary};
