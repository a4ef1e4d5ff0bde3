use crate::framework::CoordinationTestResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Advisory success-rate target. Reported against, never enforced.
pub const TARGET_SUCCESS_RATE: f64 = 0.90;
/// Advisory average latency target, in seconds.
pub const TARGET_AVERAGE_RESPONSE_SECS: f64 = 5.0;

const UNKNOWN_ERROR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinationMetrics {
    pub total_tests: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    pub success_rate: f64,
    pub average_response_time: f64,
    pub fastest_response_time: f64,
    pub slowest_response_time: f64,
    pub p50_response_time: f64,
    pub p95_response_time: f64,
    /// Failed results grouped by the text before the first `:` of their error message.
    pub error_breakdown: BTreeMap<String, usize>,
}

impl CoordinationMetrics {
    pub fn meets_success_target(&self) -> bool {
        self.success_rate >= TARGET_SUCCESS_RATE
    }

    pub fn meets_latency_target(&self) -> bool {
        self.average_response_time <= TARGET_AVERAGE_RESPONSE_SECS
    }
}

pub fn calculate_metrics(results: &[CoordinationTestResult]) -> CoordinationMetrics {
    if results.is_empty() {
        return CoordinationMetrics::default();
    }

    let total_tests = results.len();
    let successful_tests = results.iter().filter(|r| r.success).count();

    let mut times: Vec<f64> = results.iter().map(|r| r.execution_time).collect();
    times.sort_by(f64::total_cmp);

    let mut error_breakdown = BTreeMap::new();
    for result in results.iter().filter(|r| !r.success) {
        *error_breakdown
            .entry(error_class(result.error_message.as_deref()))
            .or_insert(0) += 1;
    }

    CoordinationMetrics {
        total_tests,
        successful_tests,
        failed_tests: total_tests - successful_tests,
        success_rate: successful_tests as f64 / total_tests as f64,
        average_response_time: times.iter().sum::<f64>() / total_tests as f64,
        fastest_response_time: times[0],
        slowest_response_time: times[total_tests - 1],
        p50_response_time: percentile(&times, 0.50),
        p95_response_time: percentile(&times, 0.95),
        error_breakdown,
    }
}

fn error_class(message: Option<&str>) -> String {
    message
        .and_then(|m| m.split(':').next())
        .map(str::trim)
        .filter(|class| !class.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

/// Nearest-rank percentile over ascending `sorted`.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let rank = ((pct.clamp(0.0, 1.0) * n as f64).ceil() as usize)
        .saturating_sub(1)
        .min(n - 1);
    sorted[rank]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn result(success: bool, time: f64, error: Option<&str>) -> CoordinationTestResult {
        CoordinationTestResult {
            test_name: "t".to_string(),
            success,
            execution_time: time,
            error_message: error.map(str::to_string),
            agent_used: None,
            response_data: None,
        }
    }

    #[test]
    fn empty_results_yield_zeroed_metrics() {
        let metrics = calculate_metrics(&[]);
        assert_eq!(metrics, CoordinationMetrics::default());
        assert!(!metrics.meets_success_target());
    }

    #[test]
    fn aggregates_rates_and_latencies() {
        let metrics = calculate_metrics(&[
            result(true, 1.0, None),
            result(true, 3.0, None),
            result(false, 2.0, Some("TimeoutError: agent stalled")),
            result(false, 6.0, Some("TimeoutError: again")),
        ]);
        assert_eq!(metrics.total_tests, 4);
        assert_eq!(metrics.successful_tests, 2);
        assert_eq!(metrics.failed_tests, 2);
        assert_eq!(metrics.success_rate, 0.5);
        assert_eq!(metrics.average_response_time, 3.0);
        assert_eq!(metrics.fastest_response_time, 1.0);
        assert_eq!(metrics.slowest_response_time, 6.0);
        assert_eq!(metrics.p50_response_time, 2.0);
        assert_eq!(metrics.p95_response_time, 6.0);
        assert_eq!(
            metrics.error_breakdown,
            BTreeMap::from([("TimeoutError".to_string(), 2)])
        );
    }

    #[test]
    fn error_classes_fall_back_to_unknown() {
        assert_eq!(error_class(None), "Unknown");
        assert_eq!(error_class(Some(": leading colon")), "Unknown");
        assert_eq!(error_class(Some("Unsuccessful response")), "Unsuccessful response");
        assert_eq!(error_class(Some("Panic: index out of bounds")), "Panic");
    }

    #[test]
    fn percentile_uses_nearest_rank() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.50), 30.0);
        assert_eq!(percentile(&values, 0.95), 50.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn targets_are_inclusive() {
        let metrics = CoordinationMetrics {
            success_rate: 0.9,
            average_response_time: 5.0,
            ..CoordinationMetrics::default()
        };
        assert!(metrics.meets_success_target());
        assert!(metrics.meets_latency_target());
    }

    proptest! {
        #[test]
        fn proptest_metrics_match_inputs(
            entries in prop::collection::vec((any::<bool>(), 0u32..10_000u32), 1..60)
        ) {
            let results: Vec<_> = entries
                .iter()
                .map(|(ok, ms)| {
                    let error = (!ok).then_some("Boom: failed");
                    result(*ok, f64::from(*ms) / 1000.0, error)
                })
                .collect();
            let metrics = calculate_metrics(&results);

            let successes = entries.iter().filter(|(ok, _)| *ok).count();
            let mean = results.iter().map(|r| r.execution_time).sum::<f64>() / results.len() as f64;

            prop_assert_eq!(metrics.success_rate, successes as f64 / results.len() as f64);
            prop_assert!((metrics.average_response_time - mean).abs() < 1e-9);
            prop_assert_eq!(
                metrics.error_breakdown.values().sum::<usize>(),
                metrics.failed_tests
            );
            prop_assert!(metrics.fastest_response_time <= metrics.p50_response_time);
            prop_assert!(metrics.p95_response_time <= metrics.slowest_response_time);
        }
    }
}
