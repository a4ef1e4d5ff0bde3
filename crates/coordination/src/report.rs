use crate::error::Result;
use crate::framework::CoordinationTestResult;
use crate::metrics::{
    calculate_metrics, CoordinationMetrics, TARGET_AVERAGE_RESPONSE_SECS, TARGET_SUCCESS_RATE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate_met: bool,
    pub response_time_met: bool,
    pub generated_at: String,
}

/// Final grading of a coordination run against the advisory targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationReport {
    pub test_summary: TestSummary,
    pub metrics: CoordinationMetrics,
    pub success_rate_target: f64,
    pub response_time_target: f64,
    pub target_achieved: bool,
    pub detailed_results: Vec<CoordinationTestResult>,
    pub recommendations: Vec<String>,
}

impl CoordinationReport {
    pub fn from_results(results: &[CoordinationTestResult]) -> Self {
        let metrics = calculate_metrics(results);
        let success_rate_met = metrics.meets_success_target();
        let response_time_met = metrics.meets_latency_target();

        Self {
            test_summary: TestSummary {
                total_tests: metrics.total_tests,
                passed: metrics.successful_tests,
                failed: metrics.failed_tests,
                success_rate_met,
                response_time_met,
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            recommendations: recommendations(&metrics),
            metrics,
            success_rate_target: TARGET_SUCCESS_RATE,
            response_time_target: TARGET_AVERAGE_RESPONSE_SECS,
            target_achieved: success_rate_met && response_time_met,
            detailed_results: results.to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_markdown(&self) -> String {
        let m = &self.metrics;
        let mut md = String::new();
        md.push_str("# Coordination report\n\n");
        md.push_str(&format!("- Generated: `{}`\n", self.test_summary.generated_at));
        md.push_str(&format!(
            "- Tests: `{}` (passed `{}`, failed `{}`)\n",
            m.total_tests, m.successful_tests, m.failed_tests
        ));
        md.push_str(&format!(
            "- Target achieved: `{}`\n\n",
            if self.target_achieved { "yes" } else { "no" }
        ));

        md.push_str("## Metrics\n\n");
        md.push_str("| metric | value | target | met |\n");
        md.push_str("|---|---:|---:|---|\n");
        md.push_str(&format!(
            "| success_rate | `{:.3}` | `{:.2}` | `{}` |\n",
            m.success_rate, self.success_rate_target, self.test_summary.success_rate_met
        ));
        md.push_str(&format!(
            "| avg_response_s | `{:.3}` | `{:.1}` | `{}` |\n",
            m.average_response_time, self.response_time_target, self.test_summary.response_time_met
        ));
        md.push_str(&format!("| p50_response_s | `{:.3}` | | |\n", m.p50_response_time));
        md.push_str(&format!("| p95_response_s | `{:.3}` | | |\n", m.p95_response_time));
        md.push_str(&format!(
            "| fastest_s | `{:.3}` | | |\n| slowest_s | `{:.3}` | | |\n\n",
            m.fastest_response_time, m.slowest_response_time
        ));

        if !m.error_breakdown.is_empty() {
            md.push_str("## Errors\n\n");
            md.push_str("| class | count |\n");
            md.push_str("|---|---:|\n");
            for (class, count) in &m.error_breakdown {
                md.push_str(&format!("| `{}` | `{count}` |\n", escape_cell(class)));
            }
            md.push('\n');
        }

        let failed: Vec<_> = self.detailed_results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            md.push_str("## Failed cases\n\n");
            md.push_str("| test | time_s | error |\n");
            md.push_str("|---|---:|---|\n");
            for result in failed.into_iter().take(10) {
                md.push_str(&format!(
                    "| `{}` | `{:.3}` | {} |\n",
                    escape_cell(&result.test_name),
                    result.execution_time,
                    escape_cell(&truncate_one_line(
                        result.error_message.as_deref().unwrap_or("n/a"),
                        120
                    )),
                ));
            }
            md.push('\n');
        }

        let mut slowest: Vec<_> = self.detailed_results.iter().collect();
        slowest.sort_by(|a, b| {
            b.execution_time
                .total_cmp(&a.execution_time)
                .then_with(|| a.test_name.cmp(&b.test_name))
        });
        if !slowest.is_empty() {
            md.push_str("## Slowest cases\n\n");
            md.push_str("| test | time_s | success |\n");
            md.push_str("|---|---:|---|\n");
            for result in slowest.into_iter().take(5) {
                md.push_str(&format!(
                    "| `{}` | `{:.3}` | `{}` |\n",
                    escape_cell(&result.test_name),
                    result.execution_time,
                    result.success
                ));
            }
            md.push('\n');
        }

        md.push_str("## Recommendations\n\n");
        for line in &self.recommendations {
            md.push_str(&format!("- {line}\n"));
        }
        md
    }
}

fn recommendations(metrics: &CoordinationMetrics) -> Vec<String> {
    let mut out = Vec::new();

    if !metrics.meets_success_target() {
        out.push(format!(
            "Success rate {:.1}% is below the {:.0}% target; review failing delegations before release",
            metrics.success_rate * 100.0,
            TARGET_SUCCESS_RATE * 100.0
        ));
    }
    if !metrics.meets_latency_target() {
        out.push(format!(
            "Average response time {:.2}s exceeds the {:.1}s target; reduce tier fan-out or cache hot queries",
            metrics.average_response_time, TARGET_AVERAGE_RESPONSE_SECS
        ));
    }

    let mut top: Option<(&String, usize)> = None;
    for (class, &count) in &metrics.error_breakdown {
        if top.map_or(true, |(_, best)| count > best) {
            top = Some((class, count));
        }
    }
    if let Some((class, count)) = top {
        out.push(format!(
            "Most frequent failure is '{class}' ({count} of {} failed tests); address it first",
            metrics.failed_tests
        ));
    }

    if metrics.slowest_response_time > 2.0 * TARGET_AVERAGE_RESPONSE_SECS {
        out.push(format!(
            "Slowest call took {:.2}s, more than twice the latency target; look for stalled backends",
            metrics.slowest_response_time
        ));
    }

    if out.is_empty() {
        out.push("All coordination targets met".to_string());
    }
    out
}

fn truncate_one_line(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let truncated: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
