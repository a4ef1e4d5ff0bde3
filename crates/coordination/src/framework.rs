use crate::error::{CoordinationError, Result};
use crate::metrics::{calculate_metrics, CoordinationMetrics};
use crate::outcome::Outcome;
use crate::report::CoordinationReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tokio::task::{AbortHandle, JoinSet};

type BoxedTest = Pin<Box<dyn Future<Output = anyhow::Result<Outcome>> + Send + 'static>>;

/// Record of one timed coordination call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationTestResult {
    pub test_name: String,
    pub success: bool,
    /// Wall-clock seconds.
    pub execution_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
}

impl CoordinationTestResult {
    fn from_outcome(test_name: String, execution_time: f64, outcome: Outcome) -> Self {
        Self {
            test_name,
            success: outcome.ok,
            execution_time,
            error_message: outcome.error_message(),
            agent_used: outcome.agent,
            response_data: outcome.detail,
        }
    }

    fn failed(test_name: String, execution_time: f64, message: String) -> Self {
        Self {
            test_name,
            success: false,
            execution_time,
            error_message: Some(message),
            agent_used: None,
            response_data: None,
        }
    }
}

/// A named, not yet started coordination call.
pub struct CoordinationTest {
    name: String,
    test: BoxedTest,
}

impl CoordinationTest {
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        Self {
            name: name.into(),
            test: Box::pin(test),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Times wrapped coordination calls and accumulates their results.
///
/// Nothing here returns an error for a failing call: errors and panics inside a test become
/// failed [`CoordinationTestResult`]s so one bad call never aborts the rest of a run.
#[derive(Debug, Default)]
pub struct CoordinationTestFramework {
    results: Vec<CoordinationTestResult>,
}

impl CoordinationTestFramework {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a single test and append its result.
    pub async fn run_coordination_test<F>(
        &mut self,
        test_name: impl Into<String>,
        test: F,
    ) -> CoordinationTestResult
    where
        F: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        let result = execute(CoordinationTest::new(test_name, test)).await;
        self.results.push(result.clone());
        result
    }

    /// Launch every test at once and wait for all of them.
    ///
    /// Results are appended in submission order once the whole batch has finished.
    pub async fn run_concurrent_batch(
        &mut self,
        tests: Vec<CoordinationTest>,
    ) -> Vec<CoordinationTestResult> {
        let names: Vec<String> = tests.iter().map(|t| t.name.clone()).collect();
        let mut slots: Vec<Option<CoordinationTestResult>> = vec![None; tests.len()];

        let mut set = JoinSet::new();
        for (idx, test) in tests.into_iter().enumerate() {
            set.spawn(async move { (idx, execute(test).await) });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(err) => log::warn!("Coordination batch task failed to join: {err}"),
            }
        }

        let batch: Vec<CoordinationTestResult> = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    CoordinationTestResult::failed(
                        name,
                        0.0,
                        "Cancelled: task did not complete".to_string(),
                    )
                })
            })
            .collect();

        self.results.extend(batch.iter().cloned());
        batch
    }

    /// Run `tests` as consecutive concurrent batches of at most `batch_size`.
    pub async fn run_in_batches(
        &mut self,
        tests: Vec<CoordinationTest>,
        batch_size: usize,
    ) -> Result<Vec<CoordinationTestResult>> {
        if batch_size == 0 {
            return Err(CoordinationError::InvalidBatchSize(batch_size));
        }

        let mut all = Vec::with_capacity(tests.len());
        let mut remaining = tests.into_iter().peekable();
        let mut batch_no = 0usize;
        while remaining.peek().is_some() {
            let batch: Vec<CoordinationTest> = remaining.by_ref().take(batch_size).collect();
            batch_no += 1;
            log::debug!("Running coordination batch {batch_no} ({} tests)", batch.len());
            all.extend(self.run_concurrent_batch(batch).await);
        }
        Ok(all)
    }

    pub fn results(&self) -> &[CoordinationTestResult] {
        &self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn calculate_metrics(&self) -> CoordinationMetrics {
        calculate_metrics(&self.results)
    }

    pub fn report(&self) -> CoordinationReport {
        CoordinationReport::from_results(&self.results)
    }
}

async fn execute(test: CoordinationTest) -> CoordinationTestResult {
    let CoordinationTest { name, test } = test;
    let started = Instant::now();
    let handle = tokio::spawn(test);
    let _guard = AbortOnDrop(handle.abort_handle());
    let joined = handle.await;
    let elapsed = started.elapsed().as_secs_f64();

    let result = match joined {
        Ok(Ok(outcome)) => CoordinationTestResult::from_outcome(name, elapsed, outcome),
        Ok(Err(err)) => CoordinationTestResult::failed(name, elapsed, format!("{err:#}")),
        Err(err) if err.is_panic() => {
            let message = panic_message(err.into_panic());
            CoordinationTestResult::failed(name, elapsed, format!("Panic: {message}"))
        }
        Err(err) => CoordinationTestResult::failed(name, elapsed, format!("Cancelled: {err}")),
    };

    if result.success {
        log::debug!("{} passed in {:.3}s", result.test_name, result.execution_time);
    } else {
        log::warn!(
            "{} failed in {:.3}s: {}",
            result.test_name,
            result.execution_time,
            result.error_message.as_deref().unwrap_or_default()
        );
    }
    result
}

/// Cancels the spawned test body when the awaiting future is dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
