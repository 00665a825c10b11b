//! One benchmark iteration: four concurrent per-problem calls, then one synthesis call.
//!
//! Phase 1 spawns a task per problem on the multi-threaded runtime and waits for
//! every task (barrier). Phase 2 starts only after that and is a single call.
//! A failing call never cancels its siblings or aborts the run.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{AnalysisClient, CallResult};
use crate::fixtures::Fixture;

/// Timing and outcome of one call, as reported and written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    pub ok: bool,
    pub status: u16,
    pub elapsed_s: f64,
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallDetail {
    pub fn from_result(problem_id: Option<String>, result: &CallResult) -> Self {
        let ok = result.succeeded();
        let (tokens_in, tokens_out) = result.tokens();
        Self {
            problem_id,
            ok,
            status: result.status,
            elapsed_s: result.elapsed.as_secs_f64(),
            tokens_in,
            tokens_out,
            error: (!ok).then(|| result.failure_reason()),
        }
    }
}

/// Result of one full pipeline iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub total_s: f64,
    pub phase1_s: f64,
    pub phase2_s: f64,
    /// One entry per problem, in the fixture's problem order.
    pub per_problem: Vec<CallDetail>,
    pub synthesis: CallDetail,
    pub all_ok: bool,
}

impl PipelineRun {
    pub fn passes(&self, threshold_s: f64) -> bool {
        self.total_s < threshold_s
    }

    pub fn slowest_problem(&self) -> Option<&CallDetail> {
        self.per_problem
            .iter()
            .max_by(|a, b| a.elapsed_s.total_cmp(&b.elapsed_s))
    }
}

/// Runs phase 1 and phase 2 once against `client`.
pub async fn run_pipeline(client: &AnalysisClient, fixture: &Fixture) -> PipelineRun {
    let run_start = Instant::now();

    // Phase 1: per-problem, one task each. Payloads are built before spawning
    // so tasks share nothing.
    let phase1_start = Instant::now();
    let handles: Vec<_> = fixture
        .problems
        .iter()
        .map(|problem| {
            let client = client.clone();
            let payload = fixture.per_problem_payload(problem);
            let handle = tokio::spawn(async move { client.call(&payload).await });
            (problem.id.clone(), handle)
        })
        .collect();

    let mut phase1 = Vec::with_capacity(handles.len());
    for (problem_id, handle) in handles {
        let result = handle.await.unwrap_or_else(|e| {
            warn!("Per-problem task for {} failed: {}", problem_id, e);
            CallResult {
                ok: false,
                status: 0,
                elapsed: phase1_start.elapsed(),
                body: None,
                error: Some(format!("task failed: {e}")),
            }
        });
        phase1.push((problem_id, result));
    }
    let phase1_elapsed = phase1_start.elapsed();

    // Synthesis input follows problem order, not completion order.
    let problem_results: Vec<Value> = phase1
        .iter()
        .filter_map(|(_, result)| result.summary().cloned())
        .collect();
    debug!(
        "Phase 1 done in {:?}: {}/{} analyses usable",
        phase1_elapsed,
        problem_results.len(),
        phase1.len()
    );

    let per_problem: Vec<CallDetail> = phase1
        .iter()
        .map(|(problem_id, result)| CallDetail::from_result(Some(problem_id.clone()), result))
        .collect();

    // Phase 2: synthesis, strictly after every phase-1 task has joined.
    let phase2_start = Instant::now();
    let synthesis_result = client
        .call(&fixture.synthesis_payload(problem_results))
        .await;
    let phase2_elapsed = phase2_start.elapsed();
    let synthesis = CallDetail::from_result(None, &synthesis_result);

    let total_elapsed = run_start.elapsed();
    let all_ok = per_problem.iter().all(|d| d.ok) && synthesis.ok;

    PipelineRun {
        total_s: secs(total_elapsed),
        phase1_s: secs(phase1_elapsed),
        phase2_s: secs(phase2_elapsed),
        per_problem,
        synthesis,
        all_ok,
    }
}

fn secs(d: Duration) -> f64 {
    d.as_secs_f64()
}
