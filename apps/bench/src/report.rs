//! Aggregation of pipeline runs into a pass/fail report.

use std::fmt;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};

use crate::fixtures::Problem;
use crate::pipeline::PipelineRun;
use crate::stats::{mean_count, LatencyStats};

const WIDTH: usize = 78;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail => f.write_str("FAIL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    PerProblem,
    Synthesis,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PerProblem => f.write_str("Phase 1 (per-problem)"),
            Phase::Synthesis => f.write_str("Phase 2 (synthesis)"),
        }
    }
}

/// Mean token counts over successful calls only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TokenAverages {
    pub per_problem_in: Option<f64>,
    pub per_problem_out: Option<f64>,
    pub synthesis_in: Option<f64>,
    pub synthesis_out: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    /// 1-based index of the slowest run.
    pub slowest_run: usize,
    pub slowest_total_s: f64,
    pub slowest_phase1_s: f64,
    pub slowest_phase2_s: f64,
    /// Slowest per-problem call inside the slowest run.
    pub slowest_problem: Option<(String, f64)>,
    pub avg_phase1_s: f64,
    pub avg_phase2_s: f64,
    pub avg_total_s: f64,
    pub dominant: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub threshold_s: f64,
    pub run_count: usize,
    /// Runs whose total time is under the threshold.
    pub pass_count: usize,
    /// Runs with at least one failed call.
    pub failed_runs: usize,
    pub total: LatencyStats,
    pub phase1: LatencyStats,
    pub phase2: LatencyStats,
    pub per_problem: Vec<(String, LatencyStats)>,
    pub tokens: TokenAverages,
    pub bottleneck: Bottleneck,
    pub verdict: Verdict,
}

impl BenchmarkReport {
    /// `None` when there are no runs to report on.
    pub fn from_runs(runs: &[PipelineRun], problems: &[Problem], threshold_s: f64) -> Option<Self> {
        let totals: Vec<f64> = runs.iter().map(|r| r.total_s).collect();
        let phase1s: Vec<f64> = runs.iter().map(|r| r.phase1_s).collect();
        let phase2s: Vec<f64> = runs.iter().map(|r| r.phase2_s).collect();

        let total = LatencyStats::from_samples(&totals)?;
        let phase1 = LatencyStats::from_samples(&phase1s)?;
        let phase2 = LatencyStats::from_samples(&phase2s)?;

        let per_problem = problems
            .iter()
            .filter_map(|problem| {
                let times: Vec<f64> = runs
                    .iter()
                    .flat_map(|r| r.per_problem.iter())
                    .filter(|d| d.problem_id.as_deref() == Some(problem.id.as_str()))
                    .map(|d| d.elapsed_s)
                    .collect();
                LatencyStats::from_samples(&times).map(|s| (problem.id.clone(), s))
            })
            .collect();

        let pass_count = runs.iter().filter(|r| r.passes(threshold_s)).count();
        let failed_runs = runs.iter().filter(|r| !r.all_ok).count();
        let verdict = if pass_count == runs.len() {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        Some(Self {
            threshold_s,
            run_count: runs.len(),
            pass_count,
            failed_runs,
            total,
            phase1,
            phase2,
            per_problem,
            tokens: token_averages(runs),
            bottleneck: bottleneck(runs, &phase1, &phase2, &total)?,
            verdict,
        })
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Process exit status: 0 on PASS, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        match self.verdict {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }

    /// Human-readable report; `runs` feeds the per-run table.
    pub fn render<'a>(&'a self, runs: &'a [PipelineRun]) -> impl fmt::Display + 'a {
        RenderedReport { report: self, runs }
    }
}

/// Raw results as written by `--json`: `{config, timestamp, runs}`.
pub fn results_json(
    url: &str,
    run_count: u32,
    threshold_s: f64,
    runs: &[PipelineRun],
    finished_at: DateTime<Utc>,
) -> serde_json::Result<Value> {
    Ok(json!({
        "config": {
            "url": url,
            "runs": run_count,
            "threshold": threshold_s,
        },
        "timestamp": finished_at.format(TIMESTAMP_FORMAT).to_string(),
        "runs": serde_json::to_value(runs)?,
    }))
}

fn token_averages(runs: &[PipelineRun]) -> TokenAverages {
    let per_problem = || runs.iter().flat_map(|r| r.per_problem.iter());
    let pp_in: Vec<u64> = per_problem().filter_map(|d| d.tokens_in).collect();
    let pp_out: Vec<u64> = per_problem().filter_map(|d| d.tokens_out).collect();
    let sy_in: Vec<u64> = runs.iter().filter_map(|r| r.synthesis.tokens_in).collect();
    let sy_out: Vec<u64> = runs.iter().filter_map(|r| r.synthesis.tokens_out).collect();

    TokenAverages {
        per_problem_in: mean_count(&pp_in),
        per_problem_out: mean_count(&pp_out),
        synthesis_in: mean_count(&sy_in),
        synthesis_out: mean_count(&sy_out),
    }
}

fn bottleneck(
    runs: &[PipelineRun],
    phase1: &LatencyStats,
    phase2: &LatencyStats,
    total: &LatencyStats,
) -> Option<Bottleneck> {
    let (index, slowest) = runs
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_s.total_cmp(&b.total_s))?;

    let slowest_problem = slowest
        .slowest_problem()
        .map(|d| (d.problem_id.clone().unwrap_or_default(), d.elapsed_s));

    let dominant = if phase2.mean > phase1.mean {
        Phase::Synthesis
    } else {
        Phase::PerProblem
    };

    Some(Bottleneck {
        slowest_run: index + 1,
        slowest_total_s: slowest.total_s,
        slowest_phase1_s: slowest.phase1_s,
        slowest_phase2_s: slowest.phase2_s,
        slowest_problem,
        avg_phase1_s: phase1.mean,
        avg_phase2_s: phase2.mean,
        avg_total_s: total.mean,
        dominant,
    })
}

struct RenderedReport<'a> {
    report: &'a BenchmarkReport,
    runs: &'a [PipelineRun],
}

impl fmt::Display for RenderedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let heavy = "=".repeat(WIDTH);
        let light = "─".repeat(WIDTH);

        writeln!(f, "\n{heavy}")?;
        writeln!(f, "  BENCHMARK REPORT: Iterative Analysis Pipeline (4 problems + synthesis)")?;
        writeln!(f, "{heavy}")?;

        // Per-run table
        writeln!(
            f,
            "\n{:>4}  {:>8}  {:>8}  {:>8}  {:>8}  {:>6}  Per-problem breakdown",
            "Run", "Total", "Phase1", "Phase2", "Status", "Pass"
        )?;
        writeln!(f, "{}", "-".repeat(WIDTH))?;
        for (i, run) in self.runs.iter().enumerate() {
            let mut details: Vec<_> = run.per_problem.iter().collect();
            details.sort_by(|a, b| a.problem_id.cmp(&b.problem_id));
            let breakdown = details
                .iter()
                .map(|d| {
                    format!(
                        "{}={:.1}s",
                        short_label(d.problem_id.as_deref().unwrap_or("?")),
                        d.elapsed_s
                    )
                })
                .collect::<Vec<_>>()
                .join("  ");
            let status = if run.all_ok { "OK".normal() } else { "FAIL".red() };
            let passed = if run.passes(r.threshold_s) {
                "PASS".green()
            } else {
                "FAIL".red()
            };
            writeln!(
                f,
                "  {:>2}  {:>7.2}s  {:>7.2}s  {:>7.2}s  {:>8}  {:>6}  {}",
                i + 1,
                run.total_s,
                run.phase1_s,
                run.phase2_s,
                status,
                passed,
                breakdown
            )?;
        }

        // Aggregate stats
        writeln!(f, "\n{light}")?;
        writeln!(f, "  AGGREGATE STATS ({} runs)", r.run_count)?;
        writeln!(f, "{light}")?;
        stat_line(f, "End-to-end", &r.total)?;
        stat_line(f, "Phase 1 (parallel)", &r.phase1)?;
        stat_line(f, "Phase 2 (synthesis)", &r.phase2)?;

        writeln!(f, "\n  Per-problem call times:")?;
        for (problem_id, stats) in &r.per_problem {
            stat_line(f, &format!("    {problem_id}"), stats)?;
        }

        writeln!(f, "\n  Token usage (avg):")?;
        if let (Some(tin), Some(tout)) = (r.tokens.per_problem_in, r.tokens.per_problem_out) {
            writeln!(f, "    Per-problem  in={tin:.0}  out={tout:.0}")?;
        }
        if let (Some(tin), Some(tout)) = (r.tokens.synthesis_in, r.tokens.synthesis_out) {
            writeln!(f, "    Synthesis    in={tin:.0}  out={tout:.0}")?;
        }

        // Bottleneck analysis
        let b = &r.bottleneck;
        writeln!(f, "\n{light}")?;
        writeln!(f, "  BOTTLENECK ANALYSIS")?;
        writeln!(f, "{light}")?;
        writeln!(f, "  Slowest run: #{} at {:.2}s", b.slowest_run, b.slowest_total_s)?;
        writeln!(
            f,
            "    Phase 1: {:.2}s  Phase 2: {:.2}s",
            b.slowest_phase1_s, b.slowest_phase2_s
        )?;
        if let Some((problem_id, elapsed)) = &b.slowest_problem {
            writeln!(f, "    Slowest per-problem call: {problem_id} at {elapsed:.2}s")?;
        }
        writeln!(
            f,
            "\n  Avg time split: Phase 1 = {:.2}s ({:.0}%)  Phase 2 = {:.2}s ({:.0}%)",
            b.avg_phase1_s,
            percent(b.avg_phase1_s, b.avg_total_s),
            b.avg_phase2_s,
            percent(b.avg_phase2_s, b.avg_total_s)
        )?;
        writeln!(f, "  Bottleneck: {}", b.dominant)?;

        // Verdict
        let verdict = match r.verdict {
            Verdict::Pass => r.verdict.to_string().green().bold(),
            Verdict::Fail => r.verdict.to_string().red().bold(),
        };
        writeln!(f, "\n{heavy}")?;
        writeln!(
            f,
            "  RESULT: {}  ({}/{} runs under {}s threshold)",
            verdict, r.pass_count, r.run_count, r.threshold_s
        )?;
        writeln!(
            f,
            "  API errors: {}/{} runs had at least one failed call",
            r.failed_runs, r.run_count
        )?;
        writeln!(
            f,
            "  Average end-to-end: {:.2}s  (headroom: {:.2}s)",
            r.total.mean,
            r.threshold_s - r.total.mean
        )?;
        writeln!(f, "{heavy}")
    }
}

fn stat_line(f: &mut fmt::Formatter<'_>, label: &str, s: &LatencyStats) -> fmt::Result {
    writeln!(
        f,
        "  {:<18}  min={:.2}s  avg={:.2}s  med={:.2}s  p95={:.2}s  max={:.2}s  sd={:.2}s",
        label, s.min, s.mean, s.median, s.p95, s.max, s.std_dev
    )
}

/// First hyphen-separated word of an id, at most 6 chars.
fn short_label(problem_id: &str) -> String {
    problem_id
        .split('-')
        .next()
        .unwrap_or(problem_id)
        .chars()
        .take(6)
        .collect()
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::pipeline::CallDetail;

    fn detail(problem_id: Option<&str>, elapsed_s: f64, ok: bool, tokens: Option<(u64, u64)>) -> CallDetail {
        CallDetail {
            problem_id: problem_id.map(str::to_string),
            ok,
            status: if ok { 200 } else { 429 },
            elapsed_s,
            tokens_in: tokens.map(|t| t.0),
            tokens_out: tokens.map(|t| t.1),
            error: (!ok).then(|| "HTTP 429: busy".to_string()),
        }
    }

    fn run(total_s: f64, phase1_s: f64, per_problem: [f64; 4], all_ok: bool) -> PipelineRun {
        let ids = ["two-sum", "valid-palindrome", "reverse-linked-list", "fizz-buzz"];
        let per_problem = ids
            .iter()
            .zip(per_problem)
            .map(|(id, t)| detail(Some(id), t, true, Some((1000, 200))))
            .collect();
        PipelineRun {
            total_s,
            phase1_s,
            phase2_s: total_s - phase1_s,
            per_problem,
            synthesis: detail(None, total_s - phase1_s, all_ok, all_ok.then_some((3000, 800))),
            all_ok,
        }
    }

    fn problems() -> Vec<Problem> {
        Fixture::coding_session().problems
    }

    #[test]
    fn test_threshold_scenario() {
        let runs = vec![
            run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(12.0, 5.0, [5.0, 3.0, 4.0, 2.0], true),
            run(20.0, 6.0, [3.0, 6.0, 4.0, 2.0], true),
        ];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        assert_eq!(report.pass_count, 2);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(!report.passed());
    }

    #[test]
    fn test_all_under_threshold_passes_even_with_api_errors() {
        let runs = vec![
            run(8.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(9.0, 5.0, [5.0, 3.0, 4.0, 2.0], false),
        ];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.failed_runs, 1);
    }

    #[test]
    fn test_bottleneck_points_at_slowest_run_and_call() {
        let runs = vec![
            run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(20.0, 6.0, [3.0, 6.0, 4.0, 2.0], true),
            run(12.0, 5.0, [5.0, 3.0, 4.0, 2.0], true),
        ];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        let b = &report.bottleneck;
        assert_eq!(b.slowest_run, 2);
        assert_eq!(b.slowest_total_s, 20.0);
        assert_eq!(b.slowest_problem, Some(("valid-palindrome".to_string(), 6.0)));
        // phase 2 averages 9.0s vs 5.0s for phase 1
        assert_eq!(b.dominant, Phase::Synthesis);
    }

    #[test]
    fn test_per_problem_stats_keep_problem_order() {
        let runs = vec![
            run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(12.0, 5.0, [5.0, 3.0, 4.0, 2.0], true),
        ];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        let ids: Vec<_> = report.per_problem.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["two-sum", "valid-palindrome", "reverse-linked-list", "fizz-buzz"]);
        assert_eq!(report.per_problem[0].1.mean, 4.0);
    }

    #[test]
    fn test_token_means_skip_failed_calls() {
        let runs = vec![
            run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(12.0, 5.0, [5.0, 3.0, 4.0, 2.0], false),
        ];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        assert_eq!(report.tokens.per_problem_in, Some(1000.0));
        assert_eq!(report.tokens.synthesis_in, Some(3000.0));
        assert_eq!(report.tokens.synthesis_out, Some(800.0));
    }

    #[test]
    fn test_no_runs_no_report() {
        assert!(BenchmarkReport::from_runs(&[], &problems(), 15.0).is_none());
    }

    #[test]
    fn test_render_contains_sections() {
        let runs = vec![run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true)];
        let report = BenchmarkReport::from_runs(&runs, &problems(), 15.0).unwrap();
        let text = report.render(&runs).to_string();
        assert!(text.contains("BENCHMARK REPORT"));
        assert!(text.contains("AGGREGATE STATS (1 runs)"));
        assert!(text.contains("BOTTLENECK ANALYSIS"));
        assert!(text.contains("revers=4.0s"));
        assert!(text.contains("1/1 runs under 15s threshold"));
    }

    #[test]
    fn test_exit_status_follows_verdict() {
        let passing = vec![run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true)];
        let report = BenchmarkReport::from_runs(&passing, &problems(), 15.0).unwrap();
        assert_eq!(report.exit_status(), 0);

        let failing = vec![run(20.0, 6.0, [3.0, 6.0, 4.0, 2.0], true)];
        let report = BenchmarkReport::from_runs(&failing, &problems(), 15.0).unwrap();
        assert_eq!(report.exit_status(), 1);
    }

    #[test]
    fn test_results_json_shape() {
        use chrono::TimeZone;

        let runs = vec![
            run(10.0, 4.0, [3.0, 3.5, 4.0, 2.0], true),
            run(12.0, 5.0, [5.0, 3.0, 4.0, 2.0], false),
        ];
        let finished_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let value = results_json("http://localhost:8080/", 2, 15.0, &runs, finished_at).unwrap();

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["config", "runs", "timestamp"]);
        assert_eq!(value["config"]["url"], "http://localhost:8080/");
        assert_eq!(value["config"]["runs"], 2);
        assert_eq!(value["config"]["threshold"], 15.0);
        assert_eq!(value["timestamp"], "2024-03-09T14:05:07Z");

        let dumped = value["runs"].as_array().unwrap();
        assert_eq!(dumped.len(), 2);
        assert_eq!(dumped[0]["total_s"], 10.0);
        assert_eq!(dumped[0]["per_problem"][0]["problem_id"], "two-sum");
        assert_eq!(dumped[1]["all_ok"], false);
        assert!(dumped[1]["synthesis"].get("problem_id").is_none());
        assert!(dumped[1]["synthesis"]["error"].as_str().unwrap().contains("429"));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("reverse-linked-list"), "revers");
        assert_eq!(short_label("two-sum"), "two");
    }
}
