use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use pipeline_bench::client::{AnalysisClient, DEFAULT_CALL_TIMEOUT};
use pipeline_bench::fixtures::Fixture;
use pipeline_bench::pipeline::run_pipeline;
use pipeline_bench::report::{results_json, BenchmarkReport};

const DEFAULT_URL: &str = "https://30vsmo8j0l.execute-api.us-west-2.amazonaws.com/";

/// Benchmark the iterative analysis pipeline (4 per-problem calls + synthesis)
#[derive(Parser)]
#[command(name = "pipeline-bench")]
#[command(about = "End-to-end latency benchmark for the interview analysis endpoint", long_about = None)]
struct Cli {
    /// Analysis endpoint URL
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Number of pipeline iterations
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    runs: u32,

    /// Pass/fail threshold in seconds
    #[arg(long, default_value = "15.0")]
    threshold: f64,

    /// Also write raw results as JSON
    #[arg(long)]
    json: bool,

    /// Where --json writes its output
    #[arg(long, default_value = "benchmark_results.json")]
    json_path: PathBuf,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CALL_TIMEOUT.as_secs())]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fixture = Fixture::coding_session();
    let client = AnalysisClient::new(&cli.url, Duration::from_secs(cli.timeout))
        .context("Failed to build HTTP client")?;

    println!("\nBenchmark config:");
    println!("  API URL:    {}", client.url());
    println!("  Runs:       {}", cli.runs);
    println!("  Threshold:  {}s", cli.threshold);
    println!(
        "  Transcript: {} messages, {} problems",
        fixture.transcript.len(),
        fixture.problems.len()
    );
    println!("  Date:       {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S %Z"));

    // Warmup, so the first measured run doesn't pay for cold starts
    if let Some(payload) = fixture.warmup_payload() {
        print!("\nWarmup call... ");
        std::io::stdout().flush()?;
        let warmup = client.call(&payload).await;
        let status = if warmup.ok { "OK".green() } else { "FAIL".red() };
        println!("{} ({:.2}s)", status, warmup.elapsed.as_secs_f64());
    }

    let mut runs = Vec::with_capacity(cli.runs as usize);
    for i in 1..=cli.runs {
        print!("\rRun {}/{}...", i, cli.runs);
        std::io::stdout().flush()?;

        let run = run_pipeline(&client, &fixture).await;
        let status = if run.all_ok { "ok".normal() } else { "FAIL".red() };
        println!(
            "\rRun {}/{}: {:.2}s [{}]  (p1={:.1}s  p2={:.1}s)",
            i, cli.runs, run.total_s, status, run.phase1_s, run.phase2_s
        );
        runs.push(run);
    }

    let report = BenchmarkReport::from_runs(&runs, &fixture.problems, cli.threshold)
        .context("No runs were recorded")?;
    println!("{}", report.render(&runs));

    if cli.json {
        let output = results_json(&cli.url, cli.runs, cli.threshold, &runs, chrono::Utc::now())?;
        let text = serde_json::to_string_pretty(&output)?;
        std::fs::write(&cli.json_path, text)
            .with_context(|| format!("Failed to write {}", cli.json_path.display()))?;
        println!("  Raw results written to {}", cli.json_path.display());
    }

    Ok(ExitCode::from(report.exit_status()))
}
