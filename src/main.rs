//! threadsense CLI
//!
//! Usage:
//!   threadsense --thread thread.json                 # Analyze one thread
//!   threadsense --thread a.json --thread b.json      # Calibrated against each other
//!   threadsense --thread a.json --signals sig.json   # Precomputed sentiment/embeddings
//!   threadsense --thread a.json --json               # JSON output
//!   threadsense --serve                              # HTTP API server

use clap::Parser;
use colored::{ColoredString, Colorize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use threadsense::core::{run_server, select_providers, PrecomputedSignals, ThreadAnalyzer};
use threadsense::types::{AnalysisConfig, MetricResult, NormalizationSession, RawThread, ThreadReport};
use threadsense::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "threadsense",
    version = VERSION,
    about = "Structural signals for threaded discussions",
    long_about = "threadsense turns a discussion thread (a post plus its comment tree)\n\
                  into structural metrics.\n\n\
                  Metrics:\n  \
                  coalition      - Diversity of factions in embedding space\n  \
                  one_sidedness  - Gini coefficient of comments per author\n  \
                  defection      - How deep sentiment reversals happen\n  \
                  resilience     - Sentiment after the first negative turn\n  \
                  reciprocity    - Mean depth of the first raw sentiment flip\n\n\
                  n/a means the metric cannot be computed for this thread."
)]
struct Args {
    /// Thread JSON file (repeat to analyze several)
    #[arg(short, long = "thread")]
    threads: Vec<String>,

    /// Precomputed sentiments/embeddings JSON keyed by text
    #[arg(long)]
    signals: Option<String>,

    /// Analysis config JSON (partial configs keep defaults)
    #[arg(long)]
    config: Option<String>,

    /// Number of factions requested from k-means
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// |sentiment| below this inherits the parent's sentiment
    #[arg(long)]
    neutral_threshold: Option<f64>,

    /// Normalize each thread on its own instead of across all of them
    #[arg(long)]
    independent_normalization: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-metric reasons and debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    };

    if args.serve {
        run_serve(&args, config).await;
    } else if args.threads.is_empty() {
        eprintln!("{} no --thread given (see --help)", "error:".red().bold());
        std::process::exit(2);
    } else if let Err(e) = run_analyze(&args, config) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise warn, or debug with --verbose
fn init_tracing(verbose: bool) {
    let default = if verbose { "threadsense=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then command-line overrides
fn load_config(args: &Args) -> threadsense::Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(k) = args.clusters {
        config.clusters = k;
    }
    if let Some(t) = args.neutral_threshold {
        config.neutral_threshold = t;
    }
    Ok(config)
}

/// Analyze every thread file, sharing one session unless told otherwise
fn run_analyze(args: &Args, config: AnalysisConfig) -> threadsense::Result<()> {
    let signals = args.signals.as_deref().map(PrecomputedSignals::load).transpose()?;
    let (embedder, scorer) = select_providers(signals);
    let analyzer = ThreadAnalyzer::new(config);

    let mut shared = NormalizationSession::new();
    let mut reports = Vec::with_capacity(args.threads.len());

    for path in &args.threads {
        info!(%path, "analyzing thread");
        let raw = RawThread::from_json(&std::fs::read_to_string(path)?)?;

        let mut fresh = NormalizationSession::new();
        let session = if args.independent_normalization { &mut fresh } else { &mut shared };
        let report = analyzer.analyze_raw(&raw, embedder.as_ref(), scorer.as_ref(), session)?;

        if !args.json {
            if args.no_color && !args.verbose {
                println!("{}: {}", path, report.to_parseable_string());
            } else {
                print_report(path, &report, args.verbose);
            }
        }
        reports.push((path.clone(), report));
    }

    if args.json {
        let out: Vec<_> = reports
            .iter()
            .map(|(path, report)| serde_json::json!({ "thread": path, "report": report }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if !args.independent_normalization && args.threads.len() > 1 {
        println!("{}", calibration_summary(&shared).as_str().dimmed());
    }
    Ok(())
}

/// Print one report
fn print_report(path: &str, report: &ThreadReport, verbose: bool) {
    println!("{}", path.bold());
    println!(
        "  {} comments | {} authors | {} branches | max depth {}",
        report.comment_count, report.author_count, report.branch_count, report.max_depth
    );
    for (name, metric) in report.metrics() {
        println!("  {:<14} {}", name, paint(&metric));
        if verbose {
            println!("  {:<14} {}", "", format!("└─ {}", metric.reason).as_str().dimmed());
        }
    }
    if verbose {
        if let Some(spread) = report.coalition.raw_spread {
            println!("  {:<14} {}", "", format!("raw spread {:.4}", spread).as_str().dimmed());
        }
    }
    println!();
}

/// Sentinels dimmed, computed values by sign
fn paint(metric: &MetricResult) -> ColoredString {
    let value = metric.display_value();
    let text = value.as_str();
    if metric.reason.is_sentinel() {
        text.dimmed()
    } else if metric.value < 0.0 {
        text.red()
    } else {
        text.green()
    }
}

/// Run HTTP API server
/// One-line summary of the shared session
fn calibration_summary(session: &NormalizationSession) -> String {
    if session.is_empty() {
        return "calibration: n/a (no thread reached clustering)".to_string();
    }
    format!(
        "calibration: spread range [{:.4}, {:.4}] over {} thread(s)",
        session.min_score, session.max_score, session.observations
    )
}

async fn run_serve(args: &Args, config: AnalysisConfig) {
    println!();
    println!("{}", format!("threadsense API server v{}", VERSION).as_str().bold());
    println!();

    if let Err(e) = run_server(&args.addr, config).await {
        error!(error = %e, "server stopped");
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_summary_empty_session() {
        let summary = calibration_summary(&NormalizationSession::new());
        assert_eq!(summary, "calibration: n/a (no thread reached clustering)");
        assert!(!summary.contains("inf"));
    }

    #[test]
    fn test_calibration_summary_range() {
        let mut session = NormalizationSession::new();
        session.observe(0.2);
        session.observe(0.4);
        assert_eq!(
            calibration_summary(&session),
            "calibration: spread range [0.2000, 0.4000] over 2 thread(s)"
        );
    }
}
