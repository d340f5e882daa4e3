use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use dirprobe_rs::aggregator::Aggregator;
use dirprobe_rs::dispatcher::{run_probes, DispatchConfig};
use dirprobe_rs::error::ConfigError;
use dirprobe_rs::expand::expand_all;
use dirprobe_rs::generate;
use dirprobe_rs::http::HttpTransport;
use dirprobe_rs::target::TargetDescriptor;
use dirprobe_rs::types::RunReport;
use dirprobe_rs::wordlist;

/// dirprobe-rs — async web path prober with a context-aware candidate generator.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dirprobe-rs",
    version,
    about = "Async web path prober with a context-aware candidate generator.",
    long_about = None,
    group(ArgGroup::new("source").required(true).args(["wordlist", "generate"]))
)]
struct Cli {
    /// Target base URL (http or https).
    #[arg(long, short = 'u')]
    url: String,

    /// Path to an external wordlist (one candidate per line).
    #[arg(long, short = 'w')]
    wordlist: Option<PathBuf>,

    /// Derive candidates from the target domain instead of a wordlist file.
    #[arg(long, default_value_t = false)]
    generate: bool,

    /// Comma-separated file extensions to expand each candidate with (e.g. php,html).
    #[arg(long, short = 'e')]
    extensions: Option<String>,

    /// Maximum number of candidates before extension expansion.
    #[arg(long, short = 'l', default_value_t = 2000, allow_negative_numbers = true)]
    limit: i64,

    /// Max concurrent in-flight probes.
    #[arg(long, short = 't', default_value_t = 50)]
    concurrency: usize,

    /// Retries per request after the first attempt.
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Per-attempt request timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 6000)]
    timeout_ms: u64,

    /// Extra status codes to treat as not-found, besides 404 (comma-separated).
    #[arg(long)]
    exclude: Option<String>,

    /// Write the final report as pretty JSON to this path.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Show a live progress bar while probing.
    #[arg(long, short = 'v', default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.limit <= 0 {
        return Err(ConfigError::InvalidLimit(cli.limit).into());
    }
    let limit = cli.limit as usize;

    let descriptor = TargetDescriptor::parse(&cli.url)?;
    let extensions = match cli.extensions.as_deref() {
        Some(s) => wordlist::parse_extensions(s)?,
        None => Vec::new(),
    };
    let excluded = parse_status_list(cli.exclude.as_deref())?;

    let words: Vec<String> = if let Some(path) = &cli.wordlist {
        let words = wordlist::load_words_from_path(path, limit)?;
        println!("Loaded {} candidates from {}", words.len(), path.display());
        words
    } else {
        generate::candidates(&descriptor, limit)?.collect()
    };
    let candidate_count = words.len();

    let tasks = expand_all(descriptor.base_url(), words, &extensions);

    println!("dirprobe-rs configuration:");
    println!("  target       : {}", descriptor.base_url());
    println!("  candidates   : {}", candidate_count);
    println!("  tasks        : {}", tasks.len());
    println!("  concurrency  : {}", cli.concurrency);
    println!("  retries      : {}", cli.retries);
    println!("  timeout_ms   : {}", cli.timeout_ms);
    println!(
        "  extensions   : {}",
        if extensions.is_empty() {
            "<none>".to_string()
        } else {
            extensions.join(",")
        }
    );
    println!(
        "  output       : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );

    let transport = HttpTransport::new(Duration::from_millis(cli.timeout_ms))?;
    let config = DispatchConfig {
        concurrency: cli.concurrency,
        retries: cli.retries,
        ..DispatchConfig::default()
    }
    .with_excluded(&excluded);

    let total = tasks.len() as u64;
    let aggregator = Aggregator::new(total);
    let cancel = CancellationToken::new();

    // Ctrl-C stops admitting tasks; in-flight probes finish naturally.
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        eprintln!("\nstopping: waiting for in-flight probes...");
        cancel_ctrlc.cancel();
    });

    let bar = if cli.verbose {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        Some(bar)
    } else {
        None
    };
    let ticker = {
        let aggregator = aggregator.clone();
        let bar = bar.clone();
        tokio::spawn(async move {
            let Some(bar) = bar else { return };
            loop {
                let stats = aggregator.snapshot();
                bar.set_position(stats.resolved());
                bar.set_message(format!("{} found", stats.found));
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        })
    };

    run_probes(
        tasks,
        transport,
        config,
        cancel.clone(),
        aggregator.clone(),
    )
    .await?;

    ticker.abort();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let report = aggregator.finalize();
    print_report(&report);

    if let Some(path) = cli.output.as_deref() {
        write_report_json(path, &report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Wrote JSON report to {}", path.display());
    }

    Ok(())
}

fn parse_status_list(s: Option<&str>) -> Result<Vec<u16>> {
    let mut out = Vec::new();
    if let Some(s) = s {
        for tok in s.split(',') {
            let tok = tok.trim();
            if tok.is_empty() {
                continue;
            }
            let code: u16 = tok
                .parse()
                .with_context(|| format!("invalid status code in --exclude: {tok}"))?;
            out.push(code);
        }
    }
    Ok(out)
}

fn print_report(report: &RunReport) {
    let stats = &report.stats;
    println!(
        "\nFound: {} (resolved: {}/{}, not found: {}, failed: {}, retried: {})",
        stats.found,
        stats.resolved(),
        stats.total,
        stats.not_found,
        stats.failed,
        stats.retried
    );
    if report.found.is_empty() {
        return;
    }

    let mut url_w = "url".len();
    for e in &report.found {
        url_w = url_w.max(e.url.len().min(80));
    }
    let status_w = "status".len();
    let len_w = "length".len().max(8);
    let ms_w = "elapsed_ms".len();

    println!(
        "{:<status_w$}  {:>len_w$}  {:>ms_w$}  {:<url_w$}",
        "status",
        "length",
        "elapsed_ms",
        "url",
        status_w = status_w,
        len_w = len_w,
        ms_w = ms_w,
        url_w = url_w
    );
    println!(
        "{:-<status_w$}  {:-<len_w$}  {:-<ms_w$}  {:-<url_w$}",
        "",
        "",
        "",
        "",
        status_w = status_w,
        len_w = len_w,
        ms_w = ms_w,
        url_w = url_w
    );
    for e in &report.found {
        let length = e
            .content_length
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut url = e.url.clone();
        if url.len() > 80 {
            url.truncate(80);
        }
        println!(
            "{:<status_w$}  {:>len_w$}  {:>ms_w$}  {:<url_w$}",
            e.status,
            length,
            e.elapsed_ms,
            url,
            status_w = status_w,
            len_w = len_w,
            ms_w = ms_w,
            url_w = url_w
        );
    }
}

fn write_report_json(path: &std::path::Path, report: &RunReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
