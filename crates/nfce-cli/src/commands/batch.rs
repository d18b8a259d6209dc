//! Batch processing command for multiple receipt photographs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use nfce_core::{ReceiptPipeline, ScanReport};

use super::{is_image, load_config, stage_error, DecoderArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for receipt photographs
    #[arg(required = true)]
    input: String,

    /// Output directory (one JSON file per image)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Decoding strategy (overrides the config file)
    #[arg(short, long, value_enum)]
    decoder: Option<DecoderArg>,

    /// Also write summary.json
    #[arg(long)]
    summary: bool,

    /// Number of receipts scanned concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of scanning one file.
#[derive(Debug, Serialize)]
struct FileResult {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ScanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    started_at: DateTime<Utc>,
    processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    generated_at: DateTime<Utc>,
    total: usize,
    succeeded: usize,
    failed: usize,
    files: &'a [FileResult],
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(decoder) = args.decoder {
        config.decoder.strategy = decoder.into();
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = ReceiptPipeline::from_config(&config).map_err(stage_error)?;
    let pipeline = &pipeline;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut scans = stream::iter(files)
        .map(|path| async move { scan_file(pipeline, path).await })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = scans.next().await {
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }

        if let (Some(report), Some(output_dir)) = (&result.report, &args.output_dir) {
            let output_path = output_file(output_dir, &result.path);
            fs::write(&output_path, serde_json::to_string_pretty(&report.items)?)?;
            debug!("Wrote output to {}", output_path.display());
        }

        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    // Stable order regardless of completion order
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let succeeded = results.iter().filter(|r| r.report.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.json"))
            .unwrap_or_else(|| PathBuf::from("summary.json"));

        let summary = BatchSummary {
            generated_at: Utc::now(),
            total: results.len(),
            succeeded,
            failed: failed.len(),
            files: &results,
        };
        fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;

        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {} [{}]: {}",
                result.path.display(),
                result.stage.as_deref().unwrap_or("io"),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn scan_file(pipeline: &ReceiptPipeline, path: PathBuf) -> FileResult {
    let started_at = Utc::now();
    let file_start = Instant::now();

    let (report, stage, error) = match tokio::fs::read(&path).await {
        Ok(bytes) => match pipeline.scan(&bytes).await {
            Ok(report) => (Some(report), None, None),
            Err(e) => (None, Some(e.stage().to_string()), Some(e.to_string())),
        },
        Err(e) => (None, None, Some(e.to_string())),
    };

    FileResult {
        path,
        report,
        stage,
        error,
        started_at,
        processing_time_ms: file_start.elapsed().as_millis() as u64,
    }
}

fn output_file(output_dir: &Path, input: &Path) -> PathBuf {
    let output_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");

    output_dir.join(format!("{}.json", output_name))
}
