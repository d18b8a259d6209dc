//! Process command - scan a single receipt photograph.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use nfce_core::{first_table_html, ReceiptPipeline, ScanReport};

use super::{is_image, load_config, stage_error, DecoderArg};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt photograph (PNG or JPEG)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Decoding strategy (overrides the config file)
    #[arg(short, long, value_enum)]
    decoder: Option<DecoderArg>,

    /// Margin in pixels around the located QR code
    #[arg(long)]
    padding: Option<u32>,

    /// Write the cropped QR region to this file
    #[arg(long)]
    save_crop: Option<PathBuf>,

    /// Write the first table of the invoice page to this file
    #[arg(long)]
    save_table: Option<PathBuf>,

    /// Output the full scan report instead of the items only (JSON)
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(decoder) = args.decoder {
        config.decoder.strategy = decoder.into();
    }
    if let Some(padding) = args.padding {
        config.crop.padding = padding;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !is_image(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading image...");
    pb.set_position(10);
    let bytes = fs::read(&args.input)?;
    let pipeline = ReceiptPipeline::from_config(&config).map_err(stage_error)?;

    pb.set_message(format!("Decoding QR code ({})...", pipeline.decoder_name()));
    pb.set_position(25);
    let acquisition = pipeline.acquire(&bytes).await.map_err(stage_error)?;
    debug!("Decoded URL: {}", acquisition.url);

    if let Some(path) = &args.save_crop {
        match &acquisition.crop {
            Some(crop) => {
                crop.save(path)?;
                info!("Cropped QR region written to {}", path.display());
            }
            None => warn!(
                "The {} decoder does not crop; nothing written to {}",
                pipeline.decoder_name(),
                path.display()
            ),
        }
    }

    pb.set_message("Fetching invoice page...");
    pb.set_position(50);
    let html = pipeline.fetch(&acquisition.url).await.map_err(stage_error)?;

    if let Some(path) = &args.save_table {
        match first_table_html(&html) {
            Some(table) => {
                fs::write(path, table)?;
                info!("Invoice table written to {}", path.display());
            }
            None => warn!("No table found in invoice page"),
        }
    }

    pb.set_message("Extracting items...");
    pb.set_position(80);
    let extraction = pipeline.extract(&html);
    let report = pipeline.finish(acquisition.url, extraction, start);

    pb.set_position(100);
    pb.finish_with_message("Done");

    if !report.warnings.is_empty() {
        eprintln!("{}", style("Unparsable values (kept as NaN):").yellow());
        for warning in &report.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_report(&report, args.format, args.report)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_report(report: &ScanReport, format: OutputFormat, full: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if full => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.items)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ScanReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["title", "code", "qtd", "amountUnit", "amountTotal"])?;

    for item in &report.items {
        wtr.write_record([
            &item.title,
            &item.code,
            &item.qtd,
            &item.amount_unit,
            &item.amount_total,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ScanReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", report.source_url));
    output.push_str(&format!(
        "Items: {} ({} rows)\n\n",
        report.items.len(),
        report.row_count
    ));

    for item in &report.items {
        output.push_str(&format!("  {} [{}]\n", item.title, item.code));
        output.push_str(&format!(
            "    {} x {} = {}\n",
            item.qtd, item.amount_unit, item.amount_total
        ));
    }

    output
}
