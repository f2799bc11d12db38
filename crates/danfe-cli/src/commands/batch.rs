//! `danfe batch` - convert every PDF matched by a glob.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, warn};

use danfe_core::{format_localized_amount, Conversion, DanfeConfig};

use super::convert::{convert_file, write_output, OutputFormat};

#[derive(Args)]
pub struct BatchArgs {
    /// Glob selecting the PDFs, e.g. "notas/*.pdf"
    #[arg(required = true)]
    pattern: String,

    /// Directory for the outputs (default: beside each PDF)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Format written for every PDF
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Write summary.csv with one row per PDF
    #[arg(long)]
    summary: bool,

    /// Keep going after a PDF fails
    #[arg(long)]
    continue_on_error: bool,
}

enum Outcome {
    Converted {
        output: PathBuf,
        conversion: Box<Conversion>,
    },
    Failed(String),
}

struct FileReport {
    input: PathBuf,
    outcome: Outcome,
    elapsed: Duration,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'static str,
    invoice_number: &'a str,
    issue_date: &'a str,
    items: Option<usize>,
    total_quantity: Option<f64>,
    total_net: Option<f64>,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = super::load_config(config_path)?;

    let inputs = matching_pdfs(&args.pattern)?;
    if inputs.is_empty() {
        anyhow::bail!("No PDF files found for pattern: {}", args.pattern);
    }
    println!("{} {} PDFs matched", style("ℹ").blue(), inputs.len());

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let bar = ProgressBar::new(inputs.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(inputs.len());
    for input in inputs {
        bar.set_message(input.display().to_string());
        let file_started = Instant::now();
        let output = output_path(&input, args.output_dir.as_deref(), args.format);

        let outcome = match convert_to(&input, &output, args.format, &config) {
            Ok(conversion) => Outcome::Converted {
                output,
                conversion: Box::new(conversion),
            },
            Err(e) if args.continue_on_error => {
                warn!("{}: {}", input.display(), e);
                Outcome::Failed(e.to_string())
            }
            Err(e) => {
                bar.abandon();
                error!("{}: {}", input.display(), e);
                anyhow::bail!("Conversion failed for {}: {}", input.display(), e);
            }
        };

        reports.push(FileReport {
            input,
            outcome,
            elapsed: file_started.elapsed(),
        });
        bar.inc(1);
    }
    bar.finish_and_clear();

    if args.summary {
        let path = args
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join("summary.csv");
        write_summary(&path, &reports)?;
        println!("{} Summary written to {}", style("✓").green(), path.display());
    }

    print_report(&reports, started.elapsed());
    Ok(())
}

fn matching_pdfs(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let is_pdf = |p: &PathBuf| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    };
    Ok(glob::glob(pattern)?.flatten().filter(is_pdf).collect())
}

fn convert_to(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &DanfeConfig,
) -> anyhow::Result<Conversion> {
    let conversion = convert_file(input, config)?;
    write_output(&conversion, format, output)?;
    Ok(conversion)
}

fn output_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let beside_input = input.with_extension(format.extension());
    match (output_dir, beside_input.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => beside_input,
    }
}

fn print_report(reports: &[FileReport], elapsed: Duration) {
    let failures = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
        .count();

    println!();
    println!(
        "{} {} PDFs in {:.1?}: {} converted, {} failed",
        style("✓").green(),
        reports.len(),
        elapsed,
        style(reports.len() - failures).green(),
        style(failures).red()
    );

    for report in reports {
        if let Outcome::Converted { output, conversion } = &report.outcome {
            println!(
                "   {} -> {} ({} itens, R$ {})",
                report.input.display(),
                output.display(),
                conversion.item_count(),
                format_localized_amount(conversion.total_net, 2)
            );
        }
    }

    if failures > 0 {
        println!();
        println!("{}", style("Failed files:").red());
        for report in reports {
            if let Outcome::Failed(reason) = &report.outcome {
                println!("  - {}: {}", report.input.display(), reason);
            }
        }
    }
}

fn write_summary(path: &Path, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for report in reports {
        let filename = report
            .input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processing_time_ms = report.elapsed.as_millis() as u64;

        let row = match &report.outcome {
            Outcome::Converted { conversion, .. } => {
                let header = &conversion.extraction.invoice.header;
                SummaryRow {
                    filename,
                    status: "success",
                    invoice_number: &header.invoice_number,
                    issue_date: &header.issue_date,
                    items: Some(conversion.item_count()),
                    total_quantity: Some(conversion.total_quantity),
                    total_net: Some(conversion.total_net),
                    processing_time_ms,
                    error: "",
                }
            }
            Outcome::Failed(reason) => SummaryRow {
                filename,
                status: "error",
                invoice_number: "",
                issue_date: "",
                items: None,
                total_quantity: None,
                total_net: None,
                processing_time_ms,
                error: reason,
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("in/nota.pdf"), None, OutputFormat::Xlsx),
            PathBuf::from("in/nota.xlsx")
        );
        assert_eq!(
            output_path(Path::new("in/nota.PDF"), Some(Path::new("out")), OutputFormat::Json),
            PathBuf::from("out/nota.json")
        );
    }

    #[test]
    fn test_summary_for_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let reports = vec![FileReport {
            input: PathBuf::from("x/a.pdf"),
            outcome: Outcome::Failed("bad".to_string()),
            elapsed: Duration::from_millis(3),
        }];

        write_summary(&path, &reports).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("filename,status,invoice_number,issue_date,items,total_quantity,total_net,processing_time_ms,error")
        );
        assert_eq!(lines.next(), Some("a.pdf,error,,,,,,3,bad"));
    }
}
