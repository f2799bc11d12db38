//! Convert command - turn a single DANFE PDF into a spreadsheet.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use danfe_core::{
    convert_pdf, format_localized_amount, Conversion, DanfeConfig, DanfeError, ExtractionError,
    InvoiceHeader, LineItem,
};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input PDF (auto-detected in the current directory when omitted)
    input: Option<PathBuf>,

    /// Output file (default: <input stem>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Styled two-sheet spreadsheet
    Xlsx,
    /// Header, items and totals as JSON
    Json,
    /// One CSV row per line item
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let input = match args.input {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            path
        }
        None => detect_input()?,
    };

    let output = args.output.unwrap_or_else(|| default_output(&input, args.format));

    info!("Converting {}", input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Reading {}...", file_name(&input)));

    let conversion = match convert_file(&input, &config) {
        Ok(conversion) => conversion,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Writing output...");
    write_output(&conversion, args.format, &output)?;
    pb.finish_and_clear();

    for warning in &conversion.extraction.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    print_summary(&conversion);
    println!(
        "{} Output written to {}",
        style("✓").green(),
        output.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read and convert one PDF, turning an empty item list into a readable error.
pub fn convert_file(path: &Path, config: &DanfeConfig) -> anyhow::Result<Conversion> {
    let data = fs::read(path)?;
    match convert_pdf(&data, config) {
        Ok(conversion) => Ok(conversion),
        Err(DanfeError::Extraction(ExtractionError::NoItems)) => anyhow::bail!(
            "No items found in {}. Check that it is a valid DANFE.",
            path.display()
        ),
        Err(e) => Err(e.into()),
    }
}

/// Write a conversion in the requested format.
pub fn write_output(
    conversion: &Conversion,
    format: OutputFormat,
    path: &Path,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Xlsx => conversion.report.save(path)?,
        OutputFormat::Json => fs::write(path, format_json(conversion)?)?,
        OutputFormat::Csv => fs::write(path, format_csv(&conversion.extraction.invoice.items)?)?,
    }
    debug!("Wrote output to {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    header: &'a InvoiceHeader,
    items: &'a [LineItem],
    total_quantity: f64,
    total_net: f64,
    warnings: &'a [String],
}

fn format_json(conversion: &Conversion) -> anyhow::Result<String> {
    let invoice = &conversion.extraction.invoice;
    let output = JsonOutput {
        header: &invoice.header,
        items: &invoice.items,
        total_quantity: conversion.total_quantity,
        total_net: conversion.total_net,
        warnings: &conversion.extraction.warnings,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn format_csv(items: &[LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for item in items {
        wtr.serialize(item)?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn print_summary(conversion: &Conversion) {
    let header = &conversion.extraction.invoice.header;
    let rule = "─".repeat(50);

    println!("{}", rule);
    println!("  NF-e Nº:       {}", header.invoice_number);
    println!("  Emissão:       {}", header.issue_date);
    println!("  Itens:         {}", conversion.item_count());
    println!(
        "  Total Qtde:    {}",
        format_localized_amount(conversion.total_quantity, 2)
    );
    println!(
        "  Valor Total:   R$ {}",
        format_localized_amount(conversion.total_net, 2)
    );
    println!("{}", rule);
}

fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("nfe");
    PathBuf::from(format!("{}.{}", stem, format.extension()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// PDFs in the current directory, sorted by name.
fn find_pdfs() -> anyhow::Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for pattern in ["*.pdf", "*.PDF"] {
        pdfs.extend(glob(pattern)?.filter_map(|r| r.ok()));
    }
    pdfs.sort();
    pdfs.dedup();
    Ok(pdfs)
}

fn detect_input() -> anyhow::Result<PathBuf> {
    let mut pdfs = find_pdfs()?;
    match pdfs.len() {
        0 => anyhow::bail!(
            "No PDF files found in the current directory. Pass a path or run from the PDF's folder."
        ),
        1 => {
            let path = pdfs.swap_remove(0);
            println!(
                "{} Detected PDF: {}",
                style("ℹ").blue(),
                file_name(&path)
            );
            Ok(path)
        }
        _ => {
            let stdin = io::stdin();
            choose_pdf(&pdfs, &mut stdin.lock())
        }
    }
}

/// Ask for a 1-based choice until a valid number is entered.
fn choose_pdf(pdfs: &[PathBuf], input: &mut impl BufRead) -> anyhow::Result<PathBuf> {
    println!("{} Several PDFs found. Choose one:", style("ℹ").blue());
    println!();
    for (i, path) in pdfs.iter().enumerate() {
        println!("   {}. {}", i + 1, file_name(path));
    }
    println!();

    loop {
        print!("Enter the number: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("No file selected");
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=pdfs.len()).contains(&n) => return Ok(pdfs[n - 1].clone()),
            Ok(_) => println!("   Invalid number, try again."),
            Err(_) => println!("   Enter the number only."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn candidates() -> Vec<PathBuf> {
        vec![PathBuf::from("a.pdf"), PathBuf::from("b.PDF")]
    }

    #[test]
    fn test_choose_pdf_retries_until_valid() {
        let mut input = Cursor::new("x\n7\n2\n");
        let chosen = choose_pdf(&candidates(), &mut input).unwrap();
        assert_eq!(chosen, PathBuf::from("b.PDF"));
    }

    #[test]
    fn test_choose_pdf_eof() {
        let mut input = Cursor::new("");
        assert!(choose_pdf(&candidates(), &mut input).is_err());
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/data/NF 45210.pdf"), OutputFormat::Xlsx),
            PathBuf::from("NF 45210.xlsx")
        );
        assert_eq!(
            default_output(Path::new("nota.PDF"), OutputFormat::Csv),
            PathBuf::from("nota.csv")
        );
    }
}
