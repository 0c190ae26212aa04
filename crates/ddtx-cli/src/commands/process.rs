//! Process command - extract fields from a single token file.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use ddtx_core::{AddressResolution, Document, DocumentExtractor};

use super::{load_config, read_source};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input token file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show how the delivery address was resolved
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV item table
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let source = read_source(&args.input)?;
    let extractor = DocumentExtractor::new(config);
    let document = extractor.extract(&source)?;

    let output = format_document(&document, args.format)?;

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

    if args.show_confidence {
        println!();
        println!(
            "{} Delivery address: {}",
            style("ℹ").blue(),
            describe_resolution(&document.metadata.address_resolution)
        );
        if document.metadata.needs_review {
            println!("{} Document needs review", style("!").yellow());
        }
    }

    for warning in &document.metadata.warnings {
        eprintln!("{} {}", style("warning:").yellow(), warning);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_document(document: &Document, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Csv => format_csv(document),
        OutputFormat::Text => Ok(format_text(document)?),
    }
}

fn describe_resolution(resolution: &AddressResolution) -> String {
    match resolution {
        AddressResolution::Strategy { method, confidence } => {
            format!("{} ({:.0}%)", method, confidence * 100.0)
        }
        AddressResolution::Merged { confidence, sources } => {
            let sources: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
            format!("merged from {} ({:.0}%)", sources.join(", "), confidence * 100.0)
        }
        AddressResolution::TemplateLayout => "template layout".to_string(),
        AddressResolution::Undetermined => "not determined".to_string(),
    }
}

fn format_csv(document: &Document) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "document_number", "code", "description", "unit", "quantity", "unit_price",
        "discount_percent", "vat_rate", "total",
    ])?;

    for item in &document.items {
        let discount = item.discount_percent.map(|d| d.to_string()).unwrap_or_default();
        wtr.write_record([
            &document.document_number,
            &item.code,
            &item.description,
            &item.unit,
            &item.quantity.to_string(),
            &item.unit_price.to_string(),
            &discount,
            &item.vat_rate.to_string(),
            &item.total.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(document: &Document) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "{:?} {} del {}", document.document_type, document.document_number, document.date)?;
    writeln!(out, "Client:   {} [{}]", document.client_name, document.client_code)?;
    if let Some(vat_number) = &document.vat_number {
        writeln!(out, "P.IVA:    {}", vat_number)?;
    }
    writeln!(out, "Delivery: {}", document.delivery_address)?;
    if let Some(reference) = &document.order_reference {
        match &document.order_date {
            Some(date) => writeln!(out, "Order:    {} del {}", reference, date)?,
            None => writeln!(out, "Order:    {}", reference)?,
        }
    }

    writeln!(out)?;
    for item in &document.items {
        writeln!(
            out,
            "{:<10} {:<30} {:>4} {:>8} x {:>10} = {:>10} ({}%)",
            item.code, item.description, item.unit, item.quantity, item.unit_price, item.total,
            item.vat_rate
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Subtotal: {}", document.subtotal)?;
    writeln!(out, "VAT:      {}", document.vat)?;
    writeln!(out, "Total:    {}", document.total)?;
    Ok(out)
}
