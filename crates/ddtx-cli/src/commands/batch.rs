//! Batch command: extract many token files concurrently.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use ddtx_core::{Document, DocumentExtractor};

use super::process::{format_document, OutputFormat};
use super::{load_config, read_source};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching token files (e.g. "dumps/*.json")
    #[arg(required = true)]
    input: String,

    /// Directory receiving one output file per input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Format of each output file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write summary.csv next to the outputs
    #[arg(long)]
    summary: bool,

    /// Documents extracted at the same time
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Keep going when a file fails
    #[arg(long)]
    continue_on_error: bool,
}

/// What happened to one input file.
struct Outcome {
    path: PathBuf,
    result: Result<Document, String>,
    elapsed: Duration,
}

impl Outcome {
    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let extractor = Arc::new(DocumentExtractor::new(load_config(config_path)?));

    let files = collect_inputs(&args.input)?;
    println!("{} {} token files", style("ℹ").blue(), files.len());

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    let outcomes =
        extract_all(files, extractor, args.jobs, args.continue_on_error, &progress).await?;
    progress.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, &outcomes, args.format)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join("summary.csv");
        write_summary(&summary_path, &outcomes)?;
        println!("{} Summary: {}", style("✓").green(), summary_path.display());
    }

    report(&outcomes, start.elapsed());
    Ok(())
}

fn collect_inputs(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No token files match {}", pattern);
    }
    files.sort();
    Ok(files)
}

/// Fan the files out over blocking workers, at most `jobs` at a time.
///
/// Progress advances as each file completes. Outcomes come back in input order.
async fn extract_all(
    files: Vec<PathBuf>,
    extractor: Arc<DocumentExtractor>,
    jobs: usize,
    continue_on_error: bool,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<Outcome>> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permits = permits.clone();
        let extractor = extractor.clone();

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let outcome =
                tokio::task::spawn_blocking(move || extract_one(path, &extractor)).await?;
            anyhow::Ok((index, outcome))
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined??;
        progress.set_message(outcome.file_name().to_string());
        progress.inc(1);

        if let Err(message) = &outcome.result {
            if !continue_on_error {
                error!("{}: {}", outcome.path.display(), message);
                tasks.abort_all();
                progress.abandon();
                anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), message);
            }
            warn!("{}: {}", outcome.path.display(), message);
        }
        outcomes.push((index, outcome));
    }

    outcomes.sort_by_key(|(index, _)| *index);
    Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
}

fn extract_one(path: PathBuf, extractor: &DocumentExtractor) -> Outcome {
    let started = Instant::now();
    let result = read_source(&path)
        .and_then(|source| Ok(extractor.extract(&source)?))
        .map_err(|e| e.to_string());
    Outcome {
        path,
        result,
        elapsed: started.elapsed(),
    }
}

fn write_outputs(output_dir: &Path, outcomes: &[Outcome], format: OutputFormat) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)?;

    for outcome in outcomes {
        let Ok(document) = &outcome.result else {
            continue;
        };
        let stem = outcome
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let target = output_dir.join(format!("{}.{}", stem, format.extension()));

        fs::write(&target, format_document(document, format)?)?;
        debug!("Wrote {}", target.display());
    }
    Ok(())
}

fn write_summary(path: &Path, outcomes: &[Outcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "document_number",
        "date",
        "client_name",
        "delivery_address",
        "address_resolution",
        "items",
        "total",
        "needs_review",
        "elapsed_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let elapsed_ms = outcome.elapsed.as_millis().to_string();
        let row = match &outcome.result {
            Ok(document) => [
                outcome.file_name().to_string(),
                "ok".to_string(),
                document.document_number.clone(),
                document.date.clone(),
                document.client_name.clone(),
                document.delivery_address.clone(),
                serde_json::to_value(&document.metadata.address_resolution)?["kind"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                document.items.len().to_string(),
                document.total.to_string(),
                document.metadata.needs_review.to_string(),
                elapsed_ms,
                String::new(),
            ],
            Err(message) => {
                let mut row: [String; 12] = Default::default();
                row[0] = outcome.file_name().to_string();
                row[1] = "error".to_string();
                row[10] = elapsed_ms;
                row[11] = message.clone();
                row
            }
        };
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn report(outcomes: &[Outcome], elapsed: Duration) {
    let failed: Vec<&Outcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    let review = outcomes
        .iter()
        .filter(|o| matches!(&o.result, Ok(d) if d.metadata.needs_review))
        .count();

    println!(
        "{} {} files in {:.2?}: {} successful, {} failed, {} to review",
        style("✓").green(),
        outcomes.len(),
        elapsed,
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red(),
        style(review).yellow()
    );

    for outcome in failed {
        if let Err(message) = &outcome.result {
            println!("  {} {}: {}", style("✗").red(), outcome.path.display(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token(text: &str, x: f32, y: f32) -> String {
        format!(
            r#"{{"text": "{}", "x": {}, "y": {}, "width": {}}}"#,
            text,
            x,
            y,
            text.len() as f32 * 6.0
        )
    }

    fn write_tokens(dir: &Path, name: &str, tokens: &[String]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!(r#"{{"pages": [[{}]]}}"#, tokens.join(", "))).unwrap();
        path
    }

    fn delivery_note() -> Vec<String> {
        vec![
            token("Cliente", 50.0, 820.0),
            token("Luogo di consegna", 320.0, 820.0),
            token("4681 21/05/25 1 5712", 50.0, 800.0),
            token("DONAC S.R.L.", 50.0, 740.0),
            token("DONAC S.R.L.", 320.0, 740.0),
            token("VIA ROMA 12", 50.0, 720.0),
            token("VIA SALUZZO 10", 320.0, 720.0),
            token("10100 TORINO TO", 50.0, 700.0),
            token("12030 MONASTEROLO DI SAVIGLIANO CN", 320.0, 700.0),
            token("090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04", 20.0, 500.0),
            token("TOTALE DOCUMENTO", 300.0, 100.0),
            token("1.150,24", 480.0, 100.0),
        ]
    }

    fn noise() -> Vec<String> {
        vec![token("LOREM IPSUM", 50.0, 800.0)]
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order_and_tick_per_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_tokens(dir.path(), "a.json", &delivery_note()),
            write_tokens(dir.path(), "b.json", &noise()),
            write_tokens(dir.path(), "c.json", &delivery_note()),
        ];
        let progress = ProgressBar::hidden();

        let outcomes = extract_all(
            files.clone(),
            Arc::new(DocumentExtractor::default()),
            2,
            true,
            &progress,
        )
        .await
        .unwrap();

        let paths: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(paths, files);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
        assert_eq!(progress.position(), 3);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_batch() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_tokens(dir.path(), "broken.json", &noise())];

        let err = extract_all(
            files,
            Arc::new(DocumentExtractor::default()),
            1,
            false,
            &ProgressBar::hidden(),
        )
        .await
        .err()
        .unwrap();
        assert!(err.to_string().contains("broken.json"));
    }
}
