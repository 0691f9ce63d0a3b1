//! `mapt` — command-line front end for the assessment engine.
//!
//! Wires settings → rate governor → Gemini provider → lexical retriever →
//! pipeline, runs one assessment or a batch, and emits JSON with canonical
//! labels for downstream review.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mapt_core::{AssessmentOutcome, BatchItem, CanonicalLabel, Taxonomy, extract_labels};
use mapt_engine::{
    AssessmentPipeline, GeminiConfig, GeminiProvider, LexicalRetriever, PipelineConfig,
    RateGovernor,
};
use mapt_settings::{MaptSettings, resolve_settings};

#[derive(Debug, Parser)]
#[command(name = "mapt", about = "Retrieval-augmented personality assessment")]
struct Args {
    /// Optional settings file (JSON, deep-merged over defaults).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log governor state and layer transitions.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assess one subject's observations.
    Assess {
        /// Subject name, recorded in the output.
        #[arg(long)]
        name: String,

        /// Observation text.
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        observations: Option<String>,

        /// Read observation text from a file instead.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Reference material for context retrieval (plain text).
        #[arg(long)]
        reference: PathBuf,

        /// Write the JSON report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Assess a batch of subjects from a JSON file.
    Batch {
        /// JSON array of `{id, name, observations}` objects.
        #[arg(long)]
        input: PathBuf,

        /// Reference material for context retrieval (plain text).
        #[arg(long)]
        reference: PathBuf,

        /// Write the JSON report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Single-assessment report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessReport {
    name: String,
    generated_at: DateTime<Utc>,
    outcome: AssessmentOutcome,
    labels: Vec<CanonicalLabel>,
}

/// Batch report entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    id: String,
    name: String,
    outcome: AssessmentOutcome,
    labels: Vec<CanonicalLabel>,
}

/// Batch report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport {
    generated_at: DateTime<Utc>,
    results: Vec<BatchEntry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = resolve_settings(args.settings.as_deref());
    init_logging(&settings, args.verbose);

    match args.command {
        Command::Assess {
            name,
            observations,
            file,
            reference,
            output,
        } => {
            let observations = read_observations(observations, file.as_deref())?;
            let (pipeline, governor) = build_pipeline(&settings, &reference)?;

            info!(subject = %name, "assessing");
            let outcome = pipeline.assess(&observations).await;
            let labels = labels_for(&outcome, pipeline.taxonomy());
            let report = AssessReport {
                name,
                generated_at: Utc::now(),
                outcome,
                labels,
            };

            emit(&report, output.as_deref())?;
            let status = governor.status().await;
            debug!(?status, "governor state after run");
        }
        Command::Batch {
            input,
            reference,
            output,
        } => {
            let items = read_batch(&input)?;
            let (pipeline, governor) = build_pipeline(&settings, &reference)?;

            info!(subjects = items.len(), "assessing batch");
            let records = pipeline.assess_batch(&items).await;
            let results = records
                .into_iter()
                .map(|record| {
                    let labels = labels_for(&record.outcome, pipeline.taxonomy());
                    BatchEntry {
                        id: record.id,
                        name: record.name,
                        outcome: record.outcome,
                        labels,
                    }
                })
                .collect();
            let report = BatchReport {
                generated_at: Utc::now(),
                results,
            };

            emit(&report, output.as_deref())?;
            let status = governor.status().await;
            debug!(?status, "governor state after run");
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over settings; the
/// verbose flag wins over both.
fn init_logging(settings: &MaptSettings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Compose governor, provider, retriever, and pipeline from settings.
fn build_pipeline(
    settings: &MaptSettings,
    reference_path: &Path,
) -> Result<(AssessmentPipeline, Arc<RateGovernor>)> {
    let api_key = std::env::var(&settings.model.api_key_env).with_context(|| {
        format!(
            "API key not found: set the {} environment variable",
            settings.model.api_key_env
        )
    })?;

    let provider = GeminiProvider::new(GeminiConfig::from_settings(
        &settings.model,
        &settings.assessment,
        api_key,
    ))
    .context("failed to build Gemini provider")?;

    let reference = std::fs::read_to_string(reference_path).with_context(|| {
        format!("failed to read reference material {}", reference_path.display())
    })?;
    let retriever = LexicalRetriever::from_text(
        &reference,
        settings.retrieval.chunk_size,
        settings.retrieval.chunk_overlap,
    );
    info!(chunks = retriever.len(), "reference material indexed");

    let taxonomy = settings
        .taxonomy
        .as_ref()
        .map_or_else(Taxonomy::default, |qualities| Taxonomy::new(qualities.clone()));

    let governor = Arc::new(RateGovernor::new(&settings.rate));
    let pipeline = AssessmentPipeline::new(
        Arc::new(provider),
        Arc::clone(&governor),
        Arc::new(taxonomy),
        PipelineConfig::from_settings(settings),
    )
    .with_retriever(Arc::new(retriever));

    Ok((pipeline, governor))
}

/// Observation text from the flag or a file (exactly one is present).
fn read_observations(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    let text = match (inline, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read observations file {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --observations or --file"),
    };
    anyhow::ensure!(!text.trim().is_empty(), "observations are empty");
    Ok(text)
}

/// Parse the batch input file.
fn read_batch(path: &Path) -> Result<Vec<BatchItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch input {}", path.display()))?;
    let items: Vec<BatchItem> =
        serde_json::from_str(&raw).context("batch input must be a JSON array of items")?;
    anyhow::ensure!(!items.is_empty(), "batch input contains no items");
    Ok(items)
}

/// Canonical labels for successful outcomes; empty otherwise.
fn labels_for(outcome: &AssessmentOutcome, taxonomy: &Taxonomy) -> Vec<CanonicalLabel> {
    outcome
        .as_result()
        .map(|result| extract_labels(result, taxonomy))
        .unwrap_or_default()
}

/// Pretty-print a report to stdout or write it to a file.
fn emit<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to encode report")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_observations_win() {
        let text = read_observations(Some("observed things".into()), None).unwrap();
        assert_eq!(text, "observed things");
    }

    #[test]
    fn observations_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from the file").unwrap();
        let text = read_observations(None, Some(file.path())).unwrap();
        assert_eq!(text, "from the file");
    }

    #[test]
    fn blank_observations_rejected() {
        assert!(read_observations(Some("   ".into()), None).is_err());
    }

    #[test]
    fn batch_file_parses_items() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"s1","name":"Rahul","observations":"helped peers"}}]"#
        )
        .unwrap();
        let items = read_batch(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Rahul");
    }

    #[test]
    fn empty_batch_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(read_batch(file.path()).is_err());
    }

    #[test]
    fn cli_parses_assess_command() {
        let args = Args::parse_from([
            "mapt",
            "assess",
            "--name",
            "Rahul",
            "--observations",
            "led the group",
            "--reference",
            "ref.txt",
        ]);
        assert!(matches!(args.command, Command::Assess { .. }));
    }

    #[test]
    fn cli_rejects_conflicting_observation_sources() {
        let parsed = Args::try_parse_from([
            "mapt",
            "assess",
            "--name",
            "Rahul",
            "--observations",
            "text",
            "--file",
            "obs.txt",
            "--reference",
            "ref.txt",
        ]);
        assert!(parsed.is_err());
    }
}
