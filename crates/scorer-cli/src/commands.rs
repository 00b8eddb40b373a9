//! Command implementations for the label scorer.
//!
//! Every invocation loads settings, restores the last snapshot (or embeds the
//! configured labels from scratch), runs one command, and saves the snapshot
//! again if the command changed anything.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use scorer_core::{LabelScore, Scorer, ScorerSnapshot, Settings};
use scorer_embeddings::{CandleEmbedder, EmbedderRegistry};

use crate::cli::{Cli, Commands};

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings)?;

    let registry = EmbedderRegistry::candle(settings.expanded_model_cache_dir());
    let scorer = open_scorer(&settings, &registry)?;

    match cli.command {
        Commands::Predict { text, top, json } => {
            let scores = scorer.predict(&text).context("Prediction failed")?;
            if json {
                let shown: Vec<&LabelScore> =
                    scores.iter().take(top.unwrap_or(usize::MAX)).collect();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if scores.is_empty() {
                println!("No labels configured");
            } else {
                print!("{}", format_scores(&scores, top));
            }
        }
        Commands::Update { label, description } => {
            let outcome = scorer
                .update_descriptions(&label, &description)
                .with_context(|| format!("Failed to update label '{}'", label))?;
            save_snapshot(&scorer, &settings)?;

            if outcome.created {
                println!("Created label '{}'", outcome.label);
            }
            for evicted in &outcome.evicted {
                println!("Evicted '{}'", evicted);
            }
            println!("'{}' now has {} descriptions", outcome.label, outcome.len);
        }
        Commands::Create { label } => {
            if scorer.create_label(&label)? {
                save_snapshot(&scorer, &settings)?;
                println!("Created label '{}'", label);
            } else {
                println!("Label '{}' already exists", label);
            }
        }
        Commands::Show { label } => {
            let set = scorer.descriptions(&label)?;
            println!("{} ({} descriptions)", set.label(), set.len());
            for (i, description) in set.descriptions().iter().enumerate() {
                println!("  {:>2}. {}", i, description);
            }
        }
        Commands::Labels => {
            for label in scorer.labels()? {
                println!("{}", label);
            }
        }
    }

    Ok(())
}

/// Load settings and apply CLI overrides (highest precedence).
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(snapshot) = &cli.snapshot {
        settings.snapshot_path = snapshot.clone();
    }
    Ok(settings)
}

fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the scorer, preferring a valid snapshot over re-embedding.
fn open_scorer(
    settings: &Settings,
    registry: &EmbedderRegistry<CandleEmbedder>,
) -> Result<Scorer<CandleEmbedder>> {
    let embedder: Arc<CandleEmbedder> = registry
        .get_or_load(&settings.scorer.model)
        .with_context(|| format!("Failed to load model '{}'", settings.scorer.model))?;

    let scorer = Scorer::new(settings.label_map(), embedder, settings.scorer.clone())?;

    let path = settings.expanded_snapshot_path();
    let restored = match ScorerSnapshot::load(&path)
        .with_context(|| format!("Failed to read snapshot {:?}", path))?
    {
        Some(snapshot) => scorer.restore(&snapshot)?,
        None => false,
    };

    if restored {
        debug!(path = ?path, "Using snapshot");
    } else {
        info!("Embedding configured labels");
        scorer
            .initialize_vectors()
            .context("Failed to embed configured labels")?;
        save_snapshot(&scorer, settings)?;
    }

    Ok(scorer)
}

fn save_snapshot(scorer: &Scorer<CandleEmbedder>, settings: &Settings) -> Result<()> {
    let path = settings.expanded_snapshot_path();
    scorer
        .snapshot()?
        .save(&path)
        .with_context(|| format!("Failed to write snapshot {:?}", path))
}

/// Render scores as an aligned two-column table, best first.
pub fn format_scores(scores: &[LabelScore], top: Option<usize>) -> String {
    let shown = &scores[..top.unwrap_or(scores.len()).min(scores.len())];
    let width = shown.iter().map(|s| s.label.len()).max().unwrap_or(0);

    shown
        .iter()
        .map(|s| format!("{:<width$}  {:>7.4}\n", s.label, s.score, width = width))
        .collect()
}
