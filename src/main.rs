//! Quill CLI entry point.
//!
//! Provides `generate`, `classify`, `normalize`, and `check-config`
//! subcommands. Posts go to stdout; logs go to stderr (and optionally a
//! rotated JSON file).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use quill::analyzer::ContentAnalyzer;
use quill::config::{self, Config};
use quill::controller::GenerationController;
use quill::credentials::load_default_credentials;
use quill::generator::ProviderGenerator;
use quill::logging;
use quill::normalizer::TextNormalizer;
use quill::persona::{PersonaConfig, PostMode};
use quill::providers::router::build_provider;
use quill::publish::{DryRunPublisher, Publisher};

/// Quill: persona-driven short-post generator.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Config file (default: `$QUILL_CONFIG_PATH` or `~/.quill/quill.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs with daily rotation into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate posts for a topic.
    Generate {
        /// Topic or news headline to post about.
        #[arg(long)]
        topic: String,
        /// Use the longer summary mode.
        #[arg(long)]
        summary: bool,
        /// Number of posts to generate.
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Hand each post to the dry-run publisher.
        #[arg(long)]
        publish: bool,
    },
    /// Print the category and sentiment of a topic.
    Classify {
        /// Topic to classify.
        #[arg(long)]
        topic: String,
    },
    /// Normalize raw generator output and print the result.
    Normalize {
        /// Raw text.
        text: String,
    },
    /// Load config and persona, then print a summary.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _logging_guard = match &cli.log_dir {
        Some(dir) => Some(logging::init_production(dir)?),
        None => {
            logging::init_cli();
            None
        }
    };

    let config_path = config::resolve_config_path(cli.config.as_deref(), |key| {
        std::env::var(key).ok()
    })?;
    let config = config::load_or_default(&config_path, |key| std::env::var(key).ok())?;
    let persona = Arc::new(load_persona(&config)?);

    match cli.command {
        Command::Generate {
            topic,
            summary,
            count,
            publish,
        } => handle_generate(&config, persona, &topic, summary, count, publish).await,
        Command::Classify { topic } => {
            handle_classify(&persona, &topic);
            Ok(())
        }
        Command::Normalize { text } => handle_normalize(&config, &persona, &text),
        Command::CheckConfig => {
            handle_check_config(&config_path, &config, &persona);
            Ok(())
        }
    }
}

/// Load the configured persona, or the built-in one.
fn load_persona(config: &Config) -> anyhow::Result<PersonaConfig> {
    match &config.persona.path {
        Some(path) => PersonaConfig::load(path)
            .with_context(|| format!("failed to load persona at {}", path.display())),
        None => PersonaConfig::builtin().context("built-in persona is invalid"),
    }
}

/// Generate `count` posts and print one per line.
async fn handle_generate(
    config: &Config,
    persona: Arc<PersonaConfig>,
    topic: &str,
    summary: bool,
    count: u32,
    publish: bool,
) -> anyhow::Result<()> {
    let credentials = load_default_credentials()?;
    let provider = build_provider(&config.models.default, &config.models, &credentials)
        .with_context(|| format!("cannot use model '{}'", config.models.default))?;
    let generator = Arc::new(ProviderGenerator::new(
        provider,
        Duration::from_secs(config.generation.timeout_secs),
        config.generation.max_tokens,
    ));
    info!(model = %generator.model_id(), "generator ready");

    let mut controller = GenerationController::new(
        persona,
        generator,
        &config.generation,
        config.style.clone(),
    )?;
    if summary {
        controller.set_mode(PostMode::Summary);
    }

    let publisher = DryRunPublisher;
    for index in 0..count {
        let post = controller.generate_post(topic).await?;
        debug!(index, origin = ?post.origin, "post ready");
        println!("{}", post.text);
        if publish {
            let id = publisher.publish(&post.text).await?;
            info!(post_id = %id, "post published");
        }
    }
    Ok(())
}

fn handle_classify(persona: &PersonaConfig, topic: &str) {
    let analysis = ContentAnalyzer::with_lexicon(persona).analyze(topic);
    println!("category: {}", analysis.category);
    println!("sentiment: {}", analysis.sentiment);
}

fn handle_normalize(config: &Config, persona: &PersonaConfig, text: &str) -> anyhow::Result<()> {
    let normalizer = TextNormalizer::new(&persona.canonical, config.generation.terminal_mark)?;
    println!("{}", normalizer.normalize(text));
    Ok(())
}

fn handle_check_config(path: &Path, config: &Config, persona: &PersonaConfig) {
    let standard = persona.bounds(PostMode::Standard);
    let summary = persona.bounds(PostMode::Summary);
    println!("config: {}", path.display());
    println!("model: {}", config.models.default);
    println!("mode: {}", config.generation.mode);
    println!("max attempts: {}", config.generation.max_attempts);
    println!("timeout: {}s", config.generation.timeout_secs);
    println!("persona: {}", persona.name);
    println!("standard bounds: {}-{}", standard.min, standard.max);
    println!("summary bounds: {}-{}", summary.min, summary.max);
    println!(
        "pools: {} openers, {} fallbacks, {} canonical rules",
        persona.openers.len(),
        persona.fallbacks.len(),
        persona.canonical.len()
    );
}
