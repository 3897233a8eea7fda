//! Sommelier CLI entry point.
//!
//! Provides `serve`, `quiz`, and `prompt` subcommands for running the HTTP
//! API, taking the quiz in the terminal, or printing the prompt a profile
//! would produce.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use tracing::info;

use sommelier::api::{self, ApiState};
use sommelier::config::{load_effective_config, runtime_paths, Config};
use sommelier::credentials::load_runtime_credentials;
use sommelier::profile::{ProfileDraft, ProfileField};
use sommelier::prompt::build_prompt;
use sommelier::providers::factory::build_provider;
use sommelier::quiz::{optional_question, QuizSession};
use sommelier::recommend::RecommendationService;

/// Sommelier: wine recommendations from a five-question quiz.
#[derive(Parser)]
#[command(name = "sommelier", version, about)]
struct Cli {
    /// Config file to use instead of `~/.sommelier/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Address to listen on, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Take the quiz interactively and print the recommendation.
    Quiz,
    /// Print the prompt built from the given answers without calling a provider.
    Prompt {
        /// Fruity, Dry, or Sweet.
        #[arg(long)]
        flavor: String,
        /// Red, White, Rosé, or Sparkling.
        #[arg(long = "type")]
        wine_type: String,
        /// Meal or "solo".
        #[arg(long, default_value = "")]
        occasion: String,
        /// Under €15, €15–30, or €30+ (also under-15, 15-30, 30-plus).
        #[arg(long)]
        budget: String,
        /// Light, Medium, or Bold.
        #[arg(long)]
        boldness: String,
        /// Country, optional.
        #[arg(long, default_value = "")]
        country: String,
        /// City, optional.
        #[arg(long, default_value = "")]
        city: String,
        /// Anything else worth knowing, optional.
        #[arg(long, default_value = "")]
        extra: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Serve { bind } => handle_serve(config_path, bind).await,
        Command::Quiz => handle_quiz(config_path).await,
        Command::Prompt {
            flavor,
            wine_type,
            occasion,
            budget,
            boldness,
            country,
            city,
            extra,
        } => {
            sommelier::logging::init_cli();
            let draft = ProfileDraft {
                flavor,
                wine_type,
                occasion,
                budget,
                boldness,
                country,
                city,
                extra_preferences: extra,
            };
            handle_prompt(&draft)
        }
    }
}

/// Run the HTTP API until Ctrl-C.
async fn handle_serve(config_path: Option<&Path>, bind: Option<String>) -> anyhow::Result<()> {
    let paths = runtime_paths()?;
    let _logging_guard = sommelier::logging::init_production(&paths.logs_dir)?;

    let config = load_effective_config(config_path).context("failed to load configuration")?;
    let service = build_service(&config)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    info!(version = env!("CARGO_PKG_VERSION"), "sommelier starting");
    api::serve(
        &bind,
        ApiState {
            service: Arc::new(service),
        },
    )
    .await
}

/// Walk through the quiz with terminal prompts.
async fn handle_quiz(config_path: Option<&Path>) -> anyhow::Result<()> {
    sommelier::logging::init_cli();

    let config = load_effective_config(config_path).context("failed to load configuration")?;
    let service = build_service(&config)?;

    let mut session = QuizSession::new();
    while let Some(field) = session.state().field() {
        let question = session.state().question().unwrap_or_default();
        let options = session.state().options();

        let answer = if options.is_empty() {
            Input::<String>::new()
                .with_prompt(question)
                .allow_empty(true)
                .interact_text()?
        } else {
            let index = Select::new()
                .with_prompt(question)
                .items(&options)
                .default(0)
                .interact()?;
            options
                .get(index)
                .cloned()
                .with_context(|| format!("no option at index {index} for {field}"))?
        };
        session.record(&answer)?;
    }

    if let Some(intro) = session.state().question() {
        println!("{intro}");
    }
    for field in [
        ProfileField::Country,
        ProfileField::City,
        ProfileField::ExtraPreferences,
    ] {
        let value = Input::<String>::new()
            .with_prompt(optional_question(field).unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        session.set_optional(field, &value)?;
    }

    eprintln!("Finding your wine...");
    let markup = session.submit(&service).await?;
    println!("{markup}");
    Ok(())
}

/// Print the prompt for a profile given on the command line.
fn handle_prompt(draft: &ProfileDraft) -> anyhow::Result<()> {
    let profile = draft.freeze()?;
    print!("{}", build_prompt(&profile));
    Ok(())
}

fn build_service(config: &Config) -> anyhow::Result<RecommendationService> {
    let paths = runtime_paths()?;
    let credentials = load_runtime_credentials(&paths)
        .with_context(|| format!("failed to load {}", paths.env_file.display()))?;
    let provider =
        build_provider(&config.provider, &credentials).context("failed to create provider")?;
    Ok(RecommendationService::new(provider, config.provider.timeout()))
}
