use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use language_transfer_flashcards::config::{self, CliOverrides, ResolvedConfig, Settings};
use language_transfer_flashcards::extractors::youtube::YoutubeTranscriptSource;
use language_transfer_flashcards::llm::openai::OpenAi;
use language_transfer_flashcards::pipeline::{CsvOptions, FlashcardPipeline};
use language_transfer_flashcards::utils;
use language_transfer_flashcards::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "language_transfer_flashcards=debug"
    } else {
        "language_transfer_flashcards=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let env_file = match cli.env_file {
        Some(path) => path,
        None => config::default_env_file()?,
    };

    match cli.command {
        Commands::Csv {
            url,
            target_language,
            model,
            api_key,
            delimiter,
            exclude,
            output_dir,
        } => {
            let settings = Settings::load(&env_file)?;
            let overrides = CliOverrides {
                api_key,
                model_name: model,
                target_language,
            };

            // Everything that can be rejected locally is checked before any network call
            let resolved = ResolvedConfig::resolve(overrides, &settings)?;
            let options = CsvOptions {
                delimiter: utils::parse_delimiter(&delimiter)?,
                exclude,
                output_dir: output_directory(output_dir)?,
            };

            let llm = match &resolved.base_url {
                Some(base_url) => OpenAi::with_base_url(&resolved.api_key, &resolved.model_name, base_url)?,
                None => OpenAi::new(&resolved.api_key, &resolved.model_name)?,
            };
            println!("Using: {}\n", style(&resolved.model_name).green().bold());

            let pipeline = FlashcardPipeline::new(Box::new(YoutubeTranscriptSource::new()))?
                .with_progress(!cli.quiet);
            let path = pipeline
                .create_flashcards(&url, &resolved, &llm, &options)
                .await?;

            report_saved(&path);
        }
        Commands::Prompt {
            url,
            target_language,
            output_dir,
        } => {
            let settings = Settings::load(&env_file)?;
            let language = config::resolve_target_language(
                target_language.as_deref(),
                settings.target_language.as_deref(),
            )?;
            let output_dir = output_directory(output_dir)?;

            let pipeline = FlashcardPipeline::new(Box::new(YoutubeTranscriptSource::new()))?
                .with_progress(!cli.quiet);
            let path = pipeline.create_prompt(&url, language, &output_dir).await?;

            report_saved(&path);
        }
        Commands::EnvLocation => {
            println!("{}", config::env_information(&env_file));
        }
        Commands::EnvValues => {
            for (key, value) in config::read_env_entries(&env_file)? {
                println!("{}={}", key, value);
            }
        }
    }

    Ok(())
}

fn output_directory(requested: Option<PathBuf>) -> Result<PathBuf> {
    match requested {
        Some(dir) => {
            if !dir.is_dir() {
                anyhow::bail!("Output directory does not exist: {}", dir.display());
            }
            Ok(dir)
        }
        None => std::env::current_dir().context("Could not determine current directory"),
    }
}

fn report_saved(path: &Path) {
    println!("File saved at: \"{}\"", style(path.display()).green().bold());
}
