use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ltf",
    about = "Language Transfer Flashcards - create vocabulary flashcards from YouTube lessons",
    version,
    long_about = "Downloads the transcript of a Language Transfer YouTube video, asks an OpenAI model to extract every word and sentence taught in it, and saves them as a CSV file ready for import into your flashcard app."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file to use instead of ~/.ltf/.env
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create flashcards from Language-Transfer YouTube videos in CSV format
    Csv {
        /// YouTube video url, e.g. "https://www.youtube.com/watch?v=VIDEO_ID"
        #[arg(value_name = "URL")]
        url: String,

        /// Target language taught in the video. If omitted, TARGET_LANGUAGE from the .env file is used
        #[arg(short = 'l', long, value_name = "LANGUAGE")]
        target_language: Option<String>,

        /// OpenAI model name. If omitted, OPENAI_MODEL_NAME from the .env file is used, falling back to gpt-4o
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// OpenAI API key. If omitted, OPENAI_API_KEY from the .env file is used
        #[arg(short = 'k', long, value_name = "KEY")]
        api_key: Option<String>,

        /// Delimiter to use in the CSV file
        #[arg(short, long, default_value = ",")]
        delimiter: String,

        /// Directory containing CSV files with words and sentences to exclude
        #[arg(short, long, value_name = "DIR")]
        exclude: Option<PathBuf>,

        /// Directory to write the CSV file to (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Create and save the prompt with the YouTube transcript to use with your favorite LLM
    Prompt {
        /// YouTube video url, e.g. "https://www.youtube.com/watch?v=VIDEO_ID"
        #[arg(value_name = "URL")]
        url: String,

        /// Target language taught in the video. If omitted, TARGET_LANGUAGE from the .env file is used
        #[arg(short = 'l', long, value_name = "LANGUAGE")]
        target_language: Option<String>,

        /// Directory to write the prompt file to (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show location of your .env file
    EnvLocation,

    /// Show current values of your .env file
    EnvValues,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_csv_command() {
        let cli = Cli::try_parse_from([
            "ltf", "csv", "https://www.youtube.com/watch?v=jIhkYHycv4M", "-l", "Swahili", "-m", "gpt-4o", "-d", ";",
            "-e", "previous",
        ])
        .unwrap();

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
                assert_eq!(url, "https://www.youtube.com/watch?v=jIhkYHycv4M");
                assert_eq!(target_language.as_deref(), Some("Swahili"));
                assert_eq!(model.as_deref(), Some("gpt-4o"));
                assert_eq!(api_key, None);
                assert_eq!(delimiter, ";");
                assert_eq!(exclude, Some(PathBuf::from("previous")));
                assert_eq!(output_dir, None);
            }
            _ => panic!("expected csv command"),
        }
    }

    #[test]
    fn test_csv_delimiter_defaults_to_comma() {
        let cli = Cli::try_parse_from(["ltf", "csv", "jIhkYHycv4M"]).unwrap();
        assert!(matches!(cli.command, Commands::Csv { ref delimiter, .. } if delimiter == ","));
    }

    #[test]
    fn test_global_env_file_flag() {
        let cli = Cli::try_parse_from(["ltf", "env-values", "--env-file", "/tmp/custom.env"]).unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("/tmp/custom.env")));
        assert!(matches!(cli.command, Commands::EnvValues));
    }
}
