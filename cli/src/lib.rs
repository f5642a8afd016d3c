use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deckgen_common::{file_utils, DeckConfig, Topic};
use deckgen_core::{DeckError, ErrorReporter, Pipeline, RunOutput};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deckgen")]
#[command(about = "Research a topic and turn it into a slide deck")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Presentation topic. Prompted for when omitted.
    pub topic: Option<String>,

    #[command(flatten)]
    pub options: GenerateOptions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a presentation about a topic
    Generate {
        /// Presentation topic
        topic: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateOptions {
    /// Directory the document is written to
    #[arg(long, short = 'o', global = true)]
    pub output_dir: Option<PathBuf>,

    /// Output format (pptx or markdown)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<String>,

    /// Number of slides generated concurrently
    #[arg(long, short = 'j', global = true)]
    pub jobs: Option<usize>,

    /// Content provider (gemini or openai)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model override for the content provider
    #[arg(long, short = 'm', global = true)]
    pub model: Option<String>,

    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();
    init_tracing(cli.options.quiet, cli.options.debug)?;
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let raw_topic = match cli.command {
        Some(Commands::Generate { topic }) => topic,
        None => match cli.topic {
            Some(topic) => topic,
            None => prompt_topic().await?,
        },
    };

    let topic = Topic::new(&raw_topic).map_err(|e| fatal(e.into()))?;
    let config = load_config(&cli.options).await.map_err(fatal)?;
    let pipeline = Pipeline::from_config(&config).map_err(fatal)?;

    println!("🎯 Generating presentation: {topic}");
    let output = pipeline.run(topic.as_str()).await.map_err(fatal)?;

    let filename = file_utils::output_filename(&output.deck.topic, config.format);
    let path = file_utils::save_document(&config.output_dir, &filename, &output.document)
        .await
        .map_err(|e| fatal(e.into()))?;

    print_summary(&output, &path);
    Ok(())
}

fn init_tracing(quiet: bool, debug: bool) -> Result<()> {
    let level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_env("DECKGEN_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}

async fn prompt_topic() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Please enter the topic for your presentation: ")
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read topic from stdin")?;
    Ok(line)
}

/// File, then environment, then command line.
async fn load_config(options: &GenerateOptions) -> Result<DeckConfig, DeckError> {
    let mut config = DeckConfig::load(options.config.as_deref()).await?;
    config.apply_env()?;
    apply_overrides(&mut config, options)?;
    Ok(config)
}

fn apply_overrides(config: &mut DeckConfig, options: &GenerateOptions) -> Result<(), DeckError> {
    if let Some(provider) = &options.provider {
        config.provider = provider.parse()?;
    }
    if let Some(model) = &options.model {
        config.model = Some(model.clone());
    }
    if let Some(format) = &options.format {
        config.format = format.parse()?;
    }
    if let Some(jobs) = options.jobs {
        config.concurrency = jobs;
    }
    if let Some(dir) = &options.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(())
}

fn fatal(error: DeckError) -> anyhow::Error {
    let severity = ErrorReporter::get_severity(&error);
    let message = format!("{severity}\n{}", ErrorReporter::format_user_error(&error));
    tracing::error!("{error}");
    anyhow::Error::new(error).context(message)
}

fn print_summary(output: &RunOutput, path: &Path) {
    let report = &output.report;
    if let Some(reason) = &report.research_degraded {
        println!("⚠️  Research unavailable, slides were written without web context: {reason}");
    }
    for (position, reason) in &report.placeholder_slides {
        println!("⚠️  Slide {position} uses placeholder content: {reason}");
    }
    if !report.images_absent.is_empty() {
        let positions: Vec<String> = report.images_absent.iter().map(|p| p.to_string()).collect();
        println!("🖼️  No image found for slides {}", positions.join(", "));
    }

    println!(
        "✅ {} slides, {} images, {} research sources",
        output.deck.len(),
        report.images_resolved.len(),
        report.research_sources
    );
    println!("📁 Presentation saved to: {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_common::{OutputFormat, Provider};

    #[test]
    fn test_positional_topic() {
        let cli = Cli::try_parse_from(["deckgen", "Solar Energy", "--jobs", "3"]).unwrap();
        assert_eq!(cli.topic.as_deref(), Some("Solar Energy"));
        assert!(cli.command.is_none());
        assert_eq!(cli.options.jobs, Some(3));
    }

    #[test]
    fn test_generate_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "deckgen",
            "generate",
            "Tidal Power",
            "--format",
            "markdown",
            "-o",
            "out",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate { topic }) => assert_eq!(topic, "Tidal Power"),
            None => panic!("expected generate subcommand"),
        }
        assert_eq!(cli.options.format.as_deref(), Some("markdown"));
        assert_eq!(cli.options.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_debug_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["deckgen", "x", "--debug", "--quiet"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let mut config = DeckConfig::default();
        let options = GenerateOptions {
            provider: Some("openai".to_string()),
            format: Some("md".to_string()),
            jobs: Some(2),
            ..Default::default()
        };
        apply_overrides(&mut config, &options).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.format, OutputFormat::Markdown);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_bad_format_is_a_config_error() {
        let mut config = DeckConfig::default();
        let options = GenerateOptions {
            format: Some("docx".to_string()),
            ..Default::default()
        };
        let err = apply_overrides(&mut config, &options).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("docx"));
    }
}
