use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use textsum::chat;
use textsum::config::Settings;
use textsum::hub;
use textsum::server::ApiServer;
use textsum::summarizer::SummarizerEngine;

#[derive(Parser)]
#[command(name = "textsum", about = "Abstractive text summarization service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server and an interactive session against it
    Run,
    /// Start only the summarization server
    Serve,
    /// Upload a model directory to the configured registry
    Publish {
        /// Directory holding the checkpoint files to upload
        #[arg(long, default_value = "./model_directory")]
        directory: PathBuf,
        /// Commit message recorded with the upload
        #[arg(long, default_value = "Upload fine-tuned model")]
        message: String,
    },
}

/// Main entry point for the summarization service
///
/// Handles three modes of operation:
/// - Run: starts the server plus an interactive terminal session
/// - Serve: starts only the server
/// - Publish: uploads a local model directory to the registry
///
/// # Errors
/// Returns an error if settings are invalid, the model cannot be
/// loaded, or server initialization fails
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new()?;

    // Initialize the subscriber first, before any file operations
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs")),
        "textsum",
    );

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        // Write to file only; the terminal stays free for the session
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_max_level(settings.logging.tracing_level())
        .init();

    info!("Text summarizer starting up...");

    let log_path = settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs"));
    std::fs::create_dir_all(log_path)?;
    let full_log_path = std::fs::canonicalize(log_path)?;
    info!("Log directory: {}", full_log_path.display());
    info!("Settings loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let engine = build_engine(&settings)?;
            let server = ApiServer::new(
                engine,
                settings.server.host.clone(),
                settings.server.port,
            );

            // Start server in a separate task
            tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    eprintln!("Server error: {}", e);
                }
            });

            // Give the server a moment to start
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            chat::chat_loop(&settings).await?;
        }
        Commands::Serve => {
            let engine = build_engine(&settings)?;
            let server = ApiServer::new(
                engine,
                settings.server.host.clone(),
                settings.server.port,
            );
            server.start().await?;
        }
        Commands::Publish { directory, message } => {
            let token = std::env::var("HF_TOKEN").ok();
            hub::publish(&directory, &settings.model.registry_id, &message, token.as_deref())
                .await?;
            println!(
                "Uploaded {} to {}",
                directory.display(),
                settings.model.registry_id
            );
        }
    }

    Ok(())
}

fn build_engine(settings: &Settings) -> Result<Arc<SummarizerEngine>, Box<dyn Error + Send + Sync>> {
    let provider = textsum::hub::ModelProvider::from_settings(settings);
    info!("Loading model {}...", settings.model.registry_id);
    let bundle = provider.load()?;
    let engine = SummarizerEngine::new(bundle, (&settings.generation).into());
    info!("Model loaded and ready");
    Ok(Arc::new(engine))
}
