use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jarvis_core::config::{expand_path, Config, Settings};
use jarvis_core::types::ChatResponse;
use jarvis_llm::LlmGenerator;
use jarvis_rag::{bootstrap, build_pipeline};

#[derive(Parser)]
#[command(name = "jarvis")]
#[command(about = "Ask questions about a knowledge document", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration environment (dev, prod, test); defaults to RUST_ENV
    #[arg(long, global = true)]
    config_env: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and index a document
    Ingest {
        /// Defaults to knowledge.path
        path: Option<PathBuf>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Answer one question
    Ask {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        /// Query the index as it is, without ingesting the knowledge file first
        #[arg(long)]
        skip_ingest: bool,
        /// Print the answer as a JSON chat response
        #[arg(long)]
        json: bool,
    },
    /// Interactive question loop on stdin
    Chat {
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Delete and recreate the vector index
    #[command(name = "reset-index")]
    ResetIndex,
    /// Check that the completion backend answers
    Health,
}

fn load_config(config_env: Option<&str>) -> anyhow::Result<Config> {
    let config = match config_env {
        Some(env) => Config::load_for_env(Some(env)),
        None => Config::load(),
    }
    .context("loading configuration")?;
    tracing::debug!(env = config.env_name(), "configuration loaded");
    Ok(config)
}

fn health(config: &Config) -> anyhow::Result<()> {
    let settings = config.generation_settings()?;
    let generator = LlmGenerator::from_settings(&settings)?;
    if generator.is_fallback() {
        println!("Generator: fallback mode (no backend probed)");
    } else if generator.health_check() {
        println!("Generator: {} is reachable", settings.endpoint);
    } else {
        anyhow::bail!("completion backend at {} is not answering", settings.endpoint);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config_env.as_deref())?;
    // the health probe only needs the generator section
    if let Commands::Health = cli.command {
        return health(&config);
    }
    let mut settings: Settings = config.settings()?;

    match cli.command {
        Commands::Ingest { path, chunk_size, overlap } => {
            if let Some(n) = chunk_size {
                settings.knowledge.chunk_size = n;
            }
            if let Some(n) = overlap {
                settings.knowledge.overlap = n;
            }
            let pipeline = build_pipeline(&settings)?;
            let path = path.unwrap_or_else(|| expand_path(&settings.knowledge.path));
            let report = pipeline.ingest_file(&path)?;
            println!("✅ Indexed {} chunks from {}", report.chunks, path.display());
        }
        Commands::Ask { query, top_k, skip_ingest, json } => {
            settings.knowledge.ingest_on_startup = !skip_ingest;
            let pipeline = bootstrap(&settings)?;
            let answer = pipeline.answer(&query, top_k.unwrap_or(settings.retrieval.top_k))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ChatResponse { answer })?);
            } else {
                println!("{}", answer);
            }
        }
        Commands::Chat { top_k, skip_ingest } => {
            settings.knowledge.ingest_on_startup = !skip_ingest;
            let pipeline = bootstrap(&settings)?;
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            println!("Jarvis is ready. Type 'exit' or 'quit' to leave.");
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            loop {
                print!("> ");
                stdout.flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
                    break;
                }
                match pipeline.answer(query, top_k) {
                    Ok(answer) => println!("{}\n", answer),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Commands::ResetIndex => {
            settings.knowledge.ingest_on_startup = false;
            let pipeline = build_pipeline(&settings)?;
            pipeline.reset()?;
            println!("✅ Index '{}' recreated", pipeline.index().name());
        }
        Commands::Health => health(&config)?,
    }
    Ok(())
}
