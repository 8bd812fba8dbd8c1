//! content-engine: TF-IDF content recommendation service.
//!
//! ```bash
//! content-engine train ./products.csv
//! content-engine recommend "red running shoes" -n 5
//! CONTENT_ENGINE_USER=admin CONTENT_ENGINE_PASSWORD=secret content-engine serve
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use content_engine::{config::Config, logging, server, ContentEngine};

#[derive(Parser)]
#[command(name = "content-engine", version, about)]
struct Cli {
    /// TOML config file (default: $CONTENT_ENGINE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Index directory, overrides the config
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address, overrides the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Rebuild the index from a CSV path or URL
    Train {
        source: String,
    },
    /// Print the documents most similar to CONTENT
    Recommend {
        content: String,

        /// Number of results (default: engine.default_num)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        num: Option<i64>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.index_dir {
        config.engine.index_dir = dir;
    }
    logging::init_tracing(&config.log, cli.verbose);

    let engine = ContentEngine::new(config.engine.clone());
    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
            runtime.block_on(server::serve(Arc::new(engine), &config.server))?;
        }
        Command::Train { source } => {
            engine
                .train(&source)
                .with_context(|| format!("training from {source} failed"))?;
            println!("OK");
        }
        Command::Recommend { content, num, json } => {
            let num = num.unwrap_or(config.engine.default_num);
            let recs = engine.recommend(&content, num)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recs)?);
            } else {
                for (rank, r) in recs.iter().enumerate() {
                    println!("{:>3}. {:.4}  {}", rank + 1, r.score, r.description);
                }
            }
        }
    }
    Ok(())
}
