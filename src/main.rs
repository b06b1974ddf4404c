use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use engram_core::Config;
use engram_core::bootstrap::{
    create_embedder, create_memory, create_splitter, load_config, resolve_config_path,
};
use engram_memory::backend::retired_backends;
use engram_memory::{AnyMemory, MemoryItem, MemoryProvider, supported_backends};

/// Store text as embedded memory and query it by meaning.
#[derive(Parser, Debug)]
#[command(name = "engram", version, about, long_about = None)]
struct Cli {
    /// Config file. Falls back to `ENGRAM_CONFIG`, then `config/default.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split, embed and store a piece of text.
    Add {
        text: String,
        /// Recorded as the item's `source_type`.
        #[arg(long, default_value = "cli")]
        source: String,
        /// Short summary, embedded alongside the chunks.
        #[arg(long)]
        summary: Option<String>,
        /// Extra metadata as `key=value`. Repeatable.
        #[arg(long = "meta", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },
    /// Print the item stored at a handle.
    Get { index: usize },
    /// Rank stored items against a query.
    Search {
        query: String,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// Number of stored items.
    Count,
    /// Backend name, item and chunk totals, embedding dimension.
    Stats,
    /// Remove every stored item.
    Clear,
    /// List selectable and retired backend names.
    Backends,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty metadata key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Add {
            text,
            source,
            summary,
            metadata,
        } => {
            let (config, mut memory) = open(&config_path)?;
            let embedder = create_embedder(&config)?;
            let splitter = create_splitter(&config);
            let metadata: BTreeMap<String, String> = metadata.into_iter().collect();
            let mut item = MemoryItem::from_text(&text, &source, metadata, &splitter, &embedder)
                .context("failed to build memory item")?;
            if let Some(summary) = summary {
                item = item
                    .with_summary(summary, &embedder)
                    .context("failed to embed summary")?;
            }
            let chunks = item.chunks().len();
            let index = memory.add(item).context("failed to store memory item")?;
            println!("stored item {index} ({chunks} chunks)");
        }
        Commands::Get { index } => {
            let (_, memory) = open(&config_path)?;
            print!("{}", memory.get(index)?.dump());
        }
        Commands::Search { query, k } => {
            let (config, memory) = open(&config_path)?;
            let embedder = create_embedder(&config)?;
            let hits = memory.get_relevant_for_text(&query, k, &embedder)?;
            if hits.is_empty() {
                println!("no matches");
            }
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "{}. [{:.4}] {}",
                    rank + 1,
                    hit.best_score(),
                    hit.most_relevant_chunk()
                );
            }
        }
        Commands::Count => {
            let (_, memory) = open(&config_path)?;
            println!("{}", memory.count());
        }
        Commands::Stats => {
            let (_, memory) = open(&config_path)?;
            let stats = memory.stats();
            println!("backend: {}", memory.name());
            println!("items: {}", stats.items);
            println!("chunks: {}", stats.chunks);
            match memory.dimension() {
                Some(dimension) => println!("dimension: {dimension}"),
                None => println!("dimension: unset"),
            }
        }
        Commands::Clear => {
            let (_, mut memory) = open(&config_path)?;
            let removed = memory.count();
            memory.clear()?;
            println!("cleared {removed} items");
        }
        Commands::Backends => print_backends(),
    }

    Ok(())
}

fn open(config_path: &Path) -> anyhow::Result<(Config, AnyMemory)> {
    let config = load_config(config_path)?;
    let memory = create_memory(&config)?;
    Ok((config, memory))
}

fn print_backends() {
    println!("supported:");
    for name in supported_backends() {
        println!("  {name}");
    }
    println!("retired:");
    for name in retired_backends() {
        println!("  {name}");
    }
}
