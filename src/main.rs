//! # BidGPT: tender & bid assistant backend
//!
//! Usage:
//!   bidgpt                               # Serve on 0.0.0.0:4000 (5000 when hosted)
//!   bidgpt --port 8080 -v                # Custom port, debug logging
//!   bidgpt check "tender deadline"       # Fit the knowledge base and show the best match

use anyhow::{Context, Result, bail};
use bidgpt_core::config::BidGptConfig;
use bidgpt_knowledge::KnowledgeStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bidgpt",
    version,
    about = "📑 BidGPT: tender & bid assistant backend"
)]
struct Cli {
    /// Config file (default: $BIDGPT_CONFIG, then ./bidgpt.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Knowledge base file, one entry per line
    #[arg(long)]
    knowledge: Option<String>,

    /// Directory holding index.html and front-end assets
    #[arg(long)]
    static_dir: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the knowledge base and score a query locally
    Check {
        /// Question to match against the knowledge base
        query: Option<String>,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut BidGptConfig) {
        if let Some(host) = &self.host {
            config.gateway.host = host.clone();
        }
        if let Some(port) = self.port {
            config.gateway.port = Some(port);
        }
        if let Some(path) = &self.knowledge {
            config.knowledge.path = path.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.gateway.static_dir = dir.clone();
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<BidGptConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("BIDGPT_CONFIG").map(PathBuf::from));
    let mut config = BidGptConfig::load(path.as_deref())?;
    config.apply_env()?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "bidgpt=debug,bidgpt_gateway=debug,bidgpt_agent=debug,bidgpt_knowledge=debug,bidgpt_providers=debug,bidgpt_channels=debug,tower_http=debug"
    } else {
        "bidgpt=info,bidgpt_gateway=info,bidgpt_agent=info,bidgpt_knowledge=info,bidgpt_providers=info,bidgpt_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn run_check(config: &BidGptConfig, query: Option<&str>) -> Result<()> {
    let path = config.knowledge.resolved_path();
    let store = KnowledgeStore::open(&path, config.knowledge.relevance_threshold)
        .with_context(|| format!("Cannot use knowledge base {}", path.display()))?;
    let (documents, vocabulary) = store.stats();

    println!("📚 {}", path.display());
    println!("   Documents:  {documents}");
    println!("   Vocabulary: {vocabulary}");
    println!("   Threshold:  {}", store.threshold());

    let Some(query) = query else {
        return Ok(());
    };
    let best = store.best_match(query);
    println!("\n🔎 \"{query}\"");
    match store.retrieve(query) {
        Some(hit) => {
            println!("   ✅ #{} (score {:.4})", hit.index, hit.score);
            println!("   {}", hit.document);
        }
        None => println!(
            "   ❌ No entry above threshold (best #{} at {:.4})",
            best.index, best.score
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(cli.verbose || config.debug_enabled());

    if let Some(Command::Check { query }) = &cli.command {
        return run_check(&config, query.as_deref());
    }

    tracing::info!(
        "🚀 BidGPT v{} starting ({:?} profile)",
        env!("CARGO_PKG_VERSION"),
        config.deployment
    );

    let state = match bidgpt_gateway::AppState::initialize(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("❌ {e}");
            bail!("Startup failed ({:?}): {e}", e.kind());
        }
    };

    bidgpt_gateway::start(&config, state).await
}
