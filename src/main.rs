use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kiep::config::Config;
use kiep::pipeline::ArticlePipeline;
use kiep::templates;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("article") => {
            let Some(url) = args.get(2) else {
                print_usage();
                return Ok(1);
            };
            let tags = args[3..].to_vec();

            let config = load_config()?;
            let pipeline = ArticlePipeline::new(config);
            let dest = pipeline
                .archive(url, tags)
                .await
                .context("Archival run failed")?;
            println!("{}", dest.display());
            Ok(0)
        }
        Some("init") => {
            let config = load_config()?;
            templates::install_static(&config)
                .await
                .context("Failed to install static templates")?;
            Ok(0)
        }
        Some("help") => {
            print_usage();
            Ok(0)
        }
        _ => {
            print_usage();
            Ok(1)
        }
    }
}

fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(archive_dir = %config.archive_dir.display(), "Configuration loaded");
    Ok(config)
}

fn print_usage() {
    println!("kiep - single-article web archiver");
    println!();
    println!("Usage:");
    println!("  kiep article <url> [tags...]  archive one article");
    println!("  kiep init                     install static templates");
    println!("  kiep help                     show this help");
    println!();
    println!("Environment:");
    println!("  KIEP_ARCHIVE_DIR              archive root (default: XDG_DOCUMENTS_DIR/kiep,");
    println!("                                then $HOME/Documents/kiep)");
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,kiep=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
