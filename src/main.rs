use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_logos::{config::Config, pipeline::LogoPipeline, roster};

#[derive(Parser)]
#[command(name = "channel-logos")]
#[command(version = "0.1.0")]
#[command(about = "Fetch and cache square channel logos for a TV lineup")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Channel roster CSV (number,code,type,search_hint)
    #[arg(long, default_value = "channels.csv")]
    channels_csv: PathBuf,

    /// Optional overrides CSV (code,direct_image_url)
    #[arg(long, default_value = "overrides.csv")]
    overrides_csv: PathBuf,

    /// Directory for generated PNGs
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Square logo size in pixels (overrides config file)
    #[arg(long)]
    target_px: Option<u32>,

    /// Max channel entries in flight at once (overrides config file)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("channel_logos={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting channel-logos v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;

    if let Some(target_px) = cli.target_px {
        config.fetch.target_px = target_px;
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch.concurrency = concurrency;
    }

    let entries = roster::load_channels(&cli.channels_csv)?;
    let overrides = roster::load_overrides(Some(&cli.overrides_csv))?;
    info!(
        "loaded {} roster entries, {} overrides",
        entries.len(),
        overrides.len()
    );

    let pipeline = LogoPipeline::new(&config, cli.output_dir.clone(), overrides)?;

    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("abort requested; letting in-flight writes finish");
            cancel.cancel();
        }
    });

    let report = pipeline.run(&entries).await?;

    info!(
        "Done. Success: {}, Fail: {}. Logos are in {}",
        report.success,
        report.failed,
        cli.output_dir.display()
    );
    info!("Tip: set TARGET_PX=96 (or 64/128/256) to control size.");

    Ok(())
}
