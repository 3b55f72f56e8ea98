use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vaultid_extract::app::App;
use vaultid_extract::models::Config;

#[derive(Debug, Parser)]
#[command(name = "vaultid-extract")]
#[command(about = "Extract identity-document fields through a vision model")]
struct CliArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, short, default_value_t = 3000)]
    port: u16,

    /// Directory with the web client, served for every non-API path.
    #[arg(long, value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultid_extract=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vaultid-extract");

    let args = CliArgs::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let mut app = App::new(&config);
    if let Some(dir) = args.static_dir {
        if !dir.is_dir() {
            anyhow::bail!("Static directory {} does not exist", dir.display());
        }
        app = app.with_static_dir(dir);
    }

    let addr = SocketAddr::new(args.host, args.port);
    if let Err(e) = app.serve(addr).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
