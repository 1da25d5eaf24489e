//! Limbas web installer
//!
//! Serves the install form from the given root directory until an install
//! succeeds, then removes itself and exits.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, Level};
use web_installer::web;
use web_installer::{check_dependencies, InstallWorkflow, InstallerConfig};

#[derive(Parser, Debug)]
#[command(name = "limbas-installer", version, about = "Download and unpack the latest Limbas release through a web form")]
struct Args {
    /// Address the form is served on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory the product is installed relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Installer file removed after a successful install (defaults to this executable)
    #[arg(long)]
    installer_file: Option<PathBuf>,

    /// Latest-release metadata endpoint
    #[arg(long)]
    release_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = InstallerConfig::from_env().with_root(&args.root);
    if let Some(path) = args.installer_file {
        config = config.with_installer_path(path);
    }
    if let Some(url) = args.release_url {
        config = config.with_release_url(url);
    }

    if let Err(e) = check_dependencies(config.root()) {
        // The form reports this to the user as well
        tracing::warn!("Preflight: {}", e);
    }

    info!(
        "Installing relative to {} from {}",
        config.root().display(),
        config.release_url
    );

    let workflow = InstallWorkflow::new(config).context("Failed to set up the installer")?;
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    web::serve(listener, workflow, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .context("Installer server failed")?;

    info!("Installer stopped");
    Ok(())
}
