use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use gateway::{CommandGateway, HostsInvoker};
use panel::PanelController;
use shared::domain::{DeviceId, FavoriteSelector};
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod serve;
mod shell;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "devbox", about = "Switch the active devbox by rewriting the hosts file")]
struct Cli {
    /// Hosts file to operate on instead of the configured/platform default.
    #[arg(long, global = true)]
    hosts_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Point the #SWAP entries at another devbox.
    Swap { box_number: u64 },
    /// Enable the entries tagged #FAV[<name>].
    Favorite { name: String },
    /// List favorites found in the hosts file.
    Favorites,
    /// Interactive panel on stdin/stdout.
    Panel,
    /// JSON-lines command server on stdin/stdout.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(path) = cli.hosts_path {
        settings.hosts_path = Some(path);
    }

    let hosts = settings.hosts_file()?;
    info!(path = %hosts.path().display(), "using hosts file");
    let invoker = Arc::new(HostsInvoker::new(hosts));
    let gateway = CommandGateway::new(invoker.clone());

    match cli.command {
        Command::Swap { box_number } => {
            gateway.switch_device(DeviceId(box_number)).await?;
            println!("swapped to devbox {box_number}");
        }
        Command::Favorite { name } => {
            let selector = FavoriteSelector::from(name);
            gateway.activate_favorite(&selector).await?;
            println!("switched to favorite {selector}");
        }
        Command::Favorites => {
            for favorite in gateway.list_favorites().await? {
                println!("{favorite}");
            }
        }
        Command::Panel => {
            let panel = PanelController::with_hide_delay(gateway, settings.hide_delay());
            shell::run_shell(panel, BufReader::new(stdin()), stdout()).await?;
        }
        Command::Serve => {
            serve::serve_lines(&*invoker, BufReader::new(stdin()), stdout()).await?;
        }
    }

    Ok(())
}
