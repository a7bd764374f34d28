mod category;
mod changeset;
mod cli;
mod committer;
mod config;
mod constants;
mod git;
mod listing;
mod message;
mod server;
#[cfg(test)]
mod test_support;
mod ui;
mod watcher;

use crate::cli::{Cli, Command};
use crate::committer::Committer;
use crate::config::{ServeConfig, WatchConfig};
use crate::watcher::Watcher;
use anyhow::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let Some(command) = &cli.command else {
        Cli::print_usage();
        return Ok(());
    };

    match command {
        Command::Serve { port, root } => {
            server::serve(ServeConfig::new(*port, root.clone()), shutdown_signal()).await?;
        }
        Command::Start => {
            let mut watcher = watcher_from(&cli);
            watcher.start();
            shutdown_signal().await;
            watcher.stop();
        }
        Command::Stop => {
            // state is per process, so a fresh process has nothing to stop
            watcher_from(&cli).stop();
        }
        Command::Commit { message } => {
            status!("running a commit cycle...");
            watcher_from(&cli).commit_once(message.clone()).await?;
        }
        Command::Status => {
            let config = WatchConfig::from_cli(&cli);
            watcher_from(&cli)
                .status()
                .print(&config.remote, &config.branch);
        }
    }

    Ok(())
}

fn watcher_from(cli: &Cli) -> Watcher {
    Watcher::new(Committer::new(WatchConfig::from_cli(cli)))
}

/// resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!();
    status!("shutdown signal received, stopping...");
}
