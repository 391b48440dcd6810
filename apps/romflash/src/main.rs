//! romflash - interactive custom ROM installer
//!
//! Thin shell around the install orchestrator: parse the two CLI flags,
//! set up logging and the process environment, wire the real transports
//! and fetcher into the state machine, then exit with the run's outcome
//! code.

mod cli;
mod console;
mod logging;
mod setup;

use crate::cli::Cli;
use crate::console::ConsoleSession;
use clap::Parser;
use romflash_device::{AdbClient, FastbootClient};
use romflash_fetch::ArtifactFetcher;
use romflash_install::{HardwareSettle, InstallOrchestrator, Session};
use romflash_net::NetClient;
use romflash_types::ExitCode;
use std::process;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let session = Arc::new(ConsoleSession::new());

    if cli.version {
        println!(
            "romflash {} {}/{}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        exit(ExitCode::Success.code(), &session).await;
    }

    logging::init(cli.debug);
    info!("starting romflash v{}", env!("CARGO_PKG_VERSION"));

    let code = run(Arc::clone(&session)).await;
    exit(code, &session).await;
}

async fn run(session: Arc<ConsoleSession>) -> i32 {
    let work_dir = match setup::prepare_environment() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: failed to set up installer environment: {e}");
            return ExitCode::ErrorPrereqs.code();
        }
    };

    let net = match NetClient::with_defaults() {
        Ok(net) => net,
        Err(e) => {
            eprintln!("Error: failed to initialize HTTP client: {e}");
            return ExitCode::ErrorPrereqs.code();
        }
    };

    let orchestrator = InstallOrchestrator::new(
        Arc::new(AdbClient::new()),
        Arc::new(FastbootClient::new()),
        Arc::new(ArtifactFetcher::new(net, work_dir)),
        session,
        Arc::new(HardwareSettle),
    );

    let outcome = orchestrator.run().await;
    info!(code = outcome.exit.code(), "run finished: {}", outcome.message);

    if outcome.is_failure() {
        eprintln!();
        eprintln!("Error: {}", outcome.message);
    }
    outcome.exit.code()
}

/// Exit the process, pausing first on Windows: a double-click launch
/// closes its console window the instant the process ends, hiding the
/// last few messages.
async fn exit(code: i32, session: &ConsoleSession) -> ! {
    if cfg!(windows) {
        let _ = session.prompt("\nPress [Enter] to exit...").await;
    }
    process::exit(code);
}
