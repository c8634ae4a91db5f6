mod config;
mod display;
mod ingest;
mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dongne_core::{Clock, SystemClock};
use dongne_store::BaselineRepository;
use tokio::net::TcpListener;

use config::Settings;
use ingest::BaselineStatus;
use server::{AppState, create_router};

#[derive(Parser)]
#[command(
    name = "dongne",
    version,
    about = "Apartment sale tracker for one neighborhood, with new-deal detection"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "DONGNE_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },
    /// Fetch once and print the report
    Fetch {
        /// Only list deals missing from the baseline
        #[arg(long)]
        new_only: bool,
    },
    /// Fetch and checkpoint the current deal list as the baseline
    SetBaseline,
    /// Show the stored baseline
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { bind } => cmd_serve(&cli.settings, bind).await,
        Command::Fetch { new_only } => cmd_fetch(&cli.settings, new_only).await,
        Command::SetBaseline => cmd_set_baseline(&cli.settings).await,
        Command::Status => cmd_status(&cli.settings).await,
    }
}

async fn cmd_serve(settings: &Settings, bind: SocketAddr) -> anyhow::Result<()> {
    let service = settings.build_service()?;
    let app = create_router(AppState {
        service: Arc::new(service),
    });

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(
        addr = %bind,
        area_code = %settings.area_code,
        neighborhood = %settings.neighborhood,
        "dongne v{} listening",
        env!("CARGO_PKG_VERSION")
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cmd_fetch(settings: &Settings, new_only: bool) -> anyhow::Result<()> {
    let service = settings.build_service()?;
    let report = service.report(None).await;
    display::print_report(&report, new_only);
    Ok(())
}

async fn cmd_set_baseline(settings: &Settings) -> anyhow::Result<()> {
    let service = settings.build_service()?;
    let snapshot = service.update_baseline().await?;
    println!(
        "Baseline updated: {} deals at {}",
        snapshot.deals.len(),
        snapshot.captured_at.to_rfc3339()
    );
    Ok(())
}

async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    // No registry access needed, so no service key either.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::kst());
    let store = settings.baseline(clock);
    let status = BaselineStatus {
        snapshot: store.read().await,
        refresh_due: store.is_refresh_due().await,
    };
    println!("{}", store.path().display());
    display::print_baseline_status(&status);
    Ok(())
}
