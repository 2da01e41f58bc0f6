// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use finance_dashboard::application::view_controller::DashboardViewController;
use finance_dashboard::domain::identity::NavigationContext;
use finance_dashboard::infrastructure::config::load_app_config;
use finance_dashboard::infrastructure::report_client::HttpReportClient;
use finance_dashboard::presentation::{app_state::AppState, build_router};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "finance-dashboard",
    about = "Serve the financial dashboard view state for one entity"
)]
struct Cli {
    /// URL or query string of the page embedding the dashboard, e.g. `?userId=123`
    #[arg(long, env = "DASHBOARD_NAVIGATION")]
    navigation: String,

    /// Config file (defaults to config/dashboard.* when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen address from config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = load_app_config(cli.config.as_deref())?;
    if config.report.credential().is_none() {
        tracing::warn!("No report API key configured; every fetch will fail");
    }

    // Report client (infrastructure layer) and controller (application layer)
    let client = Arc::new(HttpReportClient::new(config.report.clone()));
    let controller = Arc::new(DashboardViewController::new(client, config.navigation.clone()));

    let context = NavigationContext::parse(&cli.navigation);
    tokio::spawn({
        let controller = controller.clone();
        async move {
            controller.initialize(&context).await;
        }
    });

    let router = build_router(Arc::new(AppState { controller }));

    // Start server
    let addr: SocketAddr = cli.bind.unwrap_or(config.server.bind).parse()?;
    tracing::info!("Starting finance-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
