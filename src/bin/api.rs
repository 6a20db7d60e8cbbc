use financial_analyst_agent::{
    agent::Orchestrator,
    api::start_server,
    capabilities::CapabilityRegistry,
    config::Settings,
    planner::WorkflowPlanner,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Missing secrets are fatal: the server refuses to start.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("Both GEMINI_API_KEY and NEWS_API_KEY are required. See .env.example.");
            std::process::exit(1);
        }
    };

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Financial Analyst Agent - API Server");
    info!("Port: {}", api_port);

    // Create components
    let registry = CapabilityRegistry::with_defaults(&settings);
    let planner = Box::new(WorkflowPlanner::new(settings.gemini_api_key.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        planner,
        registry,
        settings.gemini_api_key.clone(),
    ));

    info!("Agent initialized");
    info!("Starting API server...");

    start_server(orchestrator, api_port).await?;

    Ok(())
}
