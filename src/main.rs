use std::sync::Arc;

use dotenv::dotenv;
use minizinc_tools::{
    init_logging, start_server, AppConfig, ConstraintToolService, MiniZincEngine, ServerConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    log::info!(
        "Using MiniZinc executable {}",
        config.minizinc.resolved_executable().display()
    );

    // Engine and tool façade
    let engine = Arc::new(MiniZincEngine::new(config.minizinc));
    let tools = Arc::new(ConstraintToolService::with_default_solver(
        engine,
        config.default_solver,
    ));

    start_server(ServerConfig::new(config.address, tools)).await?;

    Ok(())
}
