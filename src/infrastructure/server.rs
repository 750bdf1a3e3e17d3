// Infrastructure: Server setup and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;

use crate::application::mappers::constraint_solver::constraint_solver_tools_server::ConstraintSolverToolsServer;
use crate::application::{ConstraintToolService, GrpcToolService};

pub struct ServerConfig {
    pub address: SocketAddr,
    pub tools: Arc<ConstraintToolService>,
}

impl ServerConfig {
    pub fn new(address: SocketAddr, tools: Arc<ConstraintToolService>) -> Self {
        Self { address, tools }
    }
}

/// The gRPC service wrapping a tool façade, ready to be added to a tonic router
pub fn build_service(tools: Arc<ConstraintToolService>) -> ConstraintSolverToolsServer<GrpcToolService> {
    ConstraintSolverToolsServer::new(GrpcToolService::new(tools))
}

/// Serve until Ctrl-C
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!(
        "Constraint solver tools listening on {} (default solver: {})",
        config.address,
        config.tools.default_solver()
    );

    Server::builder()
        .add_service(build_service(config.tools))
        .serve_with_shutdown(config.address, shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
