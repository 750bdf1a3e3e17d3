// Domain service interface for the external constraint engine
// Defines the contract any engine adapter must follow (Dependency Inversion Principle)

use super::data_value::DataValue;
use super::instance::{BackendDescriptor, Instance, Model, SolveOptions};
use super::outcome::EngineOutcome;

/// Error types for the solving tools
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Solver lookup failed: {0}")]
    Lookup(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Solver execution failed: {0}")]
    Solve(String),

    #[error("Solver discovery unavailable: {0}")]
    Discovery(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for a constraint-programming engine
///
/// The tool façade only talks to the engine through this trait, so the
/// MiniZinc adapter can be swapped for a fake in tests.
#[tonic::async_trait]
pub trait ConstraintEngine: Send + Sync {
    /// Resolve a solver id, tag or name to a registered backend
    async fn lookup(&self, solver_id: &str) -> Result<BackendDescriptor>;

    /// Parse and type-check a model for `backend` without solving it
    async fn parse(&self, model_text: &str, backend: &BackendDescriptor) -> Result<Model>;

    /// Bind a parameter on an instance
    fn bind(&self, instance: &mut Instance, name: &str, value: DataValue) -> Result<()> {
        instance.bind(name, value)
    }

    /// Run the search
    async fn solve(&self, instance: &Instance, options: &SolveOptions) -> Result<EngineOutcome>;

    /// Ids of every backend the engine knows about
    async fn available_backend_ids(&self) -> Result<Vec<String>>;

    /// Name of this engine for logging
    fn name(&self) -> &str;
}
