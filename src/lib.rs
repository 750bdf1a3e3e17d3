// Domain layer: tool data model, engine contract and value objects
pub mod domain;

// Application layer: tool façade, normalization and the gRPC service
pub mod application;

// Infrastructure layer: configuration, logging and server lifecycle
pub mod infrastructure;

// Solver adapters: concrete implementations of ConstraintEngine
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConstraintEngine, DataValue, SolveRequest, SolveResult, SolveStatus, Solution, SolverError,
    SolverInfo, ValidationReport,
};

pub use application::{ConstraintToolService, GrpcToolService, KnapsackProblem, QueensProblem};

pub use infrastructure::{build_service, init_logging, start_server, AppConfig, ServerConfig};

pub use solver::{MiniZincConfig, MiniZincEngine};
