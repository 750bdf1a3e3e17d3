// Application layer: tool façade, result normalization and the gRPC surface

pub mod grpc_service;
pub mod mappers;
pub mod normalizer;
pub mod templates;
pub mod tool_service;

pub use grpc_service::GrpcToolService;
pub use templates::{KnapsackProblem, QueensProblem};
pub use tool_service::ConstraintToolService;
