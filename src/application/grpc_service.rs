use std::sync::Arc;

use tonic::{Request, Response, Status};

use super::mappers::{self, constraint_solver};
use super::tool_service::ConstraintToolService;
use crate::domain::SolveResult;

/// gRPC service implementation
///
/// Every RPC answers `Ok`; tool failures travel inside the response message.
pub struct GrpcToolService {
    tools: Arc<ConstraintToolService>,
}

impl GrpcToolService {
    pub fn new(tools: Arc<ConstraintToolService>) -> Self {
        Self { tools }
    }
}

#[tonic::async_trait]
impl constraint_solver::constraint_solver_tools_server::ConstraintSolverTools for GrpcToolService {
    async fn solve_constraint(
        &self,
        request: Request<constraint_solver::SolveRequest>,
    ) -> Result<Response<constraint_solver::SolveResult>, Status> {
        let result = match mappers::proto_to_domain_request(request.into_inner()) {
            Ok(request) => self.tools.solve_constraint(request).await,
            Err(e) => SolveResult::from(e),
        };
        Ok(Response::new(mappers::domain_to_proto_result(result)))
    }

    async fn list_solvers(
        &self,
        _request: Request<constraint_solver::Empty>,
    ) -> Result<Response<constraint_solver::SolverList>, Status> {
        let solvers = self
            .tools
            .list_solvers()
            .await
            .into_iter()
            .map(mappers::domain_to_proto_solver)
            .collect();
        Ok(Response::new(constraint_solver::SolverList { solvers }))
    }

    async fn validate_model(
        &self,
        request: Request<constraint_solver::ValidateModelRequest>,
    ) -> Result<Response<constraint_solver::ValidationResult>, Status> {
        let report = self.tools.validate_model(&request.into_inner().model).await;
        Ok(Response::new(mappers::domain_to_proto_validation(report)))
    }

    async fn solve_queens(
        &self,
        request: Request<constraint_solver::QueensRequest>,
    ) -> Result<Response<constraint_solver::SolveResult>, Status> {
        let result = match mappers::proto_to_domain_queens(request.into_inner()) {
            Ok(problem) => self.tools.solve_queens(problem).await,
            Err(e) => SolveResult::from(e),
        };
        Ok(Response::new(mappers::domain_to_proto_result(result)))
    }

    async fn solve_knapsack(
        &self,
        request: Request<constraint_solver::KnapsackRequest>,
    ) -> Result<Response<constraint_solver::SolveResult>, Status> {
        let result = match mappers::proto_to_domain_knapsack(request.into_inner()) {
            Ok(problem) => self.tools.solve_knapsack(problem).await,
            Err(e) => SolveResult::from(e),
        };
        Ok(Response::new(mappers::domain_to_proto_result(result)))
    }
}
