// Tool façade: solve, list solvers, validate
//
// Every operation answers with a well-formed value. Failures become an ERROR
// SolveResult, an invalid ValidationReport or a shorter solver list.

use std::sync::Arc;

use futures::future::join_all;

use super::normalizer;
use super::templates::{KnapsackProblem, QueensProblem};
use crate::domain::{
    ConstraintEngine, Instance, Result, SolveOptions, SolveRequest, SolveResult, SolverError,
    SolverInfo, ValidationReport, DEFAULT_SOLVER, DEFAULT_SOLVER_ALIAS,
};

pub struct ConstraintToolService {
    engine: Arc<dyn ConstraintEngine>,
    default_solver: String,
}

impl ConstraintToolService {
    pub fn new(engine: Arc<dyn ConstraintEngine>) -> Self {
        Self::with_default_solver(engine, DEFAULT_SOLVER)
    }

    pub fn with_default_solver(
        engine: Arc<dyn ConstraintEngine>,
        default_solver: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            default_solver: default_solver.into(),
        }
    }

    pub fn default_solver(&self) -> &str {
        &self.default_solver
    }

    /// Solve a constraint problem
    pub async fn solve_constraint(&self, request: SolveRequest) -> SolveResult {
        match self.try_solve(&request).await {
            Ok(result) => {
                log::info!(
                    "Solve finished: status={} solutions={} time={:?}",
                    result.status(),
                    result.num_solutions(),
                    result.solve_time()
                );
                result
            }
            Err(e) => {
                log::warn!("Solve failed: {}", e);
                e.into()
            }
        }
    }

    async fn try_solve(&self, request: &SolveRequest) -> Result<SolveResult> {
        request.validate()?;

        let backend = self.engine.lookup(self.resolve_solver(&request.solver)).await?;
        log::info!(
            "Solving with {} {} via {} (all_solutions={}, timeout={:?})",
            backend.id,
            backend.version,
            self.engine.name(),
            request.all_solutions,
            request.timeout
        );

        let model = self.engine.parse(&request.model, &backend).await?;
        let method = model.method();

        let mut instance = Instance::new(backend, model);
        for (name, value) in &request.data {
            self.engine.bind(&mut instance, name, value.clone())?;
        }

        let options = SolveOptions {
            all_solutions: request.all_solutions,
            timeout: request.timeout,
        };
        let outcome = self.engine.solve(&instance, &options).await?;
        if outcome.timed_out {
            log::warn!("Solve stopped at its deadline; returning what was found");
        }

        Ok(normalizer::normalize(outcome, method, request.all_solutions))
    }

    /// List installed solver backends. Backends that cannot be resolved are
    /// skipped; an unavailable engine yields an empty list.
    pub async fn list_solvers(&self) -> Vec<SolverInfo> {
        let ids = match self.engine.available_backend_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                log::info!("No solvers listed: {}", e);
                return Vec::new();
            }
        };

        let lookups = ids.iter().map(|id| self.engine.lookup(id));
        join_all(lookups)
            .await
            .into_iter()
            .zip(&ids)
            .filter_map(|(resolved, id)| match resolved {
                Ok(backend) => Some(SolverInfo::from(backend)),
                Err(e) => {
                    log::debug!("Skipping solver {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    /// Check that a model parses and instantiates on the default backend,
    /// without searching
    pub async fn validate_model(&self, model_text: &str) -> ValidationReport {
        match self.check_model(model_text).await {
            Ok(()) => ValidationReport::valid(),
            Err(e) => {
                log::info!("Model rejected: {}", e);
                ValidationReport::invalid(e.to_string())
            }
        }
    }

    async fn check_model(&self, model_text: &str) -> Result<()> {
        if model_text.trim().is_empty() {
            return Err(SolverError::InvalidRequest(
                "model text must not be empty".to_string(),
            ));
        }
        let backend = self.engine.lookup(&self.default_solver).await?;
        self.engine.parse(model_text, &backend).await?;
        Ok(())
    }

    /// Solve the n-queens problem
    pub async fn solve_queens(&self, problem: QueensProblem) -> SolveResult {
        match problem.into_request() {
            Ok(request) => self.solve_constraint(request).await,
            Err(e) => e.into(),
        }
    }

    /// Solve a 0/1 knapsack problem
    pub async fn solve_knapsack(&self, problem: KnapsackProblem) -> SolveResult {
        match problem.into_request() {
            Ok(request) => self.solve_constraint(request).await,
            Err(e) => e.into(),
        }
    }

    fn resolve_solver<'a>(&'a self, requested: &'a str) -> &'a str {
        let requested = requested.trim();
        if requested.is_empty() || requested.eq_ignore_ascii_case(DEFAULT_SOLVER_ALIAS) {
            &self.default_solver
        } else {
            requested
        }
    }
}
