use std::collections::BTreeMap;
use std::time::Duration;

use super::data_value::DataValue;
use super::instance::BackendDescriptor;
use super::solver_service::{Result, SolverError};
use super::value_objects::SolveStatus;

/// Solver used when a request does not name one
pub const DEFAULT_SOLVER: &str = "gecode";

/// Solver name that selects whatever backend the service is configured with
pub const DEFAULT_SOLVER_ALIAS: &str = "default";

/// Constraint problem submitted to the solve tool
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// MiniZinc model source
    pub model: String,
    /// Parameter bindings
    pub data: BTreeMap<String, DataValue>,
    /// Solver id, tag or name
    pub solver: String,
    pub all_solutions: bool,
    pub timeout: Option<Duration>,
}

impl SolveRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            data: BTreeMap::new(),
            solver: DEFAULT_SOLVER_ALIAS.to_string(),
            all_solutions: false,
            timeout: None,
        }
    }

    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = solver.into();
        self
    }

    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_all_solutions(mut self, all_solutions: bool) -> Self {
        self.all_solutions = all_solutions;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the request-level invariants before anything reaches the engine
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(SolverError::InvalidRequest(
                "model text must not be empty".to_string(),
            ));
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(SolverError::InvalidRequest(
                    "timeout must be a positive duration".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One reported assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub variables: BTreeMap<String, DataValue>,
    pub objective: Option<f64>,
    pub is_optimal: bool,
}

impl Solution {
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.variables.get(name)
    }
}

/// Normalized answer of the solve tool.
///
/// Built only through [`SolveResult::new`] and [`SolveResult::error`], so the
/// error message is present exactly when the status is `Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    solutions: Vec<Solution>,
    status: SolveStatus,
    solve_time: Duration,
    error: Option<String>,
}

impl SolveResult {
    /// Result of a solve that ran. `Error` is not a valid status here; use
    /// [`SolveResult::error`].
    pub fn new(status: SolveStatus, solutions: Vec<Solution>, solve_time: Duration) -> Self {
        debug_assert!(status != SolveStatus::Error);
        Self {
            solutions,
            status,
            solve_time,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            solutions: Vec::new(),
            status: SolveStatus::Error,
            solve_time: Duration::ZERO,
            error: Some(message),
        }
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    pub fn num_solutions(&self) -> usize {
        self.solutions.len()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl From<SolverError> for SolveResult {
    fn from(error: SolverError) -> Self {
        SolveResult::error(error.to_string())
    }
}

/// Installed solver backend as shown to tool callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub tags: Vec<String>,
}

impl From<BackendDescriptor> for SolverInfo {
    fn from(backend: BackendDescriptor) -> Self {
        Self {
            id: backend.id,
            name: backend.name,
            version: backend.version,
            tags: backend.tags,
        }
    }
}

/// Answer of the validation tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub error: Option<String>,
    pub message: String,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            message: "Model is syntactically valid".to_string(),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            message: "Model validation failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_given_blank_model_should_reject() {
        let request = SolveRequest::new("   \n");
        assert!(matches!(
            request.validate(),
            Err(SolverError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_given_zero_timeout_should_reject() {
        let request = SolveRequest::new("var 1..3: x; solve satisfy;").with_timeout(Duration::ZERO);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_given_positive_timeout_should_accept() {
        let request =
            SolveRequest::new("var 1..3: x; solve satisfy;").with_timeout(Duration::from_millis(10));
        assert!(request.validate().is_ok());
        assert_eq!(request.solver, DEFAULT_SOLVER_ALIAS);
    }

    #[test]
    fn test_error_result_carries_message_and_nothing_else() {
        let result = SolveResult::error("boom");
        assert_eq!(result.status(), SolveStatus::Error);
        assert_eq!(result.error_message(), Some("boom"));
        assert_eq!(result.num_solutions(), 0);
        assert_eq!(result.solve_time(), Duration::ZERO);
    }

    #[test]
    fn test_error_result_never_has_an_empty_message() {
        let result = SolveResult::error("");
        assert_eq!(result.error_message(), Some("unknown error"));
    }

    #[test]
    fn test_result_counts_its_solutions() {
        let solution = Solution {
            variables: BTreeMap::from([("x".to_string(), DataValue::Int(1))]),
            objective: None,
            is_optimal: false,
        };
        let result = SolveResult::new(
            SolveStatus::AllSolutions,
            vec![solution.clone(), solution],
            Duration::from_millis(3),
        );
        assert_eq!(result.num_solutions(), 2);
        assert!(result.error_message().is_none());
    }
}
