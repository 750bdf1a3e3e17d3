// Tool façade behavior over an in-memory engine

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use minizinc_tools::domain::{
    Assignment, BackendDescriptor, BaseType, ConstraintEngine, DataValue, EngineOutcome,
    EngineStatistics, EngineStatus, Instance, Model, ModelInterface, ParamSpec, Result,
    SolveMethod, SolveOptions, SolveRequest, SolveStatus, SolverError,
};
use minizinc_tools::{ConstraintToolService, KnapsackProblem, QueensProblem};

fn backend(id: &str, name: &str, tags: &[&str]) -> BackendDescriptor {
    BackendDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        version: "1.0".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        std_flags: vec!["-a".to_string(), "-i".to_string()],
    }
}

/// Engine that answers from fixed data and records what it was asked
struct FakeEngine {
    backends: Vec<BackendDescriptor>,
    broken_ids: Vec<String>,
    discovery_fails: bool,
    interface: ModelInterface,
    parse_error: Option<String>,
    outcome: EngineOutcome,
    solve_error: Option<String>,
    solve_delay: Option<Duration>,
    solved: Mutex<Vec<(String, BTreeMap<String, DataValue>, SolveOptions)>>,
}

impl FakeEngine {
    fn new() -> Self {
        Self {
            backends: vec![
                backend("org.gecode.gecode", "Gecode", &["cp", "int"]),
                backend("org.chuffed.chuffed", "Chuffed", &["cp", "lcg"]),
            ],
            broken_ids: Vec::new(),
            discovery_fails: false,
            interface: ModelInterface::default(),
            parse_error: None,
            outcome: EngineOutcome::default(),
            solve_error: None,
            solve_delay: None,
            solved: Mutex::new(Vec::new()),
        }
    }

    fn with_input(mut self, name: &str, spec: ParamSpec) -> Self {
        self.interface.inputs.insert(name.to_string(), spec);
        self
    }

    fn with_method(mut self, method: SolveMethod) -> Self {
        self.interface.method = method;
        self
    }

    fn with_outcome(mut self, status: Option<EngineStatus>, assignments: Vec<Assignment>) -> Self {
        self.outcome = EngineOutcome {
            assignments,
            status,
            statistics: EngineStatistics {
                solve_time: Some(Duration::from_millis(20)),
                ..EngineStatistics::default()
            },
            timed_out: false,
        };
        self
    }

    fn solve_calls(&self) -> usize {
        self.solved.lock().unwrap().len()
    }
}

#[tonic::async_trait]
impl ConstraintEngine for FakeEngine {
    async fn lookup(&self, solver_id: &str) -> Result<BackendDescriptor> {
        if self.broken_ids.iter().any(|id| id == solver_id) {
            return Err(SolverError::Lookup(format!("'{}' is broken", solver_id)));
        }
        self.backends
            .iter()
            .find(|b| b.id == solver_id)
            .or_else(|| self.backends.iter().find(|b| b.matches(solver_id)))
            .cloned()
            .ok_or_else(|| SolverError::Lookup(format!("no solver registered for '{}'", solver_id)))
    }

    async fn parse(&self, model_text: &str, _backend: &BackendDescriptor) -> Result<Model> {
        match &self.parse_error {
            Some(message) => Err(SolverError::Model(message.clone())),
            None => Ok(Model::new(model_text, self.interface.clone())),
        }
    }

    async fn solve(&self, instance: &Instance, options: &SolveOptions) -> Result<EngineOutcome> {
        self.solved.lock().unwrap().push((
            instance.backend().id.clone(),
            instance.data().clone(),
            *options,
        ));
        if let Some(delay) = self.solve_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.solve_error {
            Some(message) => Err(SolverError::Solve(message.clone())),
            None => Ok(self.outcome.clone()),
        }
    }

    async fn available_backend_ids(&self) -> Result<Vec<String>> {
        if self.discovery_fails {
            return Err(SolverError::Discovery("minizinc not found".to_string()));
        }
        let mut ids: Vec<String> = self.backends.iter().map(|b| b.id.clone()).collect();
        ids.extend(self.broken_ids.iter().cloned());
        Ok(ids)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn service(engine: FakeEngine) -> (ConstraintToolService, Arc<FakeEngine>) {
    let engine = Arc::new(engine);
    (ConstraintToolService::new(engine.clone()), engine)
}

fn xy(x: i64, y: i64) -> Assignment {
    Assignment::new(vec![
        ("x".to_string(), DataValue::Int(x)),
        ("y".to_string(), DataValue::Int(y)),
    ])
}

#[tokio::test]
async fn test_solve_with_data_reports_satisfied_solution() {
    let engine = FakeEngine::new()
        .with_input("n", ParamSpec::scalar(BaseType::Int))
        .with_outcome(None, vec![xy(3, 7)]);
    let (tools, engine) = service(engine);

    let result = tools
        .solve_constraint(SolveRequest::new("int: n; ...").with_data("n", 10))
        .await;

    assert_eq!(result.status(), SolveStatus::Satisfied);
    assert_eq!(result.num_solutions(), 1);
    assert!(result.error_message().is_none());
    assert_eq!(result.solutions()[0].get("x"), Some(&DataValue::Int(3)));
    assert_eq!(result.solve_time(), Duration::from_millis(20));

    let calls = engine.solved.lock().unwrap();
    assert_eq!(calls[0].0, "org.gecode.gecode");
    assert_eq!(calls[0].1["n"], DataValue::Int(10));
}

#[tokio::test]
async fn test_solve_passes_options_through() {
    let engine = FakeEngine::new().with_outcome(Some(EngineStatus::AllSolutions), vec![xy(0, 1)]);
    let (tools, engine) = service(engine);

    let result = tools
        .solve_constraint(
            SolveRequest::new("var 0..1: x; solve satisfy;")
                .with_solver("chuffed")
                .with_all_solutions(true)
                .with_timeout(Duration::from_secs(3)),
        )
        .await;

    assert_eq!(result.status(), SolveStatus::AllSolutions);
    let calls = engine.solved.lock().unwrap();
    assert_eq!(calls[0].0, "org.chuffed.chuffed");
    assert_eq!(
        calls[0].2,
        SolveOptions {
            all_solutions: true,
            timeout: Some(Duration::from_secs(3)),
        }
    );
}

#[tokio::test]
async fn test_default_alias_and_empty_solver_use_configured_default() {
    let engine = FakeEngine::new().with_outcome(None, vec![xy(1, 2)]);
    let engine = Arc::new(engine);
    let tools = ConstraintToolService::with_default_solver(engine.clone(), "chuffed");

    tools
        .solve_constraint(SolveRequest::new("solve satisfy;").with_solver("default"))
        .await;
    tools
        .solve_constraint(SolveRequest::new("solve satisfy;").with_solver(""))
        .await;

    let calls = engine.solved.lock().unwrap();
    assert!(calls.iter().all(|(id, _, _)| id == "org.chuffed.chuffed"));
}

#[tokio::test]
async fn test_request_without_solver_uses_configured_default() {
    let engine = Arc::new(FakeEngine::new().with_outcome(None, vec![xy(1, 2)]));
    let tools = ConstraintToolService::with_default_solver(engine.clone(), "chuffed");

    tools.solve_constraint(SolveRequest::new("solve satisfy;")).await;

    assert_eq!(engine.solved.lock().unwrap()[0].0, "org.chuffed.chuffed");
}

#[tokio::test]
async fn test_overlapping_solves_run_concurrently() {
    let mut engine = FakeEngine::new().with_outcome(None, vec![xy(1, 2)]);
    engine.solve_delay = Some(Duration::from_millis(400));
    let (tools, engine) = service(engine);

    let started = Instant::now();
    let (first, second) = tokio::join!(
        tools.solve_constraint(SolveRequest::new("solve satisfy;")),
        tools.solve_constraint(SolveRequest::new("solve satisfy;").with_solver("chuffed")),
    );
    let elapsed = started.elapsed();

    assert_eq!(first.status(), SolveStatus::Satisfied);
    assert_eq!(second.status(), SolveStatus::Satisfied);
    assert_eq!(engine.solve_calls(), 2);
    assert!(elapsed < Duration::from_millis(750), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    let engine = FakeEngine::new()
        .with_input("n", ParamSpec::scalar(BaseType::Int))
        .with_outcome(Some(EngineStatus::AllSolutions), vec![xy(1, 9), xy(2, 8)]);
    let (tools, _) = service(engine);
    let request = SolveRequest::new("int: n; ...")
        .with_data("n", 10)
        .with_all_solutions(true);

    let first = tools.solve_constraint(request.clone()).await;
    let second = tools.solve_constraint(request).await;

    assert_eq!(first.status(), SolveStatus::AllSolutions);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_solve_given_unknown_solver_should_error_without_solving() {
    let (tools, engine) = service(FakeEngine::new());

    let result = tools
        .solve_constraint(SolveRequest::new("solve satisfy;").with_solver("nonexistent"))
        .await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().contains("nonexistent"));
    assert!(result.solutions().is_empty());
    assert_eq!(engine.solve_calls(), 0);
}

#[tokio::test]
async fn test_solve_given_undeclared_binding_should_error() {
    let engine = FakeEngine::new().with_input("n", ParamSpec::scalar(BaseType::Int));
    let (tools, engine) = service(engine);

    let result = tools
        .solve_constraint(SolveRequest::new("int: n;").with_data("m", 3))
        .await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().contains("'m'"));
    assert_eq!(engine.solve_calls(), 0);
}

#[tokio::test]
async fn test_solve_given_mistyped_binding_should_error() {
    let engine = FakeEngine::new().with_input("n", ParamSpec::scalar(BaseType::Int));
    let (tools, _) = service(engine);

    let result = tools
        .solve_constraint(SolveRequest::new("int: n;").with_data("n", true))
        .await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().contains("expected int, got bool"));
}

#[tokio::test]
async fn test_solve_given_parse_error_should_preserve_message() {
    let mut engine = FakeEngine::new();
    engine.parse_error = Some("syntax error: unexpected identifier".to_string());
    let (tools, _) = service(engine);

    let result = tools
        .solve_constraint(SolveRequest::new("var 1..3 x; solve satisfy;"))
        .await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().contains("unexpected identifier"));
}

#[tokio::test]
async fn test_solve_given_engine_failure_should_error() {
    let mut engine = FakeEngine::new();
    engine.solve_error = Some("solver crashed".to_string());
    let (tools, _) = service(engine);

    let result = tools.solve_constraint(SolveRequest::new("solve satisfy;")).await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().contains("solver crashed"));
}

#[tokio::test]
async fn test_solve_given_blank_model_should_error_before_lookup() {
    let (tools, engine) = service(FakeEngine::new());

    let result = tools.solve_constraint(SolveRequest::new("   ")).await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert!(result.error_message().unwrap().starts_with("Invalid request"));
    assert_eq!(engine.solve_calls(), 0);
}

#[tokio::test]
async fn test_optimization_reports_objective_and_optimal_flag() {
    let with_objective = |x: i64| {
        Assignment::new(vec![
            ("x".to_string(), DataValue::Int(x)),
            ("_objective".to_string(), DataValue::Int(x)),
        ])
    };
    let engine = FakeEngine::new()
        .with_method(SolveMethod::Maximize)
        .with_outcome(
            Some(EngineStatus::OptimalSolution),
            vec![with_objective(1), with_objective(3)],
        );
    let (tools, _) = service(engine);

    let result = tools
        .solve_constraint(SolveRequest::new("var 0..3: x; solve maximize x;"))
        .await;

    assert_eq!(result.status(), SolveStatus::Optimal);
    assert_eq!(result.num_solutions(), 1);
    let solution = &result.solutions()[0];
    assert_eq!(solution.objective, Some(3.0));
    assert!(solution.is_optimal);
    assert!(solution.get("_objective").is_none());
}

#[tokio::test]
async fn test_list_solvers_returns_every_resolvable_backend() {
    let mut engine = FakeEngine::new();
    engine.broken_ids = vec!["org.broken.solver".to_string()];
    let (tools, _) = service(engine);

    let solvers = tools.list_solvers().await;

    let ids: Vec<_> = solvers.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["org.gecode.gecode", "org.chuffed.chuffed"]);
    assert_eq!(solvers[0].name, "Gecode");
    assert_eq!(solvers[0].tags, vec!["cp", "int"]);
}

#[tokio::test]
async fn test_list_solvers_given_discovery_failure_should_be_empty() {
    let mut engine = FakeEngine::new();
    engine.discovery_fails = true;
    let (tools, _) = service(engine);

    assert!(tools.list_solvers().await.is_empty());
}

#[tokio::test]
async fn test_validate_model_accepts_parseable_model() {
    let (tools, engine) = service(FakeEngine::new());

    let report = tools.validate_model("var 1..3: x; solve satisfy;").await;

    assert!(report.valid);
    assert_eq!(report.error, None);
    assert_eq!(report.message, "Model is syntactically valid");
    assert_eq!(engine.solve_calls(), 0);
}

#[tokio::test]
async fn test_validate_model_rejects_broken_model() {
    let mut engine = FakeEngine::new();
    engine.parse_error = Some("type error: undefined identifier `y'".to_string());
    let (tools, _) = service(engine);

    let report = tools.validate_model("var 1..3: x; constraint y > 0;").await;

    assert!(!report.valid);
    assert!(report.error.unwrap().contains("undefined identifier"));
    assert_eq!(report.message, "Model validation failed");
}

#[tokio::test]
async fn test_validate_model_given_empty_text_should_be_invalid() {
    let (tools, _) = service(FakeEngine::new());

    let report = tools.validate_model("").await;

    assert!(!report.valid);
    assert!(report.error.is_some());
}

#[tokio::test]
async fn test_validate_model_given_missing_default_solver_should_be_invalid() {
    let engine = Arc::new(FakeEngine::new());
    let tools = ConstraintToolService::with_default_solver(engine, "nonexistent");

    let report = tools.validate_model("solve satisfy;").await;

    assert!(!report.valid);
    assert!(report.error.unwrap().contains("Solver lookup failed"));
}

#[tokio::test]
async fn test_queens_binds_board_size() {
    let engine = FakeEngine::new()
        .with_input("n", ParamSpec::scalar(BaseType::Int))
        .with_outcome(Some(EngineStatus::AllSolutions), vec![xy(2, 4), xy(3, 1)]);
    let (tools, engine) = service(engine);

    let result = tools
        .solve_queens(QueensProblem {
            n: 4,
            all_solutions: true,
            solver: String::new(),
            timeout: None,
        })
        .await;

    assert_eq!(result.status(), SolveStatus::AllSolutions);
    assert_eq!(result.num_solutions(), 2);
    assert_eq!(engine.solved.lock().unwrap()[0].1["n"], DataValue::Int(4));
}

#[tokio::test]
async fn test_knapsack_given_no_items_should_error() {
    let (tools, engine) = service(FakeEngine::new());

    let result = tools
        .solve_knapsack(KnapsackProblem {
            weights: vec![],
            values: vec![],
            capacity: 5,
            solver: String::new(),
            timeout: None,
        })
        .await;

    assert_eq!(result.status(), SolveStatus::Error);
    assert_eq!(engine.solve_calls(), 0);
}
