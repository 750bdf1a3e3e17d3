// Example client for the constraint solver tools service
//
// Lists the installed solvers, validates a model, then solves:
// - a small satisfaction problem with data (x + y = n, x < y)
// - 6-queens, enumerating every placement
// - a 0/1 knapsack with four items and capacity 7

use std::collections::HashMap;

use tonic::Request;

pub mod constraint_solver {
    tonic::include_proto!("constraint_solver");
}

use constraint_solver::{
    constraint_solver_tools_client::ConstraintSolverToolsClient, data_value::Kind, DataValue,
    Empty, KnapsackRequest, QueensRequest, SolveRequest, SolveResult, SolveStatus,
    ValidateModelRequest,
};

const SUM_MODEL: &str = "
int: n;
var 0..n: x;
var 0..n: y;
constraint x + y = n;
constraint x < y;
solve satisfy;
";

fn describe(value: &DataValue) -> String {
    match &value.kind {
        Some(Kind::BoolValue(b)) => b.to_string(),
        Some(Kind::IntValue(i)) => i.to_string(),
        Some(Kind::FloatValue(f)) => f.to_string(),
        Some(Kind::StringValue(s)) => s.clone(),
        Some(Kind::ArrayValue(list)) => format!(
            "[{}]",
            list.values.iter().map(describe).collect::<Vec<_>>().join(", ")
        ),
        Some(Kind::SetValue(list)) => format!(
            "{{{}}}",
            list.values.iter().map(describe).collect::<Vec<_>>().join(", ")
        ),
        Some(Kind::RecordValue(map)) => format!("{:?}", map.fields.keys().collect::<Vec<_>>()),
        Some(Kind::Absent(_)) | None => "<>".to_string(),
    }
}

fn print_result(title: &str, result: &SolveResult) {
    let status = SolveStatus::try_from(result.status)
        .map(|s| s.as_str_name())
        .unwrap_or("?");
    println!("=== {} ===", title);
    println!("Status: {} ({} solution(s), {:.3}s)", status, result.num_solutions, result.solve_time);
    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }
    for (i, solution) in result.solutions.iter().enumerate().take(5) {
        let mut names: Vec<_> = solution.variables.keys().collect();
        names.sort();
        let assignment: Vec<String> = names
            .into_iter()
            .map(|name| format!("{} = {}", name, describe(&solution.variables[name])))
            .collect();
        print!("  #{}: {}", i + 1, assignment.join(", "));
        if let Some(objective) = solution.objective {
            print!("  (objective {}{})", objective, if solution.is_optimal { ", optimal" } else { "" });
        }
        println!();
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ConstraintSolverToolsClient::connect("http://127.0.0.1:50051").await?;

    let solvers = client.list_solvers(Request::new(Empty {})).await?.into_inner();
    println!("=== Installed solvers ===");
    for solver in &solvers.solvers {
        println!("  {} {} ({})", solver.id, solver.version, solver.tags.join(", "));
    }
    println!();

    let report = client
        .validate_model(Request::new(ValidateModelRequest {
            model: SUM_MODEL.to_string(),
        }))
        .await?
        .into_inner();
    println!("Validation: {} {}\n", report.message, report.error.unwrap_or_default());

    let sum = client
        .solve_constraint(Request::new(SolveRequest {
            model: SUM_MODEL.to_string(),
            data: HashMap::from([(
                "n".to_string(),
                DataValue {
                    kind: Some(Kind::IntValue(10)),
                },
            )]),
            solver: "default".to_string(),
            all_solutions: true,
            timeout_seconds: Some(10.0),
        }))
        .await?
        .into_inner();
    print_result("x + y = 10, x < y", &sum);

    let queens = client
        .solve_queens(Request::new(QueensRequest {
            n: 6,
            all_solutions: true,
            solver: String::new(),
            timeout_seconds: Some(10.0),
        }))
        .await?
        .into_inner();
    print_result("6 queens", &queens);

    let knapsack = client
        .solve_knapsack(Request::new(KnapsackRequest {
            weights: vec![2, 3, 4, 5],
            values: vec![3, 4, 5, 6],
            capacity: 7,
            solver: String::new(),
            timeout_seconds: Some(10.0),
        }))
        .await?
        .into_inner();
    print_result("Knapsack (capacity 7)", &knapsack);

    Ok(())
}
