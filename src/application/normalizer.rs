// Result normalization: engine outcome -> tool SolveResult
//
// Classification is one decision table from (engine status, anything found?)
// to a normalized status plus the rule for picking which assignments to report.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::{
    Assignment, EngineOutcome, EngineStatus, SolveMethod, SolveResult, SolveStatus, Solution,
};

/// Names starting with this marker are engine bookkeeping, never variables
pub const RESERVED_PREFIX: &str = "_";

pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Which reported assignments become solutions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extraction {
    Nothing,
    /// Only the last assignment (the engine's final answer)
    Last,
    /// Every assignment in reporting order
    Every,
}

fn classify(
    status: Option<EngineStatus>,
    found_any: bool,
    all_solutions: bool,
) -> (SolveStatus, Extraction) {
    let found = if all_solutions {
        Extraction::Every
    } else {
        Extraction::Last
    };

    match (status, found_any) {
        (Some(EngineStatus::Unsatisfiable), _) => (SolveStatus::Unsatisfiable, Extraction::Nothing),
        (Some(EngineStatus::AllSolutions), true) => (SolveStatus::AllSolutions, Extraction::Every),
        (Some(EngineStatus::AllSolutions), false) => {
            (SolveStatus::Unsatisfiable, Extraction::Nothing)
        }
        (Some(EngineStatus::OptimalSolution), true) => (SolveStatus::Optimal, found),
        (_, true) => (SolveStatus::Satisfied, found),
        (_, false) => (SolveStatus::Unknown, Extraction::Nothing),
    }
}

/// Build the tool result for a finished (or stopped) solve.
///
/// Engine errors never reach this point; they are reported as `SolverError`.
pub fn normalize(outcome: EngineOutcome, method: SolveMethod, all_solutions: bool) -> SolveResult {
    let (status, extraction) = classify(
        outcome.status,
        !outcome.assignments.is_empty(),
        all_solutions,
    );

    let picked: Vec<Assignment> = match extraction {
        Extraction::Nothing => Vec::new(),
        Extraction::Last => outcome.assignments.into_iter().last().into_iter().collect(),
        Extraction::Every => outcome.assignments,
    };

    let last_index = picked.len().saturating_sub(1);
    let solutions = picked
        .into_iter()
        .enumerate()
        .map(|(index, assignment)| {
            to_solution(
                assignment,
                method,
                status == SolveStatus::Optimal && index == last_index,
            )
        })
        .collect();

    let solve_time = outcome.statistics.solve_time.unwrap_or(Duration::ZERO);
    SolveResult::new(status, solutions, solve_time)
}

fn to_solution(assignment: Assignment, method: SolveMethod, is_optimal: bool) -> Solution {
    let objective = if method.is_optimization() {
        assignment.objective()
    } else {
        None
    };

    let variables: BTreeMap<_, _> = assignment
        .fields
        .into_iter()
        .filter(|(name, _)| !is_reserved_name(name))
        .collect();

    Solution {
        variables,
        objective,
        is_optimal,
    }
}
