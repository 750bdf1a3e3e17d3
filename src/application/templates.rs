// Ready-made models behind the convenience tools

use std::time::Duration;

use crate::domain::{DataValue, Result, SolveRequest, SolverError};

pub const QUEENS_MODEL: &str = r#"
include "alldifferent.mzn";
int: n;
array[1..n] of var 1..n: queens;
constraint alldifferent(queens);
constraint alldifferent([queens[i] + i | i in 1..n]);
constraint alldifferent([queens[i] - i | i in 1..n]);
solve satisfy;
"#;

pub const KNAPSACK_MODEL: &str = r#"
int: n;
set of int: ITEMS = 1..n;
array[ITEMS] of int: weights;
array[ITEMS] of int: values;
int: capacity;
array[ITEMS] of var 0..1: take;
var int: total_weight = sum(i in ITEMS)(weights[i] * take[i]);
var int: total_value = sum(i in ITEMS)(values[i] * take[i]);
constraint total_weight <= capacity;
solve maximize total_value;
"#;

/// Parameters of the n-queens tool
#[derive(Debug, Clone)]
pub struct QueensProblem {
    pub n: u32,
    pub all_solutions: bool,
    pub solver: String,
    pub timeout: Option<Duration>,
}

impl QueensProblem {
    pub fn into_request(self) -> Result<SolveRequest> {
        if self.n == 0 {
            return Err(SolverError::InvalidRequest(
                "n must be at least 1".to_string(),
            ));
        }
        let mut request = SolveRequest::new(QUEENS_MODEL)
            .with_solver(self.solver)
            .with_data("n", i64::from(self.n))
            .with_all_solutions(self.all_solutions);
        request.timeout = self.timeout;
        Ok(request)
    }
}

/// Parameters of the 0/1 knapsack tool
#[derive(Debug, Clone)]
pub struct KnapsackProblem {
    pub weights: Vec<i64>,
    pub values: Vec<i64>,
    pub capacity: i64,
    pub solver: String,
    pub timeout: Option<Duration>,
}

impl KnapsackProblem {
    pub fn into_request(self) -> Result<SolveRequest> {
        if self.weights.is_empty() {
            return Err(SolverError::InvalidRequest(
                "at least one item is required".to_string(),
            ));
        }
        if self.weights.len() != self.values.len() {
            return Err(SolverError::InvalidRequest(format!(
                "{} weights but {} values",
                self.weights.len(),
                self.values.len()
            )));
        }
        if self.capacity < 0 {
            return Err(SolverError::InvalidRequest(
                "capacity must not be negative".to_string(),
            ));
        }

        let mut request = SolveRequest::new(KNAPSACK_MODEL)
            .with_solver(self.solver)
            .with_data("n", self.weights.len() as i64)
            .with_data("weights", DataValue::from(self.weights))
            .with_data("values", DataValue::from(self.values))
            .with_data("capacity", self.capacity);
        request.timeout = self.timeout;
        Ok(request)
    }
}
