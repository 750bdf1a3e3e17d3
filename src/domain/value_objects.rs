// Domain value objects representing core solving concepts

use std::fmt;

/// Normalized status of a solve, independent of the engine's own vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// At least one feasible assignment; optimality not proven (or not asked for)
    Satisfied,
    /// Enumeration completed, every satisfying assignment was returned
    AllSolutions,
    /// Objective proven optimal
    Optimal,
    /// Proven that no assignment exists
    Unsatisfiable,
    /// Search inconclusive, e.g. stopped by a timeout with nothing found
    Unknown,
    /// The request could not be carried out
    Error,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Satisfied => "SATISFIED",
            SolveStatus::AllSolutions => "ALL_SOLUTIONS",
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Unsatisfiable => "UNSATISFIABLE",
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::Error => "ERROR",
        }
    }

    pub fn has_solutions(&self) -> bool {
        matches!(
            self,
            SolveStatus::Satisfied | SolveStatus::AllSolutions | SolveStatus::Optimal
        )
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status line reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Satisfied,
    AllSolutions,
    OptimalSolution,
    Unsatisfiable,
    Unbounded,
    UnsatOrUnbounded,
    Unknown,
    Error,
}

impl EngineStatus {
    /// Parse the engine's wire name (`OPTIMAL_SOLUTION`, `UNSATISFIABLE`, ...)
    pub fn from_engine_name(name: &str) -> Option<Self> {
        match name {
            "SATISFIED" => Some(EngineStatus::Satisfied),
            "ALL_SOLUTIONS" => Some(EngineStatus::AllSolutions),
            "OPTIMAL_SOLUTION" => Some(EngineStatus::OptimalSolution),
            "UNSATISFIABLE" => Some(EngineStatus::Unsatisfiable),
            "UNBOUNDED" => Some(EngineStatus::Unbounded),
            "UNSAT_OR_UNBOUNDED" => Some(EngineStatus::UnsatOrUnbounded),
            "UNKNOWN" => Some(EngineStatus::Unknown),
            "ERROR" => Some(EngineStatus::Error),
            _ => None,
        }
    }
}

/// Solve item of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMethod {
    /// `solve satisfy`
    #[default]
    Satisfy,
    /// `solve minimize <expr>`
    Minimize,
    /// `solve maximize <expr>`
    Maximize,
}

impl SolveMethod {
    pub fn from_interface_name(name: &str) -> Option<Self> {
        match name {
            "sat" => Some(SolveMethod::Satisfy),
            "min" => Some(SolveMethod::Minimize),
            "max" => Some(SolveMethod::Maximize),
            _ => None,
        }
    }

    pub fn is_optimization(&self) -> bool {
        !matches!(self, SolveMethod::Satisfy)
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMethod::Satisfy => write!(f, "satisfy"),
            SolveMethod::Minimize => write!(f, "minimize"),
            SolveMethod::Maximize => write!(f, "maximize"),
        }
    }
}
