use std::time::Duration;

use super::data_value::DataValue;
use super::value_objects::EngineStatus;

/// Field the engine uses to report the objective value of an assignment
pub const OBJECTIVE_FIELD: &str = "_objective";

/// One assignment exactly as reported, in the engine's field order.
///
/// May include engine bookkeeping fields such as `_objective`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignment {
    pub fields: Vec<(String, DataValue)>,
}

impl Assignment {
    pub fn new(fields: Vec<(String, DataValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn objective(&self) -> Option<f64> {
        self.get(OBJECTIVE_FIELD).and_then(DataValue::as_f64)
    }
}

/// Statistics reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineStatistics {
    pub solve_time: Option<Duration>,
    pub flat_time: Option<Duration>,
    pub nodes: Option<u64>,
    pub failures: Option<u64>,
}

/// Everything the engine reported for one solve
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineOutcome {
    /// Assignments in reporting order
    pub assignments: Vec<Assignment>,
    /// Final status line, if the engine got to print one
    pub status: Option<EngineStatus>,
    pub statistics: EngineStatistics,
    /// The hard deadline fired and the engine was stopped
    pub timed_out: bool,
}
