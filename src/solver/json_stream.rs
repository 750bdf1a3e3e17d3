// Decoding of MiniZinc's machine-readable output:
// `--json-stream` messages, `--solvers-json` and `--model-interface-only`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::domain::{
    Assignment, BackendDescriptor, BaseType, DataValue, EngineOutcome, EngineStatistics,
    EngineStatus, ModelInterface, ParamSpec, SolveMethod, SolverError,
};

/// One line of `--json-stream` output
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamMessage {
    Solution {
        #[serde(default)]
        output: Map<String, Value>,
    },
    Status {
        status: String,
    },
    Statistics {
        #[serde(default)]
        statistics: Map<String, Value>,
    },
    Error {
        what: Option<String>,
        message: Option<String>,
        location: Option<Location>,
    },
    Warning {
        message: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub filename: Option<String>,
    pub first_line: Option<u64>,
    pub first_column: Option<u64>,
}

/// Error reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDiagnostic {
    pub what: Option<String>,
    pub message: String,
    pub location: Option<Location>,
}

impl EngineDiagnostic {
    /// Syntax, type, include, evaluation and assertion failures are problems of
    /// the model or its data; anything else happened while solving.
    pub fn is_model_error(&self) -> bool {
        match self.what.as_deref() {
            Some(what) => {
                ["syntax", "type", "include", "evaluation", "assertion"]
                    .iter()
                    .any(|kind| what.contains(kind))
                    || self.location.is_some()
            }
            None => self.location.is_some(),
        }
    }
}

impl fmt::Display for EngineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.what {
            Some(what) if !self.message.is_empty() => write!(f, "{}: {}", what, self.message)?,
            Some(what) => write!(f, "{}", what)?,
            None => write!(f, "{}", self.message)?,
        }
        if let Some(Location {
            first_line: Some(line),
            first_column,
            ..
        }) = &self.location
        {
            match first_column {
                Some(column) => write!(f, " (line {}, column {})", line, column)?,
                None => write!(f, " (line {})", line)?,
            }
        }
        Ok(())
    }
}

/// Turn engine diagnostics into the matching error category
pub fn diagnostics_to_error(diagnostics: &[EngineDiagnostic]) -> SolverError {
    let text = diagnostics
        .iter()
        .map(EngineDiagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    if diagnostics.iter().any(EngineDiagnostic::is_model_error) {
        SolverError::Model(text)
    } else {
        SolverError::Solve(text)
    }
}

/// Accumulates `--json-stream` lines into an [`EngineOutcome`]
#[derive(Debug, Default)]
pub struct StreamCollector {
    assignments: Vec<Assignment>,
    status: Option<EngineStatus>,
    statistics: EngineStatistics,
    diagnostics: Vec<EngineDiagnostic>,
}

impl StreamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<StreamMessage>(line) {
            Ok(message) => self.push(message),
            Err(_) => log::debug!("Ignoring engine output line: {}", line),
        }
    }

    fn push(&mut self, message: StreamMessage) {
        match message {
            StreamMessage::Solution { output } => {
                self.assignments.push(decode_solution_output(&output));
            }
            StreamMessage::Status { status } => match EngineStatus::from_engine_name(&status) {
                Some(status) => self.status = Some(status),
                None => log::warn!("Unrecognized engine status '{}'", status),
            },
            StreamMessage::Statistics { statistics } => self.merge_statistics(&statistics),
            StreamMessage::Error {
                what,
                message,
                location,
            } => self.diagnostics.push(EngineDiagnostic {
                what,
                message: message.unwrap_or_default(),
                location,
            }),
            StreamMessage::Warning { message } => {
                log::warn!("MiniZinc: {}", message.unwrap_or_default());
            }
            StreamMessage::Other => {}
        }
    }

    fn merge_statistics(&mut self, statistics: &Map<String, Value>) {
        if let Some(time) = seconds(statistics.get("solveTime")) {
            self.statistics.solve_time = Some(time);
        }
        if let Some(time) = seconds(statistics.get("flatTime")) {
            self.statistics.flat_time = Some(time);
        }
        if let Some(nodes) = statistics.get("nodes").and_then(Value::as_u64) {
            self.statistics.nodes = Some(nodes);
        }
        if let Some(failures) = statistics.get("failures").and_then(Value::as_u64) {
            self.statistics.failures = Some(failures);
        }
    }

    pub fn diagnostics(&self) -> &[EngineDiagnostic] {
        &self.diagnostics
    }

    pub fn solutions_seen(&self) -> usize {
        self.assignments.len()
    }

    pub fn finish(self, timed_out: bool) -> (EngineOutcome, Vec<EngineDiagnostic>) {
        let outcome = EngineOutcome {
            assignments: self.assignments,
            status: self.status,
            statistics: self.statistics,
            timed_out,
        };
        (outcome, self.diagnostics)
    }
}

fn seconds(value: Option<&Value>) -> Option<Duration> {
    value
        .and_then(Value::as_f64)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

fn decode_solution_output(output: &Map<String, Value>) -> Assignment {
    let json = match output.get("json") {
        Some(Value::Object(fields)) => Some(fields.clone()),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => Some(fields),
            _ => None,
        },
        _ => None,
    };

    match json {
        Some(fields) => Assignment::new(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), DataValue::from_engine_json(value)))
                .collect(),
        ),
        None => {
            log::debug!("Solution without JSON section: {:?}", output.keys().collect::<Vec<_>>());
            Assignment::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolverConfigEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    std_flags: Vec<String>,
}

/// Decode the output of `minizinc --solvers-json`
pub fn decode_solvers(stdout: &str) -> serde_json::Result<Vec<BackendDescriptor>> {
    let entries: Vec<SolverConfigEntry> = serde_json::from_str(stdout.trim())?;
    Ok(entries
        .into_iter()
        .map(|entry| BackendDescriptor {
            id: entry.id,
            name: entry.name,
            version: entry.version,
            tags: entry.tags,
            std_flags: entry.std_flags,
        })
        .collect())
}

/// Find the model interface in the output of `minizinc --model-interface-only`.
/// Both a single JSON document and a line-per-message stream are accepted.
pub fn decode_interface(stdout: &str) -> Option<ModelInterface> {
    if let Ok(value) = serde_json::from_str::<Value>(stdout.trim()) {
        if let Some(interface) = interface_from_value(&value) {
            return Some(interface);
        }
    }
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
        .find_map(|value| interface_from_value(&value))
}

fn interface_from_value(value: &Value) -> Option<ModelInterface> {
    let object = value.as_object()?;
    let tagged = object.get("type").and_then(Value::as_str) == Some("interface");
    if !tagged && !(object.contains_key("method") && object.contains_key("input")) {
        return None;
    }

    let method = object
        .get("method")
        .and_then(Value::as_str)
        .and_then(SolveMethod::from_interface_name)
        .unwrap_or_default();

    Some(ModelInterface {
        inputs: param_specs(object.get("input")),
        outputs: param_specs(object.get("output")),
        method,
    })
}

fn param_specs(section: Option<&Value>) -> BTreeMap<String, ParamSpec> {
    section
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .map(|(name, spec)| (name.clone(), param_spec(spec)))
                .collect()
        })
        .unwrap_or_default()
}

fn param_spec(spec: &Value) -> ParamSpec {
    let base = spec
        .get("type")
        .and_then(Value::as_str)
        .map(BaseType::from_interface_name)
        .unwrap_or(BaseType::Other(String::new()));
    ParamSpec {
        base,
        dim: spec.get("dim").and_then(Value::as_u64).unwrap_or(0) as usize,
        set: spec.get("set").and_then(Value::as_bool).unwrap_or(false),
        optional: spec.get("optional").and_then(Value::as_bool).unwrap_or(false),
    }
}
