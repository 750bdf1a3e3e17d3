// Mappers: Convert between gRPC protobuf types and domain models
// Protobuf types stay in this module and the gRPC service; the façade only sees domain types.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::templates::{KnapsackProblem, QueensProblem};
use crate::domain::{
    DataValue, Result, SolveRequest, SolveResult, SolveStatus, Solution, SolverError, SolverInfo,
    ValidationReport,
};

pub mod constraint_solver {
    tonic::include_proto!("constraint_solver");
}

use constraint_solver as proto;
use proto::data_value::Kind;

/// Convert a protobuf DataValue to a domain DataValue
pub fn proto_to_domain_value(value: proto::DataValue) -> Result<DataValue> {
    let kind = value
        .kind
        .ok_or_else(|| SolverError::InvalidRequest("data value without a kind".to_string()))?;

    Ok(match kind {
        Kind::BoolValue(b) => DataValue::Bool(b),
        Kind::IntValue(i) => DataValue::Int(i),
        Kind::FloatValue(f) => DataValue::Float(f),
        Kind::StringValue(s) => DataValue::Text(s),
        Kind::ArrayValue(list) => DataValue::Array(proto_to_domain_list(list)?),
        Kind::SetValue(list) => DataValue::Set(proto_to_domain_list(list)?),
        Kind::RecordValue(map) => DataValue::Record(proto_to_domain_map(map.fields)?),
        Kind::Absent(_) => DataValue::Absent,
    })
}

fn proto_to_domain_list(list: proto::ValueList) -> Result<Vec<DataValue>> {
    list.values.into_iter().map(proto_to_domain_value).collect()
}

fn proto_to_domain_map(
    fields: HashMap<String, proto::DataValue>,
) -> Result<BTreeMap<String, DataValue>> {
    fields
        .into_iter()
        .map(|(name, value)| {
            proto_to_domain_value(value)
                .map(|value| (name.clone(), value))
                .map_err(|e| match e {
                    SolverError::InvalidRequest(reason) => {
                        SolverError::InvalidRequest(format!("'{}': {}", name, reason))
                    }
                    other => other,
                })
        })
        .collect()
}

/// Convert a domain DataValue to a protobuf DataValue
pub fn domain_to_proto_value(value: DataValue) -> proto::DataValue {
    let kind = match value {
        DataValue::Bool(b) => Kind::BoolValue(b),
        DataValue::Int(i) => Kind::IntValue(i),
        DataValue::Float(f) => Kind::FloatValue(f),
        DataValue::Text(s) => Kind::StringValue(s),
        DataValue::Array(items) => Kind::ArrayValue(domain_to_proto_list(items)),
        DataValue::Set(items) => Kind::SetValue(domain_to_proto_list(items)),
        DataValue::Record(fields) => Kind::RecordValue(proto::ValueMap {
            fields: domain_to_proto_map(fields),
        }),
        DataValue::Absent => Kind::Absent(proto::Absent {}),
    };
    proto::DataValue { kind: Some(kind) }
}

fn domain_to_proto_list(items: Vec<DataValue>) -> proto::ValueList {
    proto::ValueList {
        values: items.into_iter().map(domain_to_proto_value).collect(),
    }
}

fn domain_to_proto_map(fields: BTreeMap<String, DataValue>) -> HashMap<String, proto::DataValue> {
    fields
        .into_iter()
        .map(|(name, value)| (name, domain_to_proto_value(value)))
        .collect()
}

/// Seconds on the wire to a positive Duration
pub fn proto_to_domain_timeout(seconds: Option<f64>) -> Result<Option<Duration>> {
    let Some(seconds) = seconds else {
        return Ok(None);
    };
    if seconds.is_nan() || seconds <= 0.0 {
        return Err(SolverError::InvalidRequest(format!(
            "timeout must be a positive number of seconds, got {}",
            seconds
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map(Some)
        .map_err(|e| SolverError::InvalidRequest(format!("timeout {}: {}", seconds, e)))
}

/// Convert a protobuf SolveRequest to a domain SolveRequest
pub fn proto_to_domain_request(request: proto::SolveRequest) -> Result<SolveRequest> {
    Ok(SolveRequest {
        model: request.model,
        data: proto_to_domain_map(request.data)?,
        solver: request.solver,
        all_solutions: request.all_solutions,
        timeout: proto_to_domain_timeout(request.timeout_seconds)?,
    })
}

pub fn proto_to_domain_queens(request: proto::QueensRequest) -> Result<QueensProblem> {
    Ok(QueensProblem {
        n: request.n,
        all_solutions: request.all_solutions,
        solver: request.solver,
        timeout: proto_to_domain_timeout(request.timeout_seconds)?,
    })
}

pub fn proto_to_domain_knapsack(request: proto::KnapsackRequest) -> Result<KnapsackProblem> {
    Ok(KnapsackProblem {
        weights: request.weights,
        values: request.values,
        capacity: request.capacity,
        solver: request.solver,
        timeout: proto_to_domain_timeout(request.timeout_seconds)?,
    })
}

fn domain_to_proto_status(status: SolveStatus) -> proto::SolveStatus {
    match status {
        SolveStatus::Satisfied => proto::SolveStatus::Satisfied,
        SolveStatus::AllSolutions => proto::SolveStatus::AllSolutions,
        SolveStatus::Optimal => proto::SolveStatus::Optimal,
        SolveStatus::Unsatisfiable => proto::SolveStatus::Unsatisfiable,
        SolveStatus::Unknown => proto::SolveStatus::Unknown,
        SolveStatus::Error => proto::SolveStatus::Error,
    }
}

fn domain_to_proto_solution(solution: Solution) -> proto::Solution {
    proto::Solution {
        variables: domain_to_proto_map(solution.variables),
        objective: solution.objective,
        is_optimal: solution.is_optimal,
    }
}

/// Convert a domain SolveResult to a protobuf SolveResult
pub fn domain_to_proto_result(result: SolveResult) -> proto::SolveResult {
    let status = domain_to_proto_status(result.status()) as i32;
    let solve_time = result.solve_time().as_secs_f64();
    let error = result.error_message().map(str::to_string);
    let solutions: Vec<proto::Solution> = result
        .into_solutions()
        .into_iter()
        .map(domain_to_proto_solution)
        .collect();

    proto::SolveResult {
        num_solutions: u32::try_from(solutions.len()).unwrap_or(u32::MAX),
        solutions,
        status,
        solve_time,
        error,
    }
}

pub fn domain_to_proto_solver(info: SolverInfo) -> proto::SolverInfo {
    proto::SolverInfo {
        id: info.id,
        name: info.name,
        version: info.version,
        tags: info.tags,
    }
}

pub fn domain_to_proto_validation(report: ValidationReport) -> proto::ValidationResult {
    proto::ValidationResult {
        valid: report.valid,
        error: report.error,
        message: report.message,
    }
}
