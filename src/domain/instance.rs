// Engine-facing types: backends, parsed models and data-bound instances

use std::collections::BTreeMap;
use std::time::Duration;

use super::data_value::DataValue;
use super::solver_service::{Result, SolverError};
use super::value_objects::SolveMethod;

/// Solver backend registered with the engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub tags: Vec<String>,
    /// Standard command-line flags the backend understands (`-a`, `-i`, ...)
    pub std_flags: Vec<String>,
}

impl BackendDescriptor {
    /// Whether `query` designates this backend: exact id, the last segment of
    /// a dotted id, one of its tags, or its display name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.id == query
            || self
                .id
                .rsplit('.')
                .next()
                .is_some_and(|last| last.eq_ignore_ascii_case(query))
            || self.tags.iter().any(|tag| tag.eq_ignore_ascii_case(query))
            || self.name.eq_ignore_ascii_case(query)
    }

    pub fn supports_flag(&self, flag: &str) -> bool {
        self.std_flags.iter().any(|f| f == flag)
    }
}

/// Element type of a declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Float,
    Bool,
    String,
    /// Anything the shape check does not know about (records, tuples, annotations)
    Other(String),
}

impl BaseType {
    pub fn from_interface_name(name: &str) -> Self {
        match name {
            "int" => BaseType::Int,
            "float" => BaseType::Float,
            "bool" => BaseType::Bool,
            "string" => BaseType::String,
            other => BaseType::Other(other.to_string()),
        }
    }
}

/// Declared shape of a model parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub base: BaseType,
    /// Number of array dimensions, 0 for scalars and sets
    pub dim: usize,
    pub set: bool,
    pub optional: bool,
}

impl ParamSpec {
    pub fn scalar(base: BaseType) -> Self {
        Self {
            base,
            dim: 0,
            set: false,
            optional: false,
        }
    }

    pub fn array(base: BaseType, dim: usize) -> Self {
        Self {
            dim,
            ..Self::scalar(base)
        }
    }

    pub fn set_of(base: BaseType) -> Self {
        Self {
            set: true,
            ..Self::scalar(base)
        }
    }

    /// Check `value` against this shape, returning it in the form the engine
    /// expects (lists given for sets become sets, ints given for floats stay ints).
    pub fn conform(&self, value: DataValue) -> std::result::Result<DataValue, String> {
        self.conform_at(value, self.dim)
    }

    fn conform_at(&self, value: DataValue, dims_left: usize) -> std::result::Result<DataValue, String> {
        if dims_left > 0 {
            return match value {
                DataValue::Array(items) => items
                    .into_iter()
                    .map(|item| self.conform_at(item, dims_left - 1))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(DataValue::Array),
                other => Err(format!(
                    "expected a {}-dimensional array, got {}",
                    dims_left,
                    other.kind_name()
                )),
            };
        }

        if self.set {
            return match value {
                DataValue::Set(items) | DataValue::Array(items) => items
                    .into_iter()
                    .map(|item| self.conform_scalar(item, false))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(DataValue::Set),
                DataValue::Absent if self.optional => Ok(DataValue::Absent),
                other => Err(format!("expected a set, got {}", other.kind_name())),
            };
        }

        self.conform_scalar(value, self.optional)
    }

    fn conform_scalar(&self, value: DataValue, optional: bool) -> std::result::Result<DataValue, String> {
        let accepted = match (&self.base, &value) {
            (_, DataValue::Absent) => optional,
            (BaseType::Int, DataValue::Int(_)) => true,
            (BaseType::Float, DataValue::Int(_) | DataValue::Float(_)) => true,
            (BaseType::Bool, DataValue::Bool(_)) => true,
            (BaseType::String, DataValue::Text(_)) => true,
            // Enum-typed parameters are declared as int but bound by constant name
            (BaseType::Int, DataValue::Text(_)) => true,
            (BaseType::Other(_), _) => true,
            _ => false,
        };
        if accepted {
            Ok(value)
        } else {
            Err(format!("expected {}, got {}", self.describe_base(), value.kind_name()))
        }
    }

    fn describe_base(&self) -> String {
        match &self.base {
            BaseType::Int => "int".to_string(),
            BaseType::Float => "float".to_string(),
            BaseType::Bool => "bool".to_string(),
            BaseType::String => "string".to_string(),
            BaseType::Other(name) => name.clone(),
        }
    }
}

/// What the engine reports about a model without solving it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelInterface {
    /// Parameters that still need data
    pub inputs: BTreeMap<String, ParamSpec>,
    /// Output (decision) variables
    pub outputs: BTreeMap<String, ParamSpec>,
    pub method: SolveMethod,
}

/// Parsed model: its source and the interface the engine derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub source: String,
    pub interface: ModelInterface,
}

impl Model {
    pub fn new(source: impl Into<String>, interface: ModelInterface) -> Self {
        Self {
            source: source.into(),
            interface,
        }
    }

    pub fn method(&self) -> SolveMethod {
        self.interface.method
    }
}

/// A model bound to a backend and to concrete data
#[derive(Debug, Clone)]
pub struct Instance {
    backend: BackendDescriptor,
    model: Model,
    data: BTreeMap<String, DataValue>,
}

impl Instance {
    pub fn new(backend: BackendDescriptor, model: Model) -> Self {
        Self {
            backend,
            model,
            data: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> &BackendDescriptor {
        &self.backend
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn data(&self) -> &BTreeMap<String, DataValue> {
        &self.data
    }

    /// Bind `name` to `value` after checking it against the declared parameter
    pub fn bind(&mut self, name: &str, value: DataValue) -> Result<()> {
        let spec = self.model.interface.inputs.get(name).ok_or_else(|| {
            SolverError::Model(format!(
                "'{}' is not a parameter of the model that accepts data",
                name
            ))
        })?;
        let value = spec
            .conform(value)
            .map_err(|reason| SolverError::Model(format!("invalid value for '{}': {}", name, reason)))?;
        self.data.insert(name.to_string(), value);
        Ok(())
    }
}

/// How a single solve should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveOptions {
    pub all_solutions: bool,
    pub timeout: Option<Duration>,
}
