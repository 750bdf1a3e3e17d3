// Literal values exchanged with the engine: data bindings on the way in,
// reported variable values on the way out.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Set ranges wider than this stay as a `[lo, hi]` pair instead of being expanded.
const MAX_EXPANDED_RANGE: i64 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Strings and enum constants
    Text(String),
    Array(Vec<DataValue>),
    Set(Vec<DataValue>),
    Record(BTreeMap<String, DataValue>),
    /// The absent value `<>` of optional types
    Absent,
}

impl DataValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataValue::Bool(_) => "bool",
            DataValue::Int(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::Text(_) => "string",
            DataValue::Array(_) => "array",
            DataValue::Set(_) => "set",
            DataValue::Record(_) => "record",
            DataValue::Absent => "absent",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(v) => Some(*v as f64),
            DataValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::Array(items) | DataValue::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Encode in the MiniZinc JSON data format.
    pub fn to_engine_json(&self) -> Value {
        match self {
            DataValue::Bool(v) => Value::Bool(*v),
            DataValue::Int(v) => Value::Number((*v).into()),
            DataValue::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            DataValue::Text(v) => Value::String(v.clone()),
            DataValue::Array(items) => {
                Value::Array(items.iter().map(DataValue::to_engine_json).collect())
            }
            DataValue::Set(items) => {
                let mut object = Map::new();
                object.insert(
                    "set".to_string(),
                    Value::Array(items.iter().map(DataValue::to_engine_json).collect()),
                );
                Value::Object(object)
            }
            DataValue::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_engine_json()))
                    .collect(),
            ),
            DataValue::Absent => Value::Null,
        }
    }

    /// Decode a value from the engine's JSON output.
    ///
    /// `{"set": [...]}` becomes a [`DataValue::Set`] with ranges expanded,
    /// `{"e": name}` becomes the enum constant's name.
    pub fn from_engine_json(value: &Value) -> Self {
        match value {
            Value::Null => DataValue::Absent,
            Value::Bool(v) => DataValue::Bool(*v),
            Value::Number(n) => match n.as_i64() {
                Some(v) => DataValue::Int(v),
                None => DataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DataValue::Text(s.clone()),
            Value::Array(items) => {
                DataValue::Array(items.iter().map(DataValue::from_engine_json).collect())
            }
            Value::Object(object) => {
                if object.len() == 1 {
                    if let Some(Value::Array(elements)) = object.get("set") {
                        return DataValue::Set(decode_set_elements(elements));
                    }
                    if let Some(Value::String(name)) = object.get("e") {
                        return DataValue::Text(name.clone());
                    }
                }
                DataValue::Record(
                    object
                        .iter()
                        .map(|(name, value)| (name.clone(), DataValue::from_engine_json(value)))
                        .collect(),
                )
            }
        }
    }
}

fn decode_set_elements(elements: &[Value]) -> Vec<DataValue> {
    let mut decoded = Vec::new();
    for element in elements {
        match integer_range(element) {
            Some((lo, hi))
                if hi >= lo && hi.checked_sub(lo).is_some_and(|w| w < MAX_EXPANDED_RANGE) =>
            {
                decoded.extend((lo..=hi).map(DataValue::Int));
            }
            Some((lo, hi)) if hi < lo => {}
            _ => decoded.push(DataValue::from_engine_json(element)),
        }
    }
    decoded
}

fn integer_range(element: &Value) -> Option<(i64, i64)> {
    match element.as_array()?.as_slice() {
        [lo, hi] => Some((lo.as_i64()?, hi.as_i64()?)),
        _ => None,
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<Vec<i64>> for DataValue {
    fn from(values: Vec<i64>) -> Self {
        DataValue::Array(values.into_iter().map(DataValue::Int).collect())
    }
}
