use crate::error::{GraphError, Result};
use neo4rs::BoltType;
use serde_json::Value;

/// Convert a `serde_json::Value` row into the driver's native parameter type.
///
/// Syncers build their batch rows as plain JSON objects (they are already
/// `serde::Serialize` structs passed through `serde_json::to_value`), so this
/// is the one place that bridges "whatever shape a syncer produced" to
/// "whatever the Bolt wire format wants".
pub fn json_to_bolt(value: &Value) -> Result<BoltType> {
    match value {
        Value::Null => Ok(BoltType::Null(neo4rs::BoltNull)),
        Value::Bool(b) => Ok(BoltType::Boolean(neo4rs::BoltBoolean::new(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(BoltType::Integer(neo4rs::BoltInteger::new(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(BoltType::Float(neo4rs::BoltFloat::new(f)))
            } else {
                Err(GraphError::UnsupportedValue(format!("number out of range: {n}")))
            }
        }
        Value::String(s) => Ok(BoltType::String(neo4rs::BoltString::new(s))),
        Value::Array(items) => {
            let mut list = neo4rs::BoltList::new();
            for item in items {
                list.push(json_to_bolt(item)?);
            }
            Ok(BoltType::List(list))
        }
        Value::Object(map) => {
            let mut bolt_map = neo4rs::BoltMap::new();
            for (k, v) in map {
                bolt_map.put(neo4rs::BoltString::new(k), json_to_bolt(v)?);
            }
            Ok(BoltType::Map(bolt_map))
        }
    }
}
