//! Client constructor arguments.
//!
//! Arguments are stored as a JSON object so the exact value handed to a
//! client at `start` time is the value written to storage and handed back on
//! restore.

use crate::error::ArgsError;
use serde::Serialize;
use serde_json::Value;

/// Named constructor arguments for a [`Client`](crate::Client).
pub type ClientArgs = serde_json::Map<String, Value>;

/// Convert any serializable value into [`ClientArgs`].
///
/// # Errors
///
/// Returns [`ArgsError::NotAnObject`] when the value is not shaped like a
/// map (a struct, a map, or a `json!({..})` object), and
/// [`ArgsError::Serialize`] when serialization itself fails, for example a
/// map keyed by something other than strings.
pub fn to_client_args<T>(value: &T) -> Result<ClientArgs, ArgsError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ArgsError::NotAnObject(kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
