//! Turning a struct back into command-line arguments.
//!
//! Handy for re-invoking a program (or a child process) with the options a
//! command was given. Only fields that differ from their zero value are
//! emitted, so defaults stay defaults on the other side.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("failed to serialize value")]
    Serialize(#[from] serde_json::Error),
    #[error("expected a struct, got {0}")]
    NotAStruct(&'static str),
    #[error("field {field}: unsupported value of type {kind}")]
    Unsupported { field: String, kind: &'static str },
}

/// Emit `-field value` pairs for the fields of `value`.
///
/// `true` booleans become bare flags, strings and numbers are emitted when
/// not empty or zero, and sequences repeat the flag once per element. Field
/// names follow serde, so `#[serde(rename)]` picks the flag name and
/// `#[serde(skip)]` leaves a field out.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Deploy {
///     env: String,
///     force: bool,
///     retries: u32,
///     tag: Vec<String>,
/// }
///
/// let deploy = Deploy {
///     env: "prod".into(),
///     force: true,
///     retries: 0,
///     tag: vec!["a".into(), "b".into()],
/// };
/// assert_eq!(
///     flagchain::to_args(&deploy).unwrap(),
///     ["-env", "prod", "-force", "-tag", "a", "-tag", "b"]
/// );
/// ```
pub fn to_args<T: Serialize + ?Sized>(value: &T) -> Result<Vec<String>, ArgsError> {
    let fields = match serde_json::to_value(value)? {
        Value::Object(fields) => fields,
        other => return Err(ArgsError::NotAStruct(kind(&other))),
    };

    let mut out = Vec::with_capacity(fields.len() * 2);
    for (name, value) in fields {
        let flag = format!("-{name}");
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => out.push(flag),
            Value::String(text) => {
                if !text.is_empty() {
                    out.push(flag);
                    out.push(text);
                }
            }
            Value::Number(number) => {
                if number.as_f64() != Some(0.0) {
                    out.push(flag);
                    out.push(number.to_string());
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Bool(true) => out.push(flag.clone()),
                        Value::Bool(false) | Value::Null => {}
                        Value::String(text) => {
                            out.push(flag.clone());
                            out.push(text);
                        }
                        Value::Number(number) => {
                            out.push(flag.clone());
                            out.push(number.to_string());
                        }
                        other => {
                            return Err(ArgsError::Unsupported {
                                field: name,
                                kind: kind(&other),
                            });
                        }
                    }
                }
            }
            other @ Value::Object(_) => {
                return Err(ArgsError::Unsupported {
                    field: name,
                    kind: kind(&other),
                });
            }
        }
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serde helpers for `Duration` fields in humantime text (`"1m 30s"`).
/// A zero duration serializes as an empty string, so [`to_args`] omits it.
///
/// ```
/// use std::time::Duration;
///
/// #[derive(serde::Serialize)]
/// struct Wait {
///     #[serde(with = "flagchain::duration")]
///     timeout: Duration,
/// }
///
/// let args = flagchain::to_args(&Wait { timeout: Duration::from_secs(90) }).unwrap();
/// assert_eq!(args, ["-timeout", "1m 30s"]);
/// ```
pub mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_zero() {
            serializer.serialize_str("")
        } else {
            serializer.collect_str(&humantime::format_duration(*value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(Duration::ZERO);
        }
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
