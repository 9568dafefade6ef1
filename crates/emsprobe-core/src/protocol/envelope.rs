//! Message envelope (JSON object exchanged over the control connection).
//!
//! Parsing is the single place where malformed input is rejected: anything
//! that is not a JSON object becomes `ProbeError::Parse`. An envelope keeps the
//! full decoded object so serializing it back is structurally lossless.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::{ProbeError, Result};

/// Label shown for a message whose `msg` is empty or missing.
pub const EMPTY_MSG_LABEL: &str = "Empty \"msg\"";

/// Label shown for text that does not parse as a JSON object.
pub const INVALID_LABEL: &str = "Invalid JSON";

const DESCRIBE_SEPARATOR: &str = " | ";
const PRETTY_INDENT: &[u8] = b"    ";

/// One decoded protocol message. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    msg: String,
    msg_id: String,
    fields: Map<String, Value>,
}

impl Envelope {
    /// Decode wire or user text. Fails unless the text is a JSON object.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ProbeError::Parse(format!("invalid json: {e}")))?;

        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ProbeError::Parse(format!(
                    "expected a json object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            msg: text_field(&fields, "msg"),
            msg_id: text_field(&fields, "msg_id"),
            fields,
        })
    }

    /// Protocol message type; empty when absent.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Advisory correlation token; empty when absent.
    pub fn msg_id(&self) -> &str {
        &self.msg_id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn url(&self) -> Option<&str> {
        self.non_empty_str("url")
    }

    pub fn action(&self) -> Option<&str> {
        self.non_empty_str("action")
    }

    /// Fields other than `msg` and `msg_id`.
    pub fn payload(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(k, _)| k.as_str() != "msg" && k.as_str() != "msg_id")
            .map(|(k, v)| (k.as_str(), v))
    }

    /// `msg`, or the distinguished empty label.
    pub fn label(&self) -> &str {
        if self.msg.is_empty() {
            EMPTY_MSG_LABEL
        } else {
            &self.msg
        }
    }

    /// Human label: `msg`, then `url` and `action` when present.
    pub fn describe(&self) -> String {
        let mut out = self.label().to_string();
        for part in [self.url(), self.action()].into_iter().flatten() {
            out.push_str(DESCRIBE_SEPARATOR);
            out.push_str(part);
        }
        out
    }

    /// Re-encode the envelope. Pretty mode indents with four spaces.
    pub fn serialize(&self, pretty: bool) -> Result<String> {
        if pretty {
            to_pretty_string(&self.fields)
        } else {
            serde_json::to_string(&self.fields)
                .map_err(|e| ProbeError::Internal(format!("json encode failed: {e}")))
        }
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Describe raw text, falling back to [`INVALID_LABEL`] when it does not parse.
pub fn describe_text(text: &str) -> String {
    match Envelope::parse(text) {
        Ok(env) => env.describe(),
        Err(_) => INVALID_LABEL.to_string(),
    }
}

/// Pretty-print any JSON text; non-JSON text is returned unchanged.
pub fn prettify(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| to_pretty_string(&v).ok())
        .unwrap_or_else(|| text.to_string())
}

fn to_pretty_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(PRETTY_INDENT));
    value
        .serialize(&mut ser)
        .map_err(|e| ProbeError::Internal(format!("json encode failed: {e}")))?;
    String::from_utf8(buf).map_err(|e| ProbeError::Internal(format!("utf8 invalid: {e}")))
}

// `msg`/`msg_id` are strings in practice; other scalars keep their JSON text.
fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
