//! Declarative payload validation.
//!
//! Every inbound payload is checked against a static list of [`FieldTest`]s
//! before any processor sees it. Checks run over the whole list and collect
//! every problem, then the payload is deserialized into its typed form.
//! The collected messages are for the log only.
//!
//! ```rust
//! use serde::Deserialize;
//! use tradewinds_state::validation::{validate, FieldTest, FieldType};
//!
//! #[derive(Deserialize)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! const GREETING: &[FieldTest] = &[FieldTest::required("text", FieldType::String)];
//!
//! let ok: Greeting = validate(&serde_json::json!({ "text": "ahoy" }), GREETING).unwrap();
//! assert_eq!(ok.text, "ahoy");
//! assert!(validate::<Greeting>(&serde_json::json!({ "text": 4 }), GREETING).is_err());
//! ```

pub mod schemas;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Rejection;

/// Expected shape of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// A string that must be one of the listed spellings.
    Enum(&'static [&'static str]),
    /// A nested object with its own tests.
    Object(&'static [FieldTest]),
    /// An array whose every element has the given type.
    Array(&'static FieldType),
}

/// One declarative check on a payload field.
#[derive(Debug, Clone, Copy)]
pub struct FieldTest {
    pub key: &'static str,
    pub kind: FieldType,
    /// Absent and `null` are both accepted when set.
    pub nullable: bool,
}

impl FieldTest {
    pub const fn required(key: &'static str, kind: FieldType) -> Self {
        Self {
            key,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(key: &'static str, kind: FieldType) -> Self {
        Self {
            key,
            kind,
            nullable: true,
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_value(path: &str, value: &Value, kind: &FieldType, messages: &mut Vec<String>) {
    match kind {
        FieldType::String => {
            if !value.is_string() {
                messages.push(format!("{path}: expected string, got {}", describe(value)));
            }
        }
        FieldType::Number => {
            if !value.is_number() {
                messages.push(format!("{path}: expected number, got {}", describe(value)));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                messages.push(format!("{path}: expected boolean, got {}", describe(value)));
            }
        }
        FieldType::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            Some(s) => messages.push(format!("{path}: '{s}' is not one of {allowed:?}")),
            None => messages.push(format!("{path}: expected enum string, got {}", describe(value))),
        },
        FieldType::Object(tests) => check_object(path, value, tests, messages),
        FieldType::Array(element) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_value(&format!("{path}[{i}]"), item, element, messages);
                }
            }
            None => messages.push(format!("{path}: expected array, got {}", describe(value))),
        },
    }
}

fn check_object(path: &str, value: &Value, tests: &[FieldTest], messages: &mut Vec<String>) {
    let Some(object) = value.as_object() else {
        messages.push(format!("{path}: expected object, got {}", describe(value)));
        return;
    };

    for test in tests {
        let field_path = if path.is_empty() {
            test.key.to_string()
        } else {
            format!("{path}.{}", test.key)
        };
        match object.get(test.key) {
            None | Some(Value::Null) if test.nullable => {}
            None => messages.push(format!("{field_path}: missing")),
            Some(Value::Null) => messages.push(format!("{field_path}: must not be null")),
            Some(field) => check_value(&field_path, field, &test.kind, messages),
        }
    }
}

/// Check `payload` against `tests`, then deserialize it into `T`.
pub fn validate<T: DeserializeOwned>(payload: &Value, tests: &[FieldTest]) -> Result<T, Rejection> {
    let mut messages = Vec::new();
    check_object("", payload, tests, &mut messages);

    if messages.is_empty() {
        match serde_json::from_value(payload.clone()) {
            Ok(typed) => return Ok(typed),
            Err(e) => messages.push(format!("payload does not deserialize: {e}")),
        }
    }

    debug!(?messages, "payload validation failed");
    Err(Rejection::new(messages))
}
