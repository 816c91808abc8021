//! Post payload validation.
//!
//! The accepted shape is an object with string `title` and `body`; other keys
//! are ignored. Failure messages use JSON-schema validator wording, with
//! values rendered the way Python's `repr` prints them, because clients
//! match on the exact text:
//!
//! ```text
//! 'body' is a required property
//! 32 is not of type 'string'
//! ```
//!
//! When several problems exist, a missing key wins over a mistyped one, and
//! `title` is reported before `body`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::NewPost;

const FIELDS: [&str; 2] = ["title", "body"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is a required property")]
    Required(&'static str),

    /// `value` is already rendered.
    #[error("{value} is not of type '{expected}'")]
    Type { value: String, expected: &'static str },
}

impl ValidationError {
    fn mistyped(value: &Value, expected: &'static str) -> Self {
        Self::Type { value: repr(value), expected }
    }
}

/// Checks `value` against the post schema and extracts the fields.
pub fn validate_post(value: &Value) -> Result<NewPost, ValidationError> {
    let Value::Object(object) = value else {
        return Err(ValidationError::mistyped(value, "object"));
    };

    if let Some(missing) = FIELDS.into_iter().find(|key| !object.contains_key(*key)) {
        return Err(ValidationError::Required(missing));
    }

    Ok(NewPost {
        title: string_field(object, "title")?,
        body: string_field(object, "body")?,
    })
}

fn string_field(object: &Map<String, Value>, key: &'static str) -> Result<String, ValidationError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ValidationError::mistyped(other, "string")),
        None => Err(ValidationError::Required(key)),
    }
}

/// Renders a JSON value as Python's `repr` would print the decoded object.
pub fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), float_repr),
        Value::Number(n) => n.to_string(),
        Value::String(s) => str_repr(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(repr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map.iter()
                .map(|(k, v)| format!("{}: {}", str_repr(k), repr(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn float_repr(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // Rust prints `1e20`, Python `1e+20`; exponents pad to two digits.
        let sci = format!("{f:e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = exp.strip_prefix('-').map_or(("+", exp), |d| ("-", d));
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => sci,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if u32::from(c) < 0x20 || u32::from(c) == 0x7f => {
                out.push_str(&format!("\\x{:02x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
