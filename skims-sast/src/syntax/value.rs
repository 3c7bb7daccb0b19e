//! Best-effort values tracked while folding a path.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::graph::LiteralKind;

/// A container element: its own danger travels with it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Slot {
    pub danger: bool,
    pub value: Option<Value>,
}

impl Slot {
    pub fn new(danger: bool, value: Option<Value>) -> Self {
        Self { danger, value }
    }
}

/// A known value. Unknown values are `None` at the use site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    Null,
    List(Vec<Slot>),
    /// Keys are the rendered key values.
    Dict(BTreeMap<String, Slot>),
    /// An instance of a class declared in the analyzed sources.
    Instance(String),
}

impl Value {
    /// Parse literal source text.
    pub fn from_literal(text: &str, kind: LiteralKind) -> Option<Value> {
        match kind {
            LiteralKind::Boolean => match text.trim() {
                "true" | "True" => Some(Value::Bool(true)),
                "false" | "False" => Some(Value::Bool(false)),
                _ => None,
            },
            LiteralKind::Null => Some(Value::Null),
            LiteralKind::String => Some(Value::Str(unquote(text).to_string())),
            LiteralKind::Number => parse_number(text).map(Value::Number),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Key used when this value indexes a dictionary.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Dict(entries) => write!(f, "{{{} entries}}", entries.len()),
            Value::Instance(class) => write!(f, "<{class}>"),
        }
    }
}

/// Strip string delimiters and prefixes: `"a"`, `'a'`, `` `a` ``,
/// `"""a"""`, `@"a"`, `f"a"`.
pub fn unquote(text: &str) -> &str {
    let trimmed = text
        .trim()
        .trim_start_matches(|c: char| matches!(c, '@' | '$' | 'f' | 'r' | 'b' | 'u' | 'F' | 'R' | 'B' | 'U'));
    for delimiter in ["\"\"\"", "'''", "\"", "'", "`"] {
        if let Some(inner) = trimmed
            .strip_prefix(delimiter)
            .and_then(|t| t.strip_suffix(delimiter))
        {
            return inner;
        }
    }
    trimmed
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex.trim_end_matches('l'), 16).ok().map(|n| n as f64);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin.trim_end_matches('l'), 2).ok().map(|n| n as f64);
    }
    lower
        .trim_end_matches(|c: char| matches!(c, 'l' | 'f' | 'd' | 'm' | 'u'))
        .parse::<f64>()
        .ok()
}
