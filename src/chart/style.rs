//! Lenient reading of UI-produced chart config values.
//!
//! Chart configs come from form widgets: booleans arrive as `"true"`,
//! numbers as `"12"`, unset fields as `""`. [`StyleReader`] accepts all of
//! these and falls back to the supplied default instead of failing.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::calc::parse_number;

/// Read-only view over a flat chart config map.
#[derive(Debug, Clone, Copy)]
pub struct StyleReader<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> StyleReader<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// First non-null value among `keys`.
    pub fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.map.get(*k))
            .find(|v| !v.is_null())
    }

    /// First value among `keys` that is neither null nor a blank string.
    pub fn present(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.map.get(*k))
            .find(|v| !is_blank(v))
    }

    pub fn opt_string(&self, keys: &[&str]) -> Option<String> {
        self.present(keys).map(value_to_string)
    }

    pub fn string(&self, keys: &[&str], default: &str) -> String {
        self.opt_string(keys).unwrap_or_else(|| default.to_string())
    }

    /// Like [`string`](Self::string) but an explicit `""` is kept.
    pub fn raw_string(&self, keys: &[&str], default: &str) -> String {
        self.get(keys)
            .map(value_to_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn opt_bool(&self, keys: &[&str]) -> Option<bool> {
        self.present(keys).and_then(value_to_bool)
    }

    pub fn bool(&self, keys: &[&str], default: bool) -> bool {
        self.opt_bool(keys).unwrap_or(default)
    }

    pub fn opt_number(&self, keys: &[&str]) -> Option<f64> {
        self.present(keys).and_then(parse_number)
    }

    pub fn number(&self, keys: &[&str], default: f64) -> f64 {
        self.opt_number(keys).unwrap_or(default)
    }

    /// A size or position that may be a number or a string such as `"20%"`.
    /// Numeric strings become numbers.
    pub fn dimension(&self, keys: &[&str]) -> Option<Value> {
        self.present(keys).map(|v| match v {
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(s.trim().to_string())),
            other => other.clone(),
        })
    }

    /// A list of strings given as an array or a comma-separated string.
    pub fn string_list(&self, keys: &[&str]) -> Vec<String> {
        match self.present(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !is_blank(v))
                .map(value_to_string)
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(other) => vec![value_to_string(other)],
            None => Vec::new(),
        }
    }

    pub fn object(&self, keys: &[&str]) -> Option<&'a Map<String, Value>> {
        self.get(keys).and_then(Value::as_object)
    }

    /// A `{name: text}` map; non-string entries are stringified.
    pub fn string_map(&self, keys: &[&str]) -> BTreeMap<String, String> {
        self.object(keys)
            .map(|m| {
                m.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), value_to_string(v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn value_to_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "none" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
