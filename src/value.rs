//! Runtime values visible to templates

use std::collections::BTreeMap;
use std::fmt;

/// Variables passed to a template render
pub type ContextData = BTreeMap<String, Value>;

/// A value in the render scope
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Markup that must not be escaped again
    Safe(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Rendered slots of a component invocation
    Slots(SlotMap),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) | Value::Safe(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Slots(slots) => slots.names().any(|name| slots.is_filled(name)),
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Value::Safe(_) | Value::Slots(_))
    }

    /// Attribute or index lookup; anything missing is `Null`.
    ///
    /// Lookups on [`Value::Slots`] never miss: an undeclared slot is an
    /// empty safe string.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Map(map) => map.get(key).cloned().unwrap_or_default(),
            Value::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default(),
            Value::Slots(slots) => Value::Safe(slots.get(key).to_string()),
            _ => Value::Null,
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Value::String(s) | Value::Safe(s) => s.chars().count(),
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            Value::Slots(slots) => slots.len(),
            _ => 0,
        }
    }

    /// Text for `{{ }}` output
    pub fn render(&self, autoescape: bool) -> String {
        match self {
            Value::Safe(s) => s.clone(),
            Value::Slots(slots) => slots.get(crate::component::DEFAULT_SLOT_NAME).to_string(),
            other if autoescape => escape_html(&other.to_string()),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) | Value::Safe(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Slots(slots) => f.write_str(slots.get(crate::component::DEFAULT_SLOT_NAME)),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or_default(),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Top-level context data from a JSON object; `None` for any other JSON value
pub fn data_from_json(json: serde_json::Value) -> Option<ContextData> {
    match Value::from(json) {
        Value::Map(map) => Some(map),
        _ => None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rendered slot contents keyed by slot name, in invocation order.
///
/// Lookups are total: a name that was never filled reads as `""`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotMap {
    entries: Vec<(String, String)>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot's rendered text, replacing an earlier entry of the same name
    pub fn insert(&mut self, name: impl Into<String>, rendered: impl Into<String>) {
        let name = name.into();
        let rendered = rendered.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = rendered,
            None => self.entries.push((name, rendered)),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rendered)| rendered.as_str())
            .unwrap_or("")
    }

    /// Whether the invocation declared this slot at all
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Whether this slot was declared with non-empty content
    pub fn is_filled(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
