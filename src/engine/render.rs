//! Rendering of compiled nodes

use std::collections::BTreeMap;

use crate::engine::{Context, RenderContext};
use crate::error::RenderError;
use crate::parser::{Expr, FilterKind, ForNode, IfNode, Node, NodeList, Primary};
use crate::value::{escape_html, ContextData, Value};

impl NodeList {
    pub fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        for node in self {
            node.render(rc, out)?;
        }
        Ok(())
    }

    pub fn render_to_string(&self, rc: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render(rc, &mut out)?;
        Ok(out)
    }
}

impl Node {
    pub fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Variable(expr) => {
                let value = expr.resolve(rc.scope());
                out.push_str(&value.render(rc.autoescape()));
            }
            Node::If(node) => node.render(rc, out)?,
            Node::For(node) => node.render(rc, out)?,
            Node::Component(node) => node.render(rc, out)?,
            Node::Slot(node) => node.render(rc, out)?,
            Node::SlotOutput(node) => node.render(rc, out),
            Node::Empty => {}
        }
        Ok(())
    }
}

impl Expr {
    /// Evaluate against a scope; never fails, missing lookups are `Null`
    pub fn resolve(&self, scope: &Context) -> Value {
        let initial = resolve_primary(&self.primary, scope);
        self.filters.iter().fold(initial, |value, filter| match filter.kind {
            FilterKind::Default if value.is_truthy() => value,
            FilterKind::Default => filter
                .arg
                .as_ref()
                .map(|arg| resolve_primary(arg, scope))
                .unwrap_or_default(),
            FilterKind::Upper => map_text(value, |s| s.to_uppercase()),
            FilterKind::Lower => map_text(value, |s| s.to_lowercase()),
            FilterKind::Title => map_text(value, title_case),
            FilterKind::Length => Value::Int(value.length() as i64),
            FilterKind::Safe => match value {
                Value::Safe(_) => value,
                other => Value::Safe(other.to_string()),
            },
            FilterKind::Escape => match value {
                Value::Safe(_) => value,
                other => Value::Safe(escape_html(&other.to_string())),
            },
        })
    }
}

fn resolve_primary(primary: &Primary, scope: &Context) -> Value {
    match primary {
        Primary::Literal(value) => value.clone(),
        Primary::Lookup(path) => scope.lookup(path),
    }
}

/// Apply a text transform, keeping safe strings safe
fn map_text(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Safe(s) => Value::Safe(f(&s)),
        Value::Slots(_) => Value::Safe(f(&value.to_string())),
        other => Value::String(f(&other.to_string())),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

impl IfNode {
    fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        let truthy = self.condition.resolve(rc.scope()).is_truthy();
        if truthy != self.negated {
            self.then_branch.render(rc, out)
        } else {
            self.else_branch.render(rc, out)
        }
    }
}

impl ForNode {
    fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        let items: Vec<Value> = match self.iterable.resolve(rc.scope()) {
            Value::List(items) => items,
            Value::Map(map) => map.into_keys().map(Value::String).collect(),
            Value::String(s) | Value::Safe(s) => {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            }
            _ => Vec::new(),
        };

        if items.is_empty() {
            return self.empty.render(rc, out);
        }

        let total = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let mut forloop = BTreeMap::new();
            forloop.insert("counter".to_string(), Value::Int(index as i64 + 1));
            forloop.insert("counter0".to_string(), Value::Int(index as i64));
            forloop.insert("first".to_string(), Value::Bool(index == 0));
            forloop.insert("last".to_string(), Value::Bool(index + 1 == total));

            let mut frame = ContextData::new();
            frame.insert("forloop".to_string(), Value::Map(forloop));
            frame.insert(self.variable.clone(), item);

            rc.scope_mut().push(frame);
            let result = self.body.render(rc, out);
            rc.scope_mut().pop();
            result?;
        }
        Ok(())
    }
}
