//! Render scope and per-render state

use crate::engine::{Engine, Template};
use crate::error::RenderError;
use crate::value::{ContextData, Value};

/// Stack of variable frames; lookups search innermost first
#[derive(Debug, Clone)]
pub struct Context {
    frames: Vec<ContextData>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            frames: vec![ContextData::new()],
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: ContextData) {
        self.frames.push(frame);
    }

    /// Drop the innermost frame; the outermost frame is never removed
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Resolve a dotted path such as `user.name`; missing parts give `Null`
    pub fn lookup(&self, path: &[String]) -> Value {
        let Some((head, rest)) = path.split_first() else {
            return Value::Null;
        };
        let mut value = self.get(head).cloned().unwrap_or_default();
        for segment in rest {
            value = value.get(segment);
        }
        value
    }

    /// Bind a variable in the innermost frame
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }
}

impl From<ContextData> for Context {
    fn from(data: ContextData) -> Self {
        Self { frames: vec![data] }
    }
}

/// State threaded through one template render
pub struct RenderContext<'e> {
    engine: &'e Engine,
    scope: Context,
    template: String,
    /// Number of enclosing template renders
    depth: usize,
}

impl<'e> RenderContext<'e> {
    pub(crate) fn new(engine: &'e Engine, template: &str, scope: Context, depth: usize) -> Self {
        Self {
            engine,
            scope,
            template: template.to_string(),
            depth,
        }
    }

    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn scope(&self) -> &Context {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Context {
        &mut self.scope
    }

    pub fn autoescape(&self) -> bool {
        self.engine.config().autoescape
    }

    /// Name of the template currently being rendered
    pub fn template_name(&self) -> &str {
        &self.template
    }

    /// Render another template with a fresh scope, one level deeper
    pub fn render_nested(&self, template: &Template, data: ContextData) -> Result<String, RenderError> {
        let depth = self.depth + 1;
        let limit = self.engine.config().max_depth;
        if depth > limit {
            return Err(RenderError::RecursionLimit {
                template: template.name().to_string(),
                limit,
            });
        }
        let mut nested = RenderContext::new(self.engine, template.name(), Context::from(data), depth);
        template.nodes().render_to_string(&mut nested)
    }
}
