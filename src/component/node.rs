//! The compiled component invocation

use std::sync::Arc;

use tracing::trace;

use crate::component::{ComponentDescriptor, Slot};
use crate::engine::RenderContext;
use crate::error::RenderError;
use crate::parser::{Expr, Span};
use crate::value::{ContextData, SlotMap};

/// A `key=expr` argument, resolved at render time
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// One occurrence of a component tag in a template.
///
/// Immutable after compilation; every render resolves arguments and slots
/// afresh against the caller's scope.
#[derive(Debug)]
pub struct ComponentNode {
    descriptor: Arc<ComponentDescriptor>,
    /// Concrete tag name as written, for diagnostics
    tag: String,
    arguments: Vec<Argument>,
    slots: Vec<Slot>,
    span: Span,
}

impl ComponentNode {
    pub fn new(
        descriptor: Arc<ComponentDescriptor>,
        tag: impl Into<String>,
        arguments: Vec<Argument>,
        slots: Vec<Slot>,
        span: Span,
    ) -> Self {
        Self {
            descriptor,
            tag: tag.into(),
            arguments,
            slots,
            span,
        }
    }

    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn render(&self, rc: &mut RenderContext<'_>, out: &mut String) -> Result<(), RenderError> {
        trace!(
            component = %self.descriptor.namespaced_name(),
            caller = rc.template_name(),
            "Rendering component"
        );

        // Slot content closes over the caller's scope
        let mut rendered = SlotMap::new();
        for slot in &self.slots {
            let text = slot.content.render_to_string(rc)?;
            rendered.insert(slot.name.as_str(), text);
        }

        let args: ContextData = self
            .arguments
            .iter()
            .map(|arg| (arg.name.clone(), arg.value.resolve(rc.scope())))
            .collect();

        let data = self.descriptor.context_data(&rendered, args)?;
        let engine = rc.engine();
        let name = self.descriptor.template_name_for(&engine.config().extension);
        let template = engine.get_template(&name)?;
        out.push_str(&rc.render_nested(&template, data)?);
        Ok(())
    }
}
