//! Registering components as tags in a [`Library`]

use std::sync::Arc;

use crate::component::{compile_block, compile_inline, ComponentDescriptor};
use crate::engine::Library;

impl Library {
    /// Register both the inline and the block form
    pub fn component(&mut self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = self.inline_component(descriptor);
        self.bind_block(&descriptor);
        descriptor
    }

    /// Register `{% name/ ... %}` only
    pub fn inline_component(&mut self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.bind_inline(&descriptor);
        self.insert_descriptor(descriptor.clone());
        descriptor
    }

    /// Register `{% name ... %}...{% /name %}` only; the closing tag is
    /// matched by the block's own parse, not bound in the table
    pub fn block_component(&mut self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.bind_block(&descriptor);
        self.insert_descriptor(descriptor.clone());
        descriptor
    }

    fn bind_inline(&mut self, descriptor: &Arc<ComponentDescriptor>) {
        let captured = descriptor.clone();
        self.tag(descriptor.inline_tag_name(), move |_parser, token| {
            compile_inline(&captured, token)
        });
    }

    fn bind_block(&mut self, descriptor: &Arc<ComponentDescriptor>) {
        let captured = descriptor.clone();
        let (open, _) = descriptor.block_tag_names();
        self.tag(open, move |parser, token| {
            compile_block(&captured, parser, token)
        });
    }
}
