//! Components: reusable templates invoked through inline or block tags
//!
//! A [`ComponentDescriptor`] names a component and its template. Registering
//! it in a [`Library`](crate::engine::Library) binds the inline tag
//! (`name/`) and the block tag (`name`) to compile functions that build a
//! [`ComponentNode`]. Block bodies are split into [`Slot`]s at compile time.

mod compiler;
mod descriptor;
mod node;
mod registry;
mod signature;
mod slots;

pub use compiler::{compile_block, compile_inline};
pub use descriptor::{pascal_to_snake, Component, ComponentDescriptor, PassThrough};
pub use node::{Argument, ComponentNode};
pub use signature::{Param, Signature};
pub use slots::{
    compile_slot, compile_slot_output, partition_slots, Slot, SlotMarkerNode, SlotOutputNode,
    SLOT_END_TAG,
};

/// Name of the slot that collects unmarked content
pub const DEFAULT_SLOT_NAME: &str = "slot";
