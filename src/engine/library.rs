//! Tag tables: tag name to compile function

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::component::ComponentDescriptor;
use crate::error::ParseError;
use crate::parser::{Node, Parser, TagToken};

/// Compile function invoked when the parser meets a registered tag
pub type CompileFn =
    Arc<dyn Fn(&mut Parser<'_>, &TagToken) -> Result<Node, ParseError> + Send + Sync>;

/// A set of tags that can be installed as builtins or activated with `{% load %}`
#[derive(Clone, Default)]
pub struct Library {
    tags: HashMap<String, CompileFn>,
    /// Components registered through this library, by namespaced name
    components: BTreeMap<String, Arc<ComponentDescriptor>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a compile function to a tag name.
    ///
    /// A later binding for the same name replaces the earlier one.
    pub fn tag<F>(&mut self, name: impl Into<String>, compile: F) -> &mut Self
    where
        F: Fn(&mut Parser<'_>, &TagToken) -> Result<Node, ParseError> + Send + Sync + 'static,
    {
        self.insert_compile_fn(name.into(), Arc::new(compile));
        self
    }

    fn insert_compile_fn(&mut self, name: String, compile: CompileFn) {
        if self.tags.contains_key(&name) {
            warn!(tag = %name, "Replacing existing tag binding");
        }
        self.tags.insert(name, compile);
    }

    pub fn compile_fn(&self, name: &str) -> Option<&CompileFn> {
        self.tags.get(name)
    }

    pub fn contains_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Registered tag names, sorted
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Copy every tag and component of `other` into this library
    pub fn merge(&mut self, other: &Library) {
        for (name, compile) in &other.tags {
            self.insert_compile_fn(name.clone(), compile.clone());
        }
        for (name, descriptor) in &other.components {
            self.components.insert(name.clone(), descriptor.clone());
        }
    }

    pub(crate) fn tag_table(&self) -> &HashMap<String, CompileFn> {
        &self.tags
    }

    /// Registered component descriptors, by namespaced name
    pub fn components(&self) -> impl Iterator<Item = &Arc<ComponentDescriptor>> {
        self.components.values()
    }

    pub fn component_descriptor(&self, namespaced_name: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.components.get(namespaced_name)
    }

    pub(crate) fn insert_descriptor(&mut self, descriptor: Arc<ComponentDescriptor>) {
        self.components
            .insert(descriptor.namespaced_name(), descriptor);
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("tags", &self.tag_names())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
