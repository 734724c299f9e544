//! Compiled templates

use crate::parser::NodeList;

/// A parsed template, immutable once compiled
#[derive(Debug)]
pub struct Template {
    name: String,
    nodes: NodeList,
}

impl Template {
    pub fn new(name: impl Into<String>, nodes: NodeList) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &NodeList {
        &self.nodes
    }
}
