//! Template sources: where template text comes from

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Something that can produce template source text for a logical name
pub trait TemplateSource: Send + Sync {
    fn load_source(&self, name: &str) -> Option<String>;

    /// Human-readable location checked for `name`, for error reports
    fn describe(&self, name: &str) -> String;
}

/// Templates held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

impl TemplateSource for MemorySource {
    fn load_source(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }

    fn describe(&self, name: &str) -> String {
        format!("<memory>/{}", name)
    }
}

/// Templates read from a directory, by path relative to its root
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `name` under the root; names that would escape it are rejected
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let stays_inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        stays_inside.then(|| self.root.join(relative))
    }
}

impl TemplateSource for DirSource {
    fn load_source(&self, name: &str) -> Option<String> {
        let path = self.resolve(name)?;
        std::fs::read_to_string(path).ok()
    }

    fn describe(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}
