//! Engine configuration and TOML component manifests

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::component::{ComponentDescriptor, Signature};
use crate::engine::{Engine, Library};
use crate::value::Value;

/// Errors that can occur when loading or parsing a manifest
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse manifest TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for the template engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// HTML-escape `{{ }}` output that is not marked safe
    pub autoescape: bool,

    /// Directories searched for templates, in order
    pub template_dirs: Vec<PathBuf>,

    /// Extension of default component template names
    pub extension: String,

    /// Keep compiled templates between renders
    pub cache_templates: bool,

    /// Maximum nesting of template renders
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoescape: true,
            template_dirs: Vec::new(),
            extension: "html".to_string(),
            cache_templates: true,
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }

    /// Append a template directory
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dirs.push(dir.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_cache_templates(mut self, cache: bool) -> Self {
        self.cache_templates = cache;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Which tag forms a manifest component registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Forms {
    #[default]
    Both,
    Inline,
    Block,
}

/// One `[[component]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub forms: Forms,
    #[serde(default)]
    pub required: Vec<String>,
    /// Optional arguments with their defaults
    #[serde(default)]
    pub optional: BTreeMap<String, serde_json::Value>,
    /// Accept undeclared arguments; defaults to true only when nothing is declared
    #[serde(default)]
    pub extra: Option<bool>,
}

impl ComponentEntry {
    pub fn signature(&self) -> Signature {
        let declared = !self.required.is_empty() || !self.optional.is_empty();
        let mut signature = Signature::strict().with_extra(self.extra.unwrap_or(!declared));
        for name in &self.required {
            signature = signature.required(name.as_str());
        }
        for (name, default) in &self.optional {
            signature = signature.optional(name.as_str(), Value::from(default.clone()));
        }
        signature
    }

    /// Descriptor for a pass-through component with this entry's signature
    pub fn descriptor(&self) -> ComponentDescriptor {
        let mut descriptor = ComponentDescriptor::named(self.name.as_str())
            .with_signature(self.signature());
        if let Some(namespace) = &self.namespace {
            descriptor = descriptor.with_namespace(namespace.as_str());
        }
        if let Some(template) = &self.template {
            descriptor = descriptor.with_template(template.as_str());
        }
        descriptor
    }
}

/// A TOML file declaring engine settings and components
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentEntry>,
}

impl Manifest {
    /// Load a manifest from a TOML file.
    ///
    /// Relative template directories are taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            for dir in &mut manifest.engine.template_dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(manifest)
    }

    /// Load a manifest from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// A library holding every declared component
    pub fn library(&self) -> Library {
        let mut library = Library::new();
        for entry in &self.components {
            let descriptor = entry.descriptor();
            match entry.forms {
                Forms::Both => library.component(descriptor),
                Forms::Inline => library.inline_component(descriptor),
                Forms::Block => library.block_component(descriptor),
            };
        }
        library
    }

    /// Build an engine with the declared components installed as builtins
    pub fn into_engine(self) -> Engine {
        let library = self.library();
        let mut engine = Engine::with_config(self.engine);
        engine.add_builtins(library);
        engine
    }
}
