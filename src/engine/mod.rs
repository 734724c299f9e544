//! Template engine hosting the component tags
//!
//! The engine owns the tag libraries, the template sources and a cache of
//! compiled templates. Libraries are filled in before any template is
//! compiled and are only read afterwards.

pub mod builtins;
mod context;
mod library;
mod loader;
mod render;
mod template;

pub use context::{Context, RenderContext};
pub use library::{CompileFn, Library};
pub use loader::{DirSource, MemorySource, TemplateSource};
pub use template::Template;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ParseError, RenderError, TemplateNotFoundError};
use crate::parser::Parser;
use crate::value::ContextData;

/// Name given to templates compiled from a string
const STRING_TEMPLATE_NAME: &str = "<string>";

pub struct Engine {
    config: EngineConfig,
    builtins: Library,
    libraries: HashMap<String, Library>,
    memory: MemorySource,
    sources: Vec<Box<dyn TemplateSource>>,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let sources = config
            .template_dirs
            .iter()
            .map(|dir| Box::new(DirSource::new(dir)) as Box<dyn TemplateSource>)
            .collect();
        Self {
            config,
            builtins: builtins::library(),
            libraries: HashMap::new(),
            memory: MemorySource::new(),
            sources,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install a library's tags without requiring `{% load %}`
    pub fn add_builtins(&mut self, library: Library) -> &mut Self {
        self.builtins.merge(&library);
        self
    }

    /// The builtin library, for registering tags and components directly
    pub fn builtins_mut(&mut self) -> &mut Library {
        &mut self.builtins
    }

    pub fn builtins(&self) -> &Library {
        &self.builtins
    }

    /// Register a library that templates activate with `{% load name %}`
    pub fn add_library(&mut self, name: impl Into<String>, library: Library) -> &mut Self {
        self.libraries.insert(name.into(), library);
        self
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    /// Add a template source, searched after in-memory templates and earlier sources
    pub fn add_source(&mut self, source: Box<dyn TemplateSource>) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Add an in-memory template
    pub fn add_template(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        let name = name.into();
        if let Ok(cache) = self.cache.get_mut() {
            cache.remove(&name);
        }
        self.memory.insert(name, source);
        self
    }

    /// Compile template source without caching it
    pub fn compile(&self, source: &str) -> Result<Template, ParseError> {
        self.compile_named(STRING_TEMPLATE_NAME, source)
    }

    pub fn compile_named(&self, name: &str, source: &str) -> Result<Template, ParseError> {
        let nodes = Parser::new(source, &self.builtins, &self.libraries).parse()?;
        Ok(Template::new(name, nodes))
    }

    /// Find the source text for a logical template name
    pub fn template_source(&self, name: &str) -> Result<String, TemplateNotFoundError> {
        let sources = std::iter::once(&self.memory as &dyn TemplateSource)
            .chain(self.sources.iter().map(|s| &**s as &dyn TemplateSource));

        let mut tried = Vec::new();
        for source in sources {
            if let Some(text) = source.load_source(name) {
                return Ok(text);
            }
            tried.push(source.describe(name));
        }

        Err(TemplateNotFoundError {
            name: name.to_string(),
            tried,
        })
    }

    /// Load and compile a template by name, using the cache when enabled
    pub fn get_template(&self, name: &str) -> Result<Arc<Template>, RenderError> {
        if self.config.cache_templates {
            if let Some(template) = self.cache.read().ok().and_then(|c| c.get(name).cloned()) {
                return Ok(template);
            }
        }

        debug!(template = name, "Template cache miss");
        let source = self.template_source(name)?;
        let template = self
            .compile_named(name, &source)
            .map_err(|error| RenderError::Compile {
                name: name.to_string(),
                error,
            })?;
        let template = Arc::new(template);

        if self.config.cache_templates {
            if let Ok(mut cache) = self.cache.write() {
                cache.insert(name.to_string(), template.clone());
            }
        }
        Ok(template)
    }

    /// Render a template by name
    pub fn render(&self, name: &str, data: ContextData) -> Result<String, RenderError> {
        let template = self.get_template(name)?;
        self.render_template(&template, data)
    }

    /// Render template source given as a string
    pub fn render_str(&self, source: &str, data: ContextData) -> Result<String, RenderError> {
        let template = self.compile(source).map_err(|error| RenderError::Compile {
            name: STRING_TEMPLATE_NAME.to_string(),
            error,
        })?;
        self.render_template(&template, data)
    }

    pub fn render_template(&self, template: &Template, data: ContextData) -> Result<String, RenderError> {
        let mut rc = RenderContext::new(self, template.name(), Context::from(data), 0);
        template.nodes().render_to_string(&mut rc)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Number of compiled templates held in the cache
    pub fn cached_templates(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_by_name() {
        let mut engine = Engine::new();
        engine.add_template("hello.html", "Hello {{ name }}");
        let mut data = ContextData::new();
        data.insert("name".to_string(), "Ada".into());
        assert_eq!(engine.render("hello.html", data).expect("render"), "Hello Ada");
    }

    #[test]
    fn test_template_not_found_lists_tried_locations() {
        let engine = Engine::with_config(EngineConfig::default().with_template_dir("/srv/t"));
        let err = engine.template_source("missing.html").unwrap_err();
        assert_eq!(err.name, "missing.html");
        assert_eq!(
            err.tried,
            vec!["<memory>/missing.html".to_string(), "/srv/t/missing.html".to_string()]
        );
    }

    #[test]
    fn test_cache() {
        let mut engine = Engine::new();
        engine.add_template("a.html", "a");
        engine.get_template("a.html").expect("load");
        engine.get_template("a.html").expect("load");
        assert_eq!(engine.cached_templates(), 1);

        engine.add_template("a.html", "b");
        assert_eq!(engine.render("a.html", ContextData::new()).expect("render"), "b");

        engine.clear_cache();
        assert_eq!(engine.cached_templates(), 0);
    }

    #[test]
    fn test_cache_disabled() {
        let mut engine = Engine::with_config(EngineConfig::default().with_cache_templates(false));
        engine.add_template("a.html", "a");
        engine.get_template("a.html").expect("load");
        assert_eq!(engine.cached_templates(), 0);
    }

    #[test]
    fn test_compile_error_names_template() {
        let mut engine = Engine::new();
        engine.add_template("broken.html", "{% nope %}");
        let err = engine.render("broken.html", ContextData::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error compiling template 'broken.html': Invalid block tag on line 1: 'nope'"
        );
    }
}
