//! Slotted - reusable template components with named slots
//!
//! This library provides a small Django-flavoured template engine whose tag
//! table can be extended with components. A component is invoked inline,
//! `{% button/ label="Save" %}`, or as a block whose body is split into
//! slots, `{% card %}body{% slot title %}Title{% /slot %}{% /card %}`.
//!
//! # Example
//!
//! ```rust
//! use slotted::{ComponentDescriptor, ContextData, Engine, Library};
//!
//! let mut library = Library::new();
//! library.component(ComponentDescriptor::named("section"));
//!
//! let mut engine = Engine::new();
//! engine.add_builtins(library);
//! engine.add_template("components/section.html", "<section>{{ slot }}</section>");
//!
//! let html = engine
//!     .render_str("{% section %}content{% /section %}", ContextData::new())
//!     .unwrap();
//! assert_eq!(html, "<section>content</section>");
//! ```

pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod value;

pub use component::{Component, ComponentDescriptor, ComponentNode, Param, Signature, Slot};
pub use config::{ConfigError, EngineConfig, Manifest};
pub use engine::{Engine, Library, Template, TemplateSource};
pub use error::{
    BindingError, ComponentValidationError, ParseError, RenderError, TagSyntaxError,
    TemplateNotFoundError,
};
pub use value::{ContextData, SlotMap, Value};

/// Render template source with a default engine
///
/// Only the builtin tags are available; use an [`Engine`] to register
/// components.
///
/// # Example
///
/// ```rust
/// use slotted::{render, ContextData, Value};
///
/// let mut data = ContextData::new();
/// data.insert("name".to_string(), Value::from("<Ada>"));
///
/// let out = render("Hello {{ name }}!", data).unwrap();
/// assert_eq!(out, "Hello &lt;Ada&gt;!");
/// ```
pub fn render(source: &str, data: ContextData) -> Result<String, RenderError> {
    Engine::new().render_str(source, data)
}
