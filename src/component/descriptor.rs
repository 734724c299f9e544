//! Component metadata and the data-production contract

use std::fmt;
use std::sync::Arc;

use crate::component::{Signature, DEFAULT_SLOT_NAME};
use crate::error::{BindingError, ComponentValidationError};
use crate::value::{ContextData, SlotMap, Value};

const DEFAULT_EXTENSION: &str = "html";

/// Produces the context a component's template renders with.
///
/// Arguments are checked against [`Component::signature`] before
/// [`Component::context_data`] runs.
pub trait Component: Send + Sync + 'static {
    /// Accepted keyword arguments; any by default
    fn signature(&self) -> Signature {
        Signature::any()
    }

    /// Extra context for the template, given the rendered slots and the bound
    /// arguments. Returns the arguments unchanged by default.
    fn context_data(&self, slots: &SlotMap, args: ContextData) -> Result<ContextData, BindingError> {
        let _ = slots;
        Ok(args)
    }
}

/// Component that passes its bound arguments straight to the template
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Component for PassThrough {}

/// Static description of one component type
#[derive(Clone)]
pub struct ComponentDescriptor {
    name: String,
    namespace: Option<String>,
    template_name: Option<String>,
    /// Overrides the engine's extension for the default template name
    extension: Option<String>,
    inline_pattern: String,
    block_patterns: (String, String),
    signature: Signature,
    component: Arc<dyn Component>,
}

impl ComponentDescriptor {
    /// Describe `component`, naming it after its Rust type (`AlertBox` becomes `alert_box`)
    pub fn new<C: Component>(component: C) -> Self {
        let type_name = std::any::type_name::<C>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        let signature = component.signature();
        Self {
            name: pascal_to_snake(short),
            namespace: None,
            template_name: None,
            extension: None,
            inline_pattern: "{name}/".to_string(),
            block_patterns: ("{name}".to_string(), "/{name}".to_string()),
            signature,
            component: Arc::new(component),
        }
    }

    /// A pass-through component with an explicit name
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(PassThrough).with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the namespace; an empty string clears it
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Extension used by the default template name, in place of the engine's
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Inline tag pattern, with `{name}` standing for the namespaced name
    pub fn with_inline_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.inline_pattern = pattern.into();
        self
    }

    pub fn with_block_patterns(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block_patterns = (open.into(), close.into());
        self
    }

    /// Override the signature reported by the component
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace:name`, or just `name`
    pub fn namespaced_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, self.name),
            None => self.name.clone(),
        }
    }

    /// Logical name of the template this component renders, with `html`
    /// as the default extension
    pub fn template_name(&self) -> String {
        self.template_name_for(DEFAULT_EXTENSION)
    }

    /// Logical template name; `default_extension` applies unless the
    /// descriptor sets its own
    pub fn template_name_for(&self, default_extension: &str) -> String {
        if let Some(template_name) = &self.template_name {
            return template_name.clone();
        }
        let extension = self.extension.as_deref().unwrap_or(default_extension);
        match &self.namespace {
            Some(namespace) => format!("components/{}/{}.{}", namespace, self.name, extension),
            None => format!("components/{}.{}", self.name, extension),
        }
    }

    pub fn inline_tag_name(&self) -> String {
        self.inline_pattern.replace("{name}", &self.namespaced_name())
    }

    /// Opening and closing tag names of the block form
    pub fn block_tag_names(&self) -> (String, String) {
        let name = self.namespaced_name();
        (
            self.block_patterns.0.replace("{name}", &name),
            self.block_patterns.1.replace("{name}", &name),
        )
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Build the template context from rendered slots and resolved arguments.
    ///
    /// `slot` and `slots` go in first and the component's data is merged on
    /// top, so a component that passes through an argument named `slot`
    /// overrides the reserved key.
    pub fn context_data(
        &self,
        slots: &SlotMap,
        args: ContextData,
    ) -> Result<ContextData, ComponentValidationError> {
        let bound = self
            .signature
            .bind(args)
            .map_err(|cause| self.validation_error(cause))?;
        let data = self
            .component
            .context_data(slots, bound)
            .map_err(|cause| self.validation_error(cause))?;

        let mut context = ContextData::new();
        context.insert(
            DEFAULT_SLOT_NAME.to_string(),
            Value::Safe(slots.get(DEFAULT_SLOT_NAME).to_string()),
        );
        context.insert("slots".to_string(), Value::Slots(slots.clone()));
        context.extend(data);
        Ok(context)
    }

    pub fn validation_error(&self, cause: BindingError) -> ComponentValidationError {
        ComponentValidationError {
            component: self.name.clone(),
            cause,
        }
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("template_name", &self.template_name())
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Convert a PascalCase identifier to snake_case.
///
/// An underscore goes before an uppercase letter that follows a lowercase
/// one, and before an uppercase letter followed by a non-uppercase
/// character, so acronyms stay together (`HTMLParser` becomes `html_parser`).
pub fn pascal_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let before_lower = chars.get(i + 1).is_some_and(|next| !next.is_ascii_uppercase());
            if after_lower || before_lower {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out.trim_matches('_').to_string()
}
