//! Declared argument schema of a component

use crate::error::BindingError;
use crate::value::{ContextData, Value};

/// One keyword parameter; required when it has no default
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Arguments a component accepts, checked before any component code runs
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    /// Accept keyword arguments that are not declared
    extra: bool,
}

impl Default for Signature {
    fn default() -> Self {
        Self::any()
    }
}

impl Signature {
    /// No parameters and no extra arguments
    pub fn strict() -> Self {
        Self {
            params: Vec::new(),
            extra: false,
        }
    }

    /// Any keyword arguments, none required
    pub fn any() -> Self {
        Self {
            params: Vec::new(),
            extra: true,
        }
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.push(Param::required(name));
        self
    }

    pub fn optional(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push(Param::optional(name, default));
        self
    }

    pub fn with_extra(mut self, extra: bool) -> Self {
        self.extra = extra;
        self
    }

    fn push(&mut self, param: Param) {
        self.params.retain(|p| p.name != param.name);
        self.params.push(param);
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn accepts_extra(&self) -> bool {
        self.extra
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.extra || self.params.iter().any(|p| p.name == name)
    }

    /// Check resolved arguments against the schema and fill in defaults.
    ///
    /// Unexpected arguments are reported before missing ones.
    pub fn bind(&self, mut args: ContextData) -> Result<ContextData, BindingError> {
        if let Some(name) = args.keys().find(|name| !self.accepts(name)) {
            return Err(BindingError::Unexpected(name.clone()));
        }

        for param in &self.params {
            if args.contains_key(&param.name) {
                continue;
            }
            match &param.default {
                Some(default) => {
                    args.insert(param.name.clone(), default.clone());
                }
                None => return Err(BindingError::Missing(param.name.clone())),
            }
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> ContextData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_any_accepts_everything() {
        let bound = Signature::any()
            .bind(args(&[("a", "1"), ("b", "2")]))
            .expect("Should bind");
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn test_missing_required() {
        let signature = Signature::strict().required("message");
        assert_eq!(
            signature.bind(ContextData::new()),
            Err(BindingError::Missing("message".to_string()))
        );
    }

    #[test]
    fn test_unexpected_argument() {
        let signature = Signature::strict().required("message");
        assert_eq!(
            signature.bind(args(&[("message", "Hi"), ("style", "x")])),
            Err(BindingError::Unexpected("style".to_string()))
        );
    }

    #[test]
    fn test_defaults_filled() {
        let signature = Signature::strict()
            .required("message")
            .optional("level", "info");
        let bound = signature.bind(args(&[("message", "Hi")])).expect("Should bind");
        assert_eq!(bound.get("level"), Some(&Value::from("info")));

        let bound = signature
            .bind(args(&[("message", "Hi"), ("level", "error")]))
            .expect("Should bind");
        assert_eq!(bound.get("level"), Some(&Value::from("error")));
    }

    #[test]
    fn test_declared_params_with_extra() {
        let signature = Signature::strict().required("title").with_extra(true);
        assert!(signature.accepts("anything"));
        assert_eq!(
            signature.bind(ContextData::new()),
            Err(BindingError::Missing("title".to_string()))
        );
    }
}
