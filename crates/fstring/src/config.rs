//! Engine configuration.
//!
//! [`EngineConfig`] can be built in code:
//!
//! ```rust
//! use fstring::{EngineConfig, RenderCacheMode};
//!
//! let config = EngineConfig::new()
//!     .render_cache(RenderCacheMode::Compiled)
//!     .allow_method_calls(false)
//!     .allow_accessors(["name", "email"]);
//! ```
//!
//! or loaded from YAML:
//!
//! ```rust
//! use fstring::{EngineConfig, RenderCacheMode};
//!
//! let config = EngineConfig::from_yaml(r#"
//! render_cache: compiled
//! allowed_accessors: [name, email]
//! "#).unwrap();
//!
//! assert_eq!(config.render_cache, RenderCacheMode::Compiled);
//! assert!(config.allow_method_calls);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};

/// What the engine memoizes per template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderCacheMode {
    /// Memoize the rendered string by template and the *names* of the
    /// values. Values are not part of the key: a later render of the same
    /// template with the same names returns the first output even if the
    /// values changed. Only use this when values are effectively constant
    /// per template.
    #[default]
    Output,
    /// Memoize the parsed template and substitute fresh values every time.
    Compiled,
    /// No render memoization. The accessor cache is still used.
    Disabled,
}

/// Settings for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Render cache behavior.
    pub render_cache: RenderCacheMode,
    /// Whether chains may call methods, both explicit `name()` segments
    /// and the `getName()` fallback for missing fields.
    pub allow_method_calls: bool,
    /// When set, only these segment names may be accessed in a chain.
    /// Roots looked up in the value map are not restricted.
    pub allowed_accessors: Option<BTreeSet<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            render_cache: RenderCacheMode::default(),
            allow_method_calls: true,
            allowed_accessors: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn render_cache(mut self, mode: RenderCacheMode) -> Self {
        self.render_cache = mode;
        self
    }

    pub fn allow_method_calls(mut self, allow: bool) -> Self {
        self.allow_method_calls = allow;
        self
    }

    /// Restricts chain segments to the given names.
    pub fn allow_accessors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_accessors = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn check_accessor(&self, name: &str) -> std::result::Result<(), AccessError> {
        match &self.allowed_accessors {
            Some(allowed) if !allowed.contains(name) => Err(AccessError::Denied {
                name: name.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_call(&self, token: &str) -> std::result::Result<(), AccessError> {
        if self.allow_method_calls {
            Ok(())
        } else {
            Err(AccessError::Denied {
                name: token.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.render_cache, RenderCacheMode::Output);
        assert!(config.allow_method_calls);
        assert!(config.allowed_accessors.is_none());
    }

    #[test]
    fn builder_methods() {
        let config = EngineConfig::new()
            .render_cache(RenderCacheMode::Disabled)
            .allow_method_calls(false)
            .allow_accessors(vec![String::from("name")]);

        assert_eq!(config.render_cache, RenderCacheMode::Disabled);
        assert!(!config.allow_method_calls);
        assert!(config.check_accessor("name").is_ok());
        assert_eq!(
            config.check_accessor("password"),
            Err(AccessError::Denied {
                name: "password".into()
            })
        );
        assert!(config.check_call("age()").is_err());
    }

    #[test]
    fn from_yaml_fills_defaults() {
        let config = EngineConfig::from_yaml("allow_method_calls: false").unwrap();
        assert_eq!(config.render_cache, RenderCacheMode::Output);
        assert!(!config.allow_method_calls);
    }

    #[test]
    fn from_yaml_all_modes() {
        for (text, mode) in [
            ("output", RenderCacheMode::Output),
            ("compiled", RenderCacheMode::Compiled),
            ("disabled", RenderCacheMode::Disabled),
        ] {
            let config = EngineConfig::from_yaml(&format!("render_cache: {}", text)).unwrap();
            assert_eq!(config.render_cache, mode);
        }
    }

    #[test]
    fn from_yaml_rejects_unknown_keys() {
        let err = EngineConfig::from_yaml("render_cash: output").unwrap_err();
        assert!(matches!(err, FormatError::InvalidConfig { .. }));
    }

    #[test]
    fn unrestricted_config_allows_everything() {
        let config = EngineConfig::default();
        assert!(config.check_accessor("anything").is_ok());
        assert!(config.check_call("getAnything()").is_ok());
    }
}
