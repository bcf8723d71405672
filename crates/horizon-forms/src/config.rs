//! TOML configuration.
//!
//! ```toml
//! namespace = "shop"
//! default_language = "de"
//! fallback_language = "en"
//!
//! [keys]
//! field_required = "Required"
//!
//! [messages.en]
//! "shop.Required" = "This field is required"
//!
//! [messages.de]
//! "shop.Required" = "Pflichtfeld"
//! ```
//!
//! Every entry is optional. `[keys]` overrides individual error key names
//! (see [`ErrorKeys`]); `[messages]` is an inline catalog turned into a
//! [`StaticLocalizator`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use horizon_forms_core::{FormError, LanguageCode, Result, StaticLocalizator};

use crate::form::FormOptions;
use crate::locals::{ErrorKeys, Locals};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Error key prefix.
    pub namespace: String,
    /// Language new forms start in.
    pub default_language: String,
    /// Language consulted when a key is missing in the current one.
    pub fallback_language: Option<String>,
    /// Error key name overrides.
    pub keys: ErrorKeys,
    /// Caption key template.
    pub caption_template: String,
    /// Description key template.
    pub description_template: String,
    /// Inline catalog: language → key → text.
    pub messages: HashMap<String, HashMap<String, String>>,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            namespace: Locals::DEFAULT_NAMESPACE.to_string(),
            default_language: LanguageCode::default().as_str().to_string(),
            fallback_language: None,
            keys: ErrorKeys::default(),
            caption_template: Locals::DEFAULT_CAPTION_TEMPLATE.to_string(),
            description_template: Locals::DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            messages: HashMap::new(),
        }
    }
}

impl FormsConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| FormError::config(e.to_string()))?;
        if config.namespace.is_empty() {
            return Err(FormError::config("namespace must not be empty"));
        }
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| FormError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// The error key table this configuration describes.
    pub fn locals(&self) -> Locals {
        Locals::new(self.namespace.clone(), self.keys.clone())
            .with_templates(self.caption_template.clone(), self.description_template.clone())
    }

    /// The inline catalog, if any messages are configured.
    pub fn localizator(&self) -> Option<StaticLocalizator> {
        if self.messages.is_empty() {
            return None;
        }
        let mut localizator = StaticLocalizator::new();
        if let Some(fallback) = &self.fallback_language {
            localizator = localizator.with_fallback(fallback.as_str());
        }
        for (language, entries) in &self.messages {
            for (key, text) in entries {
                localizator.insert(language.as_str(), key.clone(), text.clone());
            }
        }
        Some(localizator)
    }

    /// Form options carrying this configuration's language, keys and catalog.
    pub fn form_options(&self) -> FormOptions {
        let mut options = FormOptions::new()
            .language(self.default_language.as_str())
            .locals(self.locals());
        if let Some(localizator) = self.localizator() {
            options = options.localizator(Arc::new(localizator));
        }
        options
    }
}
