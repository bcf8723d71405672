//! Shared per-form environment and the context handed to field builders.

use std::fmt;
use std::sync::Arc;

use horizon_forms_core::logging::targets;
use horizon_forms_core::{
    FieldValue, FormError, LanguageCode, LocalSet, Localizator, Property, Result,
};

use crate::locals::Locals;

/// Localization state shared by a form and all of its input parts.
pub struct FormEnvironment {
    locals: Locals,
    localizator: Option<Arc<dyn Localizator>>,
    language: Property<LanguageCode>,
}

impl FormEnvironment {
    /// Create an environment.
    pub fn new(
        locals: Locals,
        localizator: Option<Arc<dyn Localizator>>,
        language: LanguageCode,
    ) -> Self {
        Self {
            locals,
            localizator,
            language: Property::new(language),
        }
    }

    /// The key table used by field kinds.
    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    /// The localizator, if one is configured.
    pub fn localizator(&self) -> Option<&Arc<dyn Localizator>> {
        self.localizator.as_ref()
    }

    /// The current language.
    pub fn language(&self) -> LanguageCode {
        self.language.get()
    }

    /// Change the language. Returns `true` if it changed.
    pub fn set_language(&self, language: LanguageCode) -> bool {
        self.language.set(language)
    }

    /// Resolve a plain key for the current language.
    pub fn resolve_key(&self, key: &str) -> Result<String> {
        let language = self.language();
        self.localizator
            .as_ref()
            .and_then(|loc| loc.resolve(&language, key, true))
            .ok_or_else(|| {
                tracing::debug!(target: targets::LOCALIZATION, key, %language, "key not resolved");
                FormError::localization_missing(key, language.as_str())
            })
    }

    /// Resolve an error descriptor for `language`, or the current language.
    pub fn resolve_set(&self, set: &LocalSet, language: Option<&LanguageCode>) -> Result<String> {
        let language = language.cloned().unwrap_or_else(|| self.language());
        match &self.localizator {
            Some(loc) => loc.resolve_set(&language, set, true),
            None => Err(FormError::localization_missing(&set.key, language.as_str())),
        }
    }
}

impl Default for FormEnvironment {
    fn default() -> Self {
        Self::new(Locals::default(), None, LanguageCode::default())
    }
}

impl fmt::Debug for FormEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEnvironment")
            .field("namespace", &self.locals.namespace())
            .field("language", &self.language())
            .field("has_localizator", &self.localizator.is_some())
            .finish()
    }
}

/// What a field builder knows about the member it materializes.
#[derive(Debug, Clone)]
pub struct FieldContext {
    /// Member name on the owner type.
    pub member: String,
    /// Declaring type name.
    pub type_name: &'static str,
    /// Resolved caption.
    pub caption: String,
    /// Resolved description.
    pub description: String,
    /// The member's current value on the owner, used to seed the draft.
    pub value: FieldValue,
    /// Environment shared with the owning form.
    pub environment: Arc<FormEnvironment>,
}

impl FieldContext {
    /// A context with literal texts and a default environment.
    pub fn detached(member: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            type_name: "",
            caption: caption.into(),
            description: String::new(),
            value: FieldValue::Empty,
            environment: Arc::new(FormEnvironment::default()),
        }
    }

    /// Replace the seed value.
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Replace the environment.
    pub fn with_environment(mut self, environment: Arc<FormEnvironment>) -> Self {
        self.environment = environment;
        self
    }
}
