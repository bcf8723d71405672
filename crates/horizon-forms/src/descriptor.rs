//! Field descriptors: the static metadata attached to a bound member.
//!
//! A [`FieldDescriptor`] carries the member's caption and description, its
//! required-ness, an optional custom preview function name, and a
//! [`FieldKind`] that supplies the kind-specific default preview, value
//! builder and presenter.
//!
//! ```
//! use horizon_forms::FieldDescriptor;
//! use horizon_forms::kinds::IntInput;
//!
//! let descriptor = FieldDescriptor::new(IntInput::between(0, 10))
//!     .caption("Quantity")
//!     .description("How many items to order");
//! assert_eq!(descriptor.kind_tag(), "int");
//! assert!(descriptor.is_required());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use horizon_forms_core::{FieldValue, LocalSet, Result};

use crate::context::FormEnvironment;
use crate::locals::Locals;

/// The kind-specific behaviour of a descriptor.
///
/// Built-in kinds live in [`crate::kinds`]. Custom kinds implement this
/// trait and register a builder for their [`tag`](FieldKind::tag) in the
/// [`FieldMapper`](crate::FieldMapper).
pub trait FieldKind: Send + Sync + fmt::Debug + 'static {
    /// The tag under which builders for this kind are registered.
    fn tag(&self) -> &'static str;

    /// Validate `input`, returning an error descriptor if it is invalid.
    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals)
        -> Option<LocalSet>;

    /// Convert an editable draft into the value committed to the owner.
    fn build_value(&self, input: &FieldValue) -> FieldValue {
        input.clone()
    }

    /// Convert a member value into the editable draft a part starts with.
    fn present(&self, value: FieldValue) -> FieldValue {
        value
    }

    /// Name of the owner's options provider, for option-bearing kinds.
    fn options_provider(&self) -> Option<&str> {
        None
    }

    /// Access to the concrete kind, for builders that need its parameters.
    fn as_any(&self) -> &dyn Any;
}

/// A caption or description: literal text, or a localization key template.
///
/// Templates may use `{namespace}`, `{type}` and `{member}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocalText {
    /// Use the namespace's default key template.
    #[default]
    Default,
    /// Literal text used as-is.
    Literal(String),
    /// A key template resolved through the localizator.
    Key(String),
}

/// Immutable metadata for one bound member.
#[derive(Clone)]
pub struct FieldDescriptor {
    caption: LocalText,
    description: LocalText,
    required: bool,
    preview: Option<String>,
    kind: Arc<dyn FieldKind>,
}

impl FieldDescriptor {
    /// Create a required descriptor whose texts come from the default key templates.
    pub fn new(kind: impl FieldKind) -> Self {
        Self::from_kind(Arc::new(kind))
    }

    /// Create a descriptor from a shared kind.
    pub fn from_kind(kind: Arc<dyn FieldKind>) -> Self {
        Self {
            caption: LocalText::Default,
            description: LocalText::Default,
            required: true,
            preview: None,
            kind,
        }
    }

    /// Set a literal caption.
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = LocalText::Literal(caption.into());
        self
    }

    /// Set a caption key template.
    pub fn caption_key(mut self, template: impl Into<String>) -> Self {
        self.caption = LocalText::Key(template.into());
        self
    }

    /// Set a literal description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = LocalText::Literal(description.into());
        self
    }

    /// Set a description key template.
    pub fn description_key(mut self, template: impl Into<String>) -> Self {
        self.description = LocalText::Key(template.into());
        self
    }

    /// Set whether the field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Name a custom preview function on the owner type.
    pub fn preview(mut self, function: impl Into<String>) -> Self {
        self.preview = Some(function.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn preview_name(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn caption_text(&self) -> &LocalText {
        &self.caption
    }

    pub fn description_text(&self) -> &LocalText {
        &self.description
    }

    /// The kind tag used for builder lookup.
    pub fn kind_tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// The shared kind.
    pub fn kind(&self) -> &Arc<dyn FieldKind> {
        &self.kind
    }

    /// Downcast the kind to a concrete type.
    pub fn kind_as<K: FieldKind>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Run the kind's default preview with this descriptor's required flag.
    pub fn default_preview(&self, input: &FieldValue, locals: &Locals) -> Option<LocalSet> {
        self.kind.default_preview(input, self.required, locals)
    }

    /// Resolve caption and description for `member` of `type_name`.
    ///
    /// Literal texts are kept; keys and defaults go through the
    /// environment's localizator and fail with `LocalizationMissing` when
    /// they cannot be resolved.
    pub fn localize(
        &self,
        type_name: &str,
        member: &str,
        environment: &FormEnvironment,
    ) -> Result<(String, String)> {
        let locals = environment.locals();
        let caption = resolve_text(
            &self.caption,
            || locals.caption_key(type_name, member),
            type_name,
            member,
            environment,
        )?;
        let description = resolve_text(
            &self.description,
            || locals.description_key(type_name, member),
            type_name,
            member,
            environment,
        )?;
        Ok((caption, description))
    }
}

fn resolve_text(
    text: &LocalText,
    default_key: impl FnOnce() -> String,
    type_name: &str,
    member: &str,
    environment: &FormEnvironment,
) -> Result<String> {
    match text {
        LocalText::Literal(literal) if !literal.is_empty() => Ok(literal.clone()),
        LocalText::Key(template) => {
            let key = environment.locals().format_template(template, type_name, member);
            environment.resolve_key(&key)
        }
        _ => environment.resolve_key(&default_key()),
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("kind", &self.kind)
            .field("caption", &self.caption)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("preview", &self.preview)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{SelectInput, TextInput};
    use horizon_forms_core::{FormError, LanguageCode, StaticLocalizator};

    fn environment() -> FormEnvironment {
        let loc = StaticLocalizator::new()
            .entry("en", "iforms.Person.name.Caption", "Name")
            .entry("en", "iforms.Person.name.Description", "Your full name")
            .entry("en", "people.name", "Full name");
        FormEnvironment::new(Locals::default(), Some(Arc::new(loc)), LanguageCode::default())
    }

    #[test]
    fn test_literal_texts_skip_localization() {
        let descriptor = FieldDescriptor::new(TextInput)
            .caption("Name")
            .description("Enter it");
        let (caption, description) = descriptor
            .localize("Person", "name", &FormEnvironment::default())
            .unwrap();
        assert_eq!(caption, "Name");
        assert_eq!(description, "Enter it");
    }

    #[test]
    fn test_default_templates_resolve() {
        let descriptor = FieldDescriptor::new(TextInput);
        let (caption, description) = descriptor.localize("Person", "name", &environment()).unwrap();
        assert_eq!(caption, "Name");
        assert_eq!(description, "Your full name");
    }

    #[test]
    fn test_key_template_resolves() {
        let descriptor = FieldDescriptor::new(TextInput)
            .caption_key("people.{member}")
            .description("-");
        let (caption, _) = descriptor.localize("Person", "name", &environment()).unwrap();
        assert_eq!(caption, "Full name");
    }

    #[test]
    fn test_missing_key_fails() {
        let descriptor = FieldDescriptor::new(TextInput).description("-");
        let err = descriptor.localize("Person", "age", &environment()).unwrap_err();
        assert_eq!(err, FormError::localization_missing("iforms.Person.age.Caption", "en"));
    }

    #[test]
    fn test_kind_downcast() {
        let descriptor = FieldDescriptor::new(SelectInput::new("colors"));
        assert_eq!(descriptor.kind_as::<SelectInput>().unwrap().provider(), "colors");
        assert!(descriptor.kind_as::<TextInput>().is_none());
    }
}
