//! Localization keys used by the built-in field kinds.
//!
//! Every key is namespaced: with the default namespace `iforms`, a required
//! field left empty reports `iforms.FieldRequired`. Both the namespace and
//! the individual key names can be overridden through
//! [`FormsConfig`](crate::FormsConfig).

use serde::Deserialize;

use horizon_forms_core::LocalSet;

/// Key names, without the namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorKeys {
    pub field_required: String,
    pub should_type_text: String,
    pub should_type_number: String,
    pub should_type_date: String,
    pub number_between: String,
    pub number_greater_than: String,
    pub number_less_than: String,
    pub should_select_option: String,
    pub should_be_true_false: String,
    pub path_not_found: String,
    pub default_select_option: String,
}

impl Default for ErrorKeys {
    fn default() -> Self {
        Self {
            field_required: "FieldRequired".into(),
            should_type_text: "ShouldTypeText".into(),
            should_type_number: "ShouldTypeNumber".into(),
            should_type_date: "ShouldTypeDateErrorKey".into(),
            number_between: "NumberBetweenErrorKey".into(),
            number_greater_than: "NumberGreaterThanErrorKey".into(),
            number_less_than: "NumberLowerThanErrorKey".into(),
            should_select_option: "ShouldSelectOptionErrorKey".into(),
            should_be_true_false: "ShouldBeTrueFalseErrorKey".into(),
            path_not_found: "PathNotFoundErrorKey".into(),
            default_select_option: "DefaultSelectOption".into(),
        }
    }
}

/// The namespaced key table handed to field kinds when they preview input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locals {
    namespace: String,
    keys: ErrorKeys,
    caption_template: String,
    description_template: String,
}

impl Default for Locals {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMESPACE, ErrorKeys::default())
    }
}

impl Locals {
    /// The namespace used when none is configured.
    pub const DEFAULT_NAMESPACE: &'static str = "iforms";
    /// Caption key template used when a descriptor has no literal caption.
    pub const DEFAULT_CAPTION_TEMPLATE: &'static str = "{namespace}.{type}.{member}.Caption";
    /// Description key template used when a descriptor has no literal description.
    pub const DEFAULT_DESCRIPTION_TEMPLATE: &'static str =
        "{namespace}.{type}.{member}.Description";

    /// Create a key table for a namespace.
    pub fn new(namespace: impl Into<String>, keys: ErrorKeys) -> Self {
        Self {
            namespace: namespace.into(),
            keys,
            caption_template: Self::DEFAULT_CAPTION_TEMPLATE.into(),
            description_template: Self::DEFAULT_DESCRIPTION_TEMPLATE.into(),
        }
    }

    /// Override the caption and description key templates.
    pub fn with_templates(
        mut self,
        caption: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.caption_template = caption.into();
        self.description_template = description.into();
        self
    }

    /// The namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The unprefixed key names.
    pub fn keys(&self) -> &ErrorKeys {
        &self.keys
    }

    /// Prefix a key name with the namespace.
    pub fn key(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }

    /// Format a caption/description template for a member of a type.
    pub fn format_template(&self, template: &str, type_name: &str, member: &str) -> String {
        template
            .replace("{namespace}", &self.namespace)
            .replace("{type}", type_name)
            .replace("{member}", member)
    }

    /// The default caption key for a member.
    pub fn caption_key(&self, type_name: &str, member: &str) -> String {
        self.format_template(&self.caption_template, type_name, member)
    }

    /// The default description key for a member.
    pub fn description_key(&self, type_name: &str, member: &str) -> String {
        self.format_template(&self.description_template, type_name, member)
    }

    pub fn field_required(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.field_required))
    }

    pub fn should_type_text(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.should_type_text))
    }

    pub fn should_type_number(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.should_type_number))
    }

    pub fn should_type_date(&self, format: &str) -> LocalSet {
        LocalSet::with_args(self.key(&self.keys.should_type_date), [format])
    }

    pub fn number_between(&self, min: impl ToString, max: impl ToString) -> LocalSet {
        LocalSet::with_args(
            self.key(&self.keys.number_between),
            [min.to_string(), max.to_string()],
        )
    }

    pub fn number_greater_than(&self, min: i64) -> LocalSet {
        LocalSet::with_args(self.key(&self.keys.number_greater_than), [min])
    }

    pub fn number_less_than(&self, max: i64) -> LocalSet {
        LocalSet::with_args(self.key(&self.keys.number_less_than), [max])
    }

    pub fn should_select_option(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.should_select_option))
    }

    pub fn should_be_true_false(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.should_be_true_false))
    }

    pub fn path_not_found(&self) -> LocalSet {
        LocalSet::new(self.key(&self.keys.path_not_found))
    }

    /// Key of the placeholder label shown for "no selection".
    pub fn default_select_option(&self) -> String {
        self.key(&self.keys.default_select_option)
    }
}
