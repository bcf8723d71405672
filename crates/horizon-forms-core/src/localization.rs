//! Localization contract used to render captions and validation errors.
//!
//! The form engine never formats user-facing text itself. Captions,
//! descriptions and error descriptors ([`LocalSet`]) are keys that an
//! external [`Localizator`] resolves for a [`LanguageCode`].
//!
//! [`StaticLocalizator`] is an in-memory catalog that can be filled in code
//! or loaded from TOML:
//!
//! ```toml
//! [en]
//! "iforms.FieldRequired" = "This field is required"
//! "iforms.NumberBetweenErrorKey" = "Enter a number between {0} and {1}"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{FormError, Result};

/// A normalized language tag such as `en` or `pt-br`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// English, the default language.
    pub const DEFAULT: &'static str = "en";

    /// Create a language code, normalizing case and separators.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().replace('_', "-").to_lowercase())
    }

    /// The normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// An error descriptor: a namespaced localization key plus ordered format
/// arguments substituted for `{0}`, `{1}`, ... in the resolved template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalSet {
    /// The localization key, e.g. `iforms.FieldRequired`.
    pub key: String,
    /// Format arguments, in placeholder order.
    pub args: Vec<String>,
}

impl LocalSet {
    /// A descriptor without arguments.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// A descriptor with format arguments.
    pub fn with_args<I, A>(key: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: ToString,
    {
        Self {
            key: key.into(),
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Substitute this descriptor's arguments into a resolved template.
    ///
    /// The template is scanned once, so argument text is never itself
    /// treated as a placeholder. Placeholders without a matching argument
    /// are kept verbatim.
    pub fn format(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let placeholder = after
                .find('}')
                .and_then(|close| Some((close, after[..close].parse::<usize>().ok()?)))
                .and_then(|(close, index)| Some((close, self.args.get(index)?)));
            match placeholder {
                Some((close, arg)) => {
                    out.push_str(arg);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for LocalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.key)
        } else {
            write!(f, "{}({})", self.key, self.args.join(", "))
        }
    }
}

impl From<&str> for LocalSet {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for LocalSet {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Resolves localization keys to display strings.
pub trait Localizator: Send + Sync {
    /// Resolve `key` for `language`. When `fallback_allowed` is set, an
    /// implementation may answer from a fallback language.
    fn resolve(&self, language: &LanguageCode, key: &str, fallback_allowed: bool) -> Option<String>;

    /// Resolve an error descriptor and substitute its arguments.
    fn resolve_set(
        &self,
        language: &LanguageCode,
        set: &LocalSet,
        fallback_allowed: bool,
    ) -> Result<String> {
        self.resolve(language, &set.key, fallback_allowed)
            .map(|template| set.format(&template))
            .ok_or_else(|| FormError::localization_missing(&set.key, language.as_str()))
    }
}

/// An in-memory localization catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticLocalizator {
    catalogs: HashMap<LanguageCode, HashMap<String, String>>,
    fallback: Option<LanguageCode>,
}

impl StaticLocalizator {
    /// Create an empty catalog with no fallback language.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language consulted when a key is missing and fallback is allowed.
    pub fn with_fallback(mut self, language: impl Into<LanguageCode>) -> Self {
        self.fallback = Some(language.into());
        self
    }

    /// Add or replace a single entry.
    pub fn insert(
        &mut self,
        language: impl Into<LanguageCode>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Self {
        self.catalogs
            .entry(language.into())
            .or_default()
            .insert(key.into(), text.into());
        self
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn entry(
        mut self,
        language: impl Into<LanguageCode>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(language, key, text);
        self
    }

    /// Merge entries from a TOML document whose tables are languages.
    pub fn merge_toml_str(&mut self, source: &str) -> Result<()> {
        let tables: HashMap<String, HashMap<String, String>> =
            toml::from_str(source).map_err(|e| FormError::config(e.to_string()))?;
        for (language, entries) in tables {
            let catalog = self.catalogs.entry(LanguageCode::new(language)).or_default();
            catalog.extend(entries);
        }
        Ok(())
    }

    /// Build a catalog from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut localizator = Self::new();
        localizator.merge_toml_str(source)?;
        Ok(localizator)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| FormError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Number of entries for a language.
    pub fn len(&self, language: &LanguageCode) -> usize {
        self.catalogs.get(language).map_or(0, HashMap::len)
    }

    fn lookup(&self, language: &LanguageCode, key: &str) -> Option<String> {
        self.catalogs.get(language)?.get(key).cloned()
    }
}

impl Localizator for StaticLocalizator {
    fn resolve(&self, language: &LanguageCode, key: &str, fallback_allowed: bool) -> Option<String> {
        self.lookup(language, key).or_else(|| {
            let fallback = self.fallback.as_ref().filter(|_| fallback_allowed)?;
            self.lookup(fallback, key)
        })
    }
}
