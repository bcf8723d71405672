//! Built-in field kinds.
//!
//! | kind | draft | committed value |
//! |------|-------|-----------------|
//! | [`TextInput`] | text | text |
//! | [`IntInput`] | text | `Int` |
//! | [`DateInput`] | text | `Date` |
//! | [`BoolInput`] | `Bool` | `Bool` |
//! | [`SelectInput`] | option label | option payload |
//! | [`BrowseInput`] | text | `Path` |

use std::any::Any;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use horizon_forms_core::{FieldValue, LocalSet};

use crate::descriptor::FieldKind;
use crate::locals::Locals;

/// Shared text rules: the draft must be text, and a required draft must
/// not be empty. Returns the text on success.
fn check_text<'a>(
    input: &'a FieldValue,
    required: bool,
    locals: &Locals,
) -> Result<&'a str, LocalSet> {
    let text = match input {
        FieldValue::Empty => "",
        FieldValue::Text(text) => text.as_str(),
        _ => return Err(locals.should_type_text()),
    };
    if required && text.is_empty() {
        return Err(locals.field_required());
    }
    Ok(text)
}

/// Free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextInput;

impl FieldKind for TextInput {
    fn tag(&self) -> &'static str {
        "text"
    }

    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals) -> Option<LocalSet> {
        check_text(input, required, locals).err()
    }

    fn present(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Empty => FieldValue::Text(String::new()),
            other => other,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An integer typed as text, with optional inclusive bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntInput {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept values in `min..=max`.
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    fn check_range(&self, number: i128, locals: &Locals) -> Option<LocalSet> {
        let below = self.min.is_some_and(|min| number < i128::from(min));
        let above = self.max.is_some_and(|max| number > i128::from(max));
        if !below && !above {
            return None;
        }
        Some(match (self.min, self.max) {
            (Some(min), Some(max)) => locals.number_between(min, max),
            (Some(min), None) => locals.number_greater_than(min),
            (None, Some(max)) => locals.number_less_than(max),
            (None, None) => return None,
        })
    }
}

impl FieldKind for IntInput {
    fn tag(&self) -> &'static str {
        "int"
    }

    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals) -> Option<LocalSet> {
        if let FieldValue::Int(number) = input {
            return self.check_range(i128::from(*number), locals);
        }
        let text = match check_text(input, required, locals) {
            Ok(text) => text.trim(),
            Err(set) => return Some(set),
        };
        if text.is_empty() {
            return None;
        }
        match text.parse::<i128>() {
            Ok(number) => self.check_range(number, locals),
            Err(_) => Some(locals.should_type_number()),
        }
    }

    fn build_value(&self, input: &FieldValue) -> FieldValue {
        match input {
            FieldValue::Text(text) if text.trim().is_empty() => FieldValue::Empty,
            // Numbers beyond `i64` stay decimal text for wide member types.
            FieldValue::Text(text) => match text.trim().parse::<i64>() {
                Ok(number) => FieldValue::Int(number),
                Err(_) if text.trim().parse::<i128>().is_ok() => {
                    FieldValue::Text(text.trim().to_string())
                }
                Err(_) => input.clone(),
            },
            other => other.clone(),
        }
    }

    fn present(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Int(number) => FieldValue::Text(number.to_string()),
            FieldValue::Empty => FieldValue::Text(String::new()),
            other => other,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A calendar date typed as text in a `chrono` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateInput {
    pub format: String,
}

impl DateInput {
    pub const DEFAULT_FORMAT: &'static str = "%d.%m.%Y";

    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    fn parse(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), &self.format).ok()
    }
}

impl Default for DateInput {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FORMAT)
    }
}

impl FieldKind for DateInput {
    fn tag(&self) -> &'static str {
        "date"
    }

    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals) -> Option<LocalSet> {
        if let FieldValue::Date(_) = input {
            return None;
        }
        let text = match check_text(input, required, locals) {
            Ok(text) => text,
            Err(set) => return Some(set),
        };
        if text.trim().is_empty() || self.parse(text).is_some() {
            None
        } else {
            Some(locals.should_type_date(&self.format))
        }
    }

    fn build_value(&self, input: &FieldValue) -> FieldValue {
        match input {
            FieldValue::Text(text) if text.trim().is_empty() => FieldValue::Empty,
            FieldValue::Text(text) => self
                .parse(text)
                .map(FieldValue::Date)
                .unwrap_or_else(|| input.clone()),
            other => other.clone(),
        }
    }

    fn present(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Date(date) => FieldValue::Text(date.format(&self.format).to_string()),
            FieldValue::Empty => FieldValue::Text(String::new()),
            other => other,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolInput;

impl FieldKind for BoolInput {
    fn tag(&self) -> &'static str {
        "bool"
    }

    fn default_preview(&self, input: &FieldValue, _required: bool, locals: &Locals) -> Option<LocalSet> {
        match input {
            FieldValue::Bool(_) => None,
            _ => Some(locals.should_be_true_false()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A choice among options supplied by the owner's named provider.
///
/// The draft is the option label. Membership in the current option set is
/// checked by the input part, which owns the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectInput {
    provider: String,
}

impl SelectInput {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }

    /// Name of the owner's options provider.
    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl FieldKind for SelectInput {
    fn tag(&self) -> &'static str {
        "select"
    }

    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals) -> Option<LocalSet> {
        match input {
            FieldValue::Empty | FieldValue::Unselected | FieldValue::Text(_) => {}
            _ => return Some(locals.should_select_option()),
        }
        if required && input.is_blank() {
            Some(locals.field_required())
        } else {
            None
        }
    }

    fn options_provider(&self) -> Option<&str> {
        Some(&self.provider)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filesystem path, typically picked through a file dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseInput {
    pub filter: String,
    pub initial_directory: Option<PathBuf>,
    pub title: Option<String>,
    pub must_exist: bool,
}

impl Default for BrowseInput {
    fn default() -> Self {
        Self {
            filter: String::new(),
            initial_directory: None,
            title: None,
            must_exist: true,
        }
    }
}

impl BrowseInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn initial_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.initial_directory = Some(directory.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = must_exist;
        self
    }
}

impl FieldKind for BrowseInput {
    fn tag(&self) -> &'static str {
        "browse"
    }

    fn default_preview(&self, input: &FieldValue, required: bool, locals: &Locals) -> Option<LocalSet> {
        let path = match input {
            FieldValue::Path(path) => path.as_path(),
            _ => match check_text(input, required, locals) {
                Ok(text) => Path::new(text),
                Err(set) => return Some(set),
            },
        };
        if path.as_os_str().is_empty() {
            return required.then(|| locals.field_required());
        }
        if self.must_exist && !path.exists() {
            return Some(locals.path_not_found());
        }
        None
    }

    fn build_value(&self, input: &FieldValue) -> FieldValue {
        match input {
            FieldValue::Text(text) if text.is_empty() => FieldValue::Empty,
            FieldValue::Text(text) => FieldValue::Path(PathBuf::from(text)),
            other => other.clone(),
        }
    }

    fn present(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Path(path) => FieldValue::Text(path.display().to_string()),
            FieldValue::Empty => FieldValue::Text(String::new()),
            other => other,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn key(set: Option<LocalSet>) -> Option<String> {
        set.map(|set| set.key)
    }

    #[test]
    fn test_text_rules() {
        let locals = Locals::default();
        assert_eq!(TextInput.default_preview(&text("hi"), true, &locals), None);
        assert_eq!(
            key(TextInput.default_preview(&text(""), true, &locals)).as_deref(),
            Some("iforms.FieldRequired")
        );
        assert_eq!(TextInput.default_preview(&FieldValue::Empty, false, &locals), None);
        assert_eq!(
            key(TextInput.default_preview(&FieldValue::Int(3), false, &locals)).as_deref(),
            Some("iforms.ShouldTypeText")
        );
    }

    #[test]
    fn test_int_bounds() {
        let locals = Locals::default();
        let kind = IntInput::between(0, 10);
        assert_eq!(kind.default_preview(&text("5"), true, &locals), None);
        assert_eq!(kind.default_preview(&FieldValue::Int(10), true, &locals), None);
        assert_eq!(
            kind.default_preview(&text("15"), true, &locals),
            Some(locals.number_between(0, 10))
        );
        assert_eq!(
            kind.default_preview(&text("abc"), true, &locals),
            Some(locals.should_type_number())
        );
        assert_eq!(kind.default_preview(&text(""), false, &locals), None);
    }

    #[test]
    fn test_int_single_bound() {
        let locals = Locals::default();
        assert_eq!(
            IntInput::new().with_min(3).default_preview(&text("1"), true, &locals),
            Some(locals.number_greater_than(3))
        );
        assert_eq!(
            IntInput::new().with_max(3).default_preview(&text("4"), true, &locals),
            Some(locals.number_less_than(3))
        );
        assert_eq!(IntInput::new().default_preview(&text("-40"), true, &locals), None);
        assert_eq!(
            IntInput::new().default_preview(&text("18446744073709551615"), true, &locals),
            None
        );
        assert_eq!(
            IntInput::new().with_max(3).default_preview(&text("18446744073709551615"), true, &locals),
            Some(locals.number_less_than(3))
        );
    }

    #[test]
    fn test_int_build_and_present() {
        let kind = IntInput::new();
        assert_eq!(kind.build_value(&text(" 42 ")), FieldValue::Int(42));
        assert_eq!(kind.build_value(&text("")), FieldValue::Empty);
        assert_eq!(
            kind.build_value(&text(" 18446744073709551615 ")),
            text("18446744073709551615")
        );
        assert_eq!(kind.present(FieldValue::Int(7)), text("7"));
    }

    #[test]
    fn test_date_format() {
        let locals = Locals::default();
        let kind = DateInput::default();
        assert_eq!(kind.default_preview(&text("24.12.2024"), true, &locals), None);
        assert_eq!(
            kind.default_preview(&text("2024-12-24"), true, &locals),
            Some(locals.should_type_date("%d.%m.%Y"))
        );

        let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
        assert_eq!(kind.build_value(&text("24.12.2024")), FieldValue::Date(date));
        assert_eq!(kind.present(FieldValue::Date(date)), text("24.12.2024"));
    }

    #[test]
    fn test_bool_requires_bool() {
        let locals = Locals::default();
        assert_eq!(BoolInput.default_preview(&FieldValue::Bool(false), true, &locals), None);
        assert_eq!(
            BoolInput.default_preview(&text("yes"), true, &locals),
            Some(locals.should_be_true_false())
        );
    }

    #[test]
    fn test_select_shape() {
        let locals = Locals::default();
        let kind = SelectInput::new("colors");
        assert_eq!(kind.default_preview(&text("Red"), true, &locals), None);
        assert_eq!(
            kind.default_preview(&FieldValue::Unselected, true, &locals),
            Some(locals.field_required())
        );
        assert_eq!(kind.default_preview(&FieldValue::Unselected, false, &locals), None);
        assert_eq!(
            kind.default_preview(&FieldValue::Int(1), false, &locals),
            Some(locals.should_select_option())
        );
    }

    #[test]
    fn test_browse_checks_existence() {
        let locals = Locals::default();
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("present.txt");
        std::fs::write(&existing, b"data").unwrap();
        let missing = dir.path().join("absent.txt");

        let kind = BrowseInput::new();
        assert_eq!(kind.default_preview(&text(existing.to_str().unwrap()), true, &locals), None);
        assert_eq!(
            kind.default_preview(&FieldValue::Path(missing.clone()), true, &locals),
            Some(locals.path_not_found())
        );
        assert_eq!(
            BrowseInput::new()
                .must_exist(false)
                .default_preview(&FieldValue::Path(missing), true, &locals),
            None
        );
        assert_eq!(kind.default_preview(&text(""), false, &locals), None);
        assert_eq!(kind.build_value(&text("/tmp/x")), FieldValue::Path(PathBuf::from("/tmp/x")));
    }
}
