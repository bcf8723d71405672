//! Preview and value-builder function types.
//!
//! A preview validates a candidate draft without committing it. It answers
//! `Ok(None)` for a valid draft, `Ok(Some(set))` with an error descriptor
//! for an invalid one, and `Err(UnsupportedInputType)` when it cannot handle
//! the draft's type at all.

use std::sync::Arc;

use horizon_forms_core::{FieldType, FieldValue, FormError, LocalSet, Result};

use crate::descriptor::FieldKind;
use crate::locals::Locals;

/// A preview attached to an input part.
pub type PreviewFn = Arc<dyn Fn(&FieldValue) -> Result<Option<LocalSet>> + Send + Sync>;

/// Converts a draft into the value committed to the owner.
pub type ValueBuilder = Arc<dyn Fn(&FieldValue) -> FieldValue + Send + Sync>;

/// A custom preview declared on an owner type and looked up by name.
pub type CustomPreview = fn(&FieldValue) -> Result<Option<LocalSet>>;

/// Checks that a resolved value converts to the bound member's type.
pub type MemberCheck = fn(&FieldValue, &Locals) -> Option<LocalSet>;

/// Wrap a kind's default preview.
pub fn kind_preview(kind: Arc<dyn FieldKind>, required: bool, locals: Locals) -> PreviewFn {
    Arc::new(move |value| Ok(kind.default_preview(value, required, &locals)))
}

/// Wrap a kind's value builder.
pub fn kind_value_builder(kind: Arc<dyn FieldKind>) -> ValueBuilder {
    Arc::new(move |value| kind.build_value(value))
}

/// Wrap a custom preview function.
pub fn custom_preview(function: CustomPreview) -> PreviewFn {
    Arc::new(function)
}

/// Build a preview over a typed draft.
///
/// Drafts that do not convert to `T` are rejected with
/// `UnsupportedInputType` rather than reported as a validation failure.
///
/// ```
/// use horizon_forms::preview::typed_preview;
/// use horizon_forms::{FieldValue, LocalSet};
///
/// let even = typed_preview(|n: &i64| (n % 2 != 0).then(|| LocalSet::new("odd")));
/// assert_eq!(even(&FieldValue::Int(4)).unwrap(), None);
/// assert!(even(&FieldValue::Bool(true)).is_err());
/// ```
pub fn typed_preview<T, F>(check: F) -> PreviewFn
where
    T: FieldType + 'static,
    F: Fn(&T) -> Option<LocalSet> + Send + Sync + 'static,
{
    Arc::new(move |value| {
        let typed = T::from_field_value(value.clone())
            .map_err(|_| FormError::unsupported_input(T::TYPE_NAME, value.type_name()))?;
        Ok(check(&typed))
    })
}

/// Reject resolved values the member type `M` cannot hold.
///
/// A blank value is `FieldRequired`. An integer outside `M`'s range is a
/// range error over `M`'s bounds. Other values are `ShouldTypeNumber` for
/// integer members and `ShouldTypeText` otherwise.
///
/// ```
/// use horizon_forms::preview::member_check;
/// use horizon_forms::{FieldValue, Locals};
///
/// let locals = Locals::default();
/// assert_eq!(member_check::<u8>(&FieldValue::Int(7), &locals), None);
/// assert_eq!(
///     member_check::<u8>(&FieldValue::Int(-1), &locals),
///     Some(locals.number_between(0, 255))
/// );
/// ```
pub fn member_check<M: FieldType>(value: &FieldValue, locals: &Locals) -> Option<LocalSet> {
    if M::from_field_value(value.clone()).is_ok() {
        return None;
    }
    let integral = match value {
        FieldValue::Int(_) => true,
        FieldValue::Text(text) => text.trim().parse::<i128>().is_ok(),
        _ => false,
    };
    Some(match (value, M::INT_RANGE) {
        (FieldValue::Empty | FieldValue::Unselected, _) => locals.field_required(),
        (_, Some((min, max))) if integral => locals.number_between(min, max),
        (_, Some(_)) => locals.should_type_number(),
        (_, None) => locals.should_type_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::IntInput;

    #[test]
    fn test_kind_preview_uses_required_flag() {
        let preview = kind_preview(Arc::new(IntInput::new()), false, Locals::default());
        assert_eq!(preview(&FieldValue::Text(String::new())).unwrap(), None);

        let preview = kind_preview(Arc::new(IntInput::new()), true, Locals::default());
        assert_eq!(
            preview(&FieldValue::Text(String::new())).unwrap(),
            Some(Locals::default().field_required())
        );
    }

    #[test]
    fn test_typed_preview_rejects_foreign_type() {
        let preview = typed_preview(|s: &bool| (!s).then(|| LocalSet::new("must.accept")));
        assert_eq!(preview(&FieldValue::Bool(true)).unwrap(), None);
        assert_eq!(
            preview(&FieldValue::Bool(false)).unwrap(),
            Some(LocalSet::new("must.accept"))
        );
        assert_eq!(
            preview(&FieldValue::Int(1)).unwrap_err(),
            FormError::unsupported_input("bool", "int")
        );
    }

    #[test]
    fn test_member_check_follows_member_type() {
        let locals = Locals::default();
        assert_eq!(
            member_check::<u32>(&FieldValue::Int(-5), &locals),
            Some(locals.number_between(0, u32::MAX))
        );
        assert_eq!(
            member_check::<i64>(&FieldValue::Empty, &locals),
            Some(locals.field_required())
        );
        assert_eq!(member_check::<Option<i64>>(&FieldValue::Empty, &locals), None);
        assert_eq!(
            member_check::<u64>(&FieldValue::Text(u64::MAX.to_string()), &locals),
            None
        );
        assert_eq!(
            member_check::<u64>(&FieldValue::Text("99999999999999999999".into()), &locals),
            Some(locals.number_between(0, u64::MAX))
        );
        assert_eq!(
            member_check::<u8>(&FieldValue::Bool(true), &locals),
            Some(locals.should_type_number())
        );
        assert_eq!(
            member_check::<String>(&FieldValue::Int(1), &locals),
            Some(locals.should_type_text())
        );
    }

    #[test]
    fn test_value_builder_delegates_to_kind() {
        let builder = kind_value_builder(Arc::new(IntInput::new()));
        assert_eq!(builder(&FieldValue::Text("12".into())), FieldValue::Int(12));
    }
}
