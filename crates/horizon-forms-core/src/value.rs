//! Dynamically typed field values.
//!
//! Input parts hold their draft as a [`FieldValue`]. Owner members keep
//! their own Rust types; [`FieldType`] converts between the two when a form
//! seeds its parts and when it commits resolved values back.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{FormError, Result};

/// A value held by an input part.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value.
    #[default]
    Empty,
    /// The "no selection" sentinel carried by the placeholder option of a
    /// non-required selection field. Distinct from every real option payload.
    Unselected,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value.
    Text(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A filesystem path.
    Path(PathBuf),
}

impl FieldValue {
    /// A short name of the variant, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Unselected => "unselected",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Path(_) => "path",
        }
    }

    /// Returns true for `Empty`, `Unselected` and empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty | Self::Unselected => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a date, if it is one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty | Self::Unselected => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<PathBuf> for FieldValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Conversion between a member's Rust type and [`FieldValue`].
///
/// Implemented for the primitive types a form can bind. A failed
/// conversion is a programming error and reported as
/// [`FormError::UnsupportedInputType`].
pub trait FieldType: Sized {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Inclusive bounds of integer member types.
    const INT_RANGE: Option<(i128, i128)> = None;

    /// Convert the member value into a field value.
    fn to_field_value(&self) -> FieldValue;

    /// Convert a resolved field value back into the member type.
    fn from_field_value(value: FieldValue) -> Result<Self>;
}

fn mismatch<T: FieldType>(value: &FieldValue) -> FormError {
    FormError::unsupported_input(T::TYPE_NAME, value.type_name())
}

impl FieldType for FieldValue {
    const TYPE_NAME: &'static str = "value";

    fn to_field_value(&self) -> FieldValue {
        self.clone()
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        Ok(value)
    }
}

impl FieldType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FieldType for String {
    const TYPE_NAME: &'static str = "String";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Empty => Ok(String::new()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_integer_field_type {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);
                const INT_RANGE: Option<(i128, i128)> = Some((<$ty>::MIN as i128, <$ty>::MAX as i128));

                /// Values outside the `i64` range are carried as decimal text.
                fn to_field_value(&self) -> FieldValue {
                    match i64::try_from(*self) {
                        Ok(number) => FieldValue::Int(number),
                        Err(_) => FieldValue::Text(self.to_string()),
                    }
                }

                fn from_field_value(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::Int(i) => {
                            <$ty>::try_from(i).map_err(|_| mismatch::<Self>(&FieldValue::Int(i)))
                        }
                        FieldValue::Text(text) => text
                            .trim()
                            .parse::<$ty>()
                            .map_err(|_| mismatch::<Self>(&FieldValue::Text(text.clone()))),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

impl_integer_field_type!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FieldType for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Float(v) => Ok(v),
            FieldValue::Int(i) => Ok(i as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldType for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        f64::from_field_value(value).map(|v| v as f32)
    }
}

impl FieldType for NaiveDate {
    const TYPE_NAME: &'static str = "NaiveDate";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        value.as_date().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FieldType for PathBuf {
    const TYPE_NAME: &'static str = "PathBuf";

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Path(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Path(p) => Ok(p),
            FieldValue::Text(s) => Ok(PathBuf::from(s)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const INT_RANGE: Option<(i128, i128)> = T::INT_RANGE;

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Empty,
        }
    }

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Empty | FieldValue::Unselected => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_round_trip_and_range() {
        assert_eq!(42i32.to_field_value(), FieldValue::Int(42));
        assert_eq!(u8::from_field_value(FieldValue::Int(200)).unwrap(), 200);
        assert!(matches!(
            u8::from_field_value(FieldValue::Int(300)),
            Err(FormError::UnsupportedInputType { expected: "u8", .. })
        ));
    }

    #[test]
    fn test_wide_integers_survive_as_text() {
        assert_eq!(u64::MAX.to_field_value(), FieldValue::Text(u64::MAX.to_string()));
        assert_eq!(u64::from_field_value(u64::MAX.to_field_value()).unwrap(), u64::MAX);
        assert_eq!(u64::from_field_value(FieldValue::from(" 17 ")).unwrap(), 17);
        assert!(i64::from_field_value(FieldValue::from("18446744073709551615")).is_err());
        assert_eq!(u32::INT_RANGE, Some((0, 4_294_967_295)));
        assert_eq!(Option::<i8>::INT_RANGE, Some((-128, 127)));
        assert_eq!(String::INT_RANGE, None);
    }

    #[test]
    fn test_type_mismatch_reports_both_types() {
        let err = bool::from_field_value(FieldValue::Text("yes".into())).unwrap_err();
        assert_eq!(err, FormError::unsupported_input("bool", "text"));
    }

    #[test]
    fn test_option_maps_sentinels_to_none() {
        assert_eq!(Option::<i64>::from_field_value(FieldValue::Unselected).unwrap(), None);
        assert_eq!(Option::<i64>::from_field_value(FieldValue::Empty).unwrap(), None);
        assert_eq!(Option::<i64>::from_field_value(FieldValue::Int(3)).unwrap(), Some(3));
        assert_eq!(None::<String>.to_field_value(), FieldValue::Empty);
    }

    #[test]
    fn test_path_accepts_text() {
        let path = PathBuf::from_field_value(FieldValue::Text("/tmp/a".into())).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a"));
    }

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Empty.is_blank());
        assert!(FieldValue::Unselected.is_blank());
        assert!(FieldValue::Text(String::new()).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert_ne!(FieldValue::Unselected, FieldValue::Empty);
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2024-02-29");
        assert_eq!(FieldValue::Unselected.to_string(), "");
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
    }
}
