//! Bound accessors between an owner type and its form.
//!
//! A type becomes bindable by implementing [`FormData`], usually through
//! `#[derive(FormData)]`. The implementation lists one [`FormMember`] per
//! annotated member in declaration order, each carrying the member's
//! descriptor, an optional dependency declaration, and a getter/setter pair
//! resolved at compile time.
//!
//! # Manual implementation
//!
//! ```
//! use horizon_forms::{FieldDescriptor, FieldType, FieldValue, FormData, FormMember};
//! use horizon_forms::kinds::TextInput;
//!
//! #[derive(Clone, Default)]
//! struct Note {
//!     title: String,
//! }
//!
//! impl FormData for Note {
//!     fn type_name() -> &'static str {
//!         "Note"
//!     }
//!
//!     fn members() -> Vec<FormMember<Self>> {
//!         vec![FormMember::new(
//!             "title",
//!             FieldDescriptor::new(TextInput).caption("Title").description("Note title"),
//!             |note| note.title.to_field_value(),
//!             |note, value| {
//!                 note.title = String::from_field_value(value)?;
//!                 Ok(())
//!             },
//!         )]
//!     }
//! }
//!
//! assert_eq!(Note::members()[0].name, "title");
//! ```

use std::fmt;

use horizon_forms_core::{FieldValue, Result};

use crate::dependency::DependencyDecl;
use crate::descriptor::FieldDescriptor;
use crate::part::{InputPart, SelectOption};
use crate::preview::{CustomPreview, MemberCheck};

/// Reads a member as a field value.
pub type Getter<T> = fn(&T) -> FieldValue;

/// Writes a resolved field value back onto a member.
pub type Setter<T> = fn(&mut T, FieldValue) -> Result<()>;

/// A dependency callback declared on the owner: `(owner, master, slave)`.
pub type DependencyFn<T> = fn(&T, &InputPart, &InputPart);

/// One bound member of an owner type.
pub struct FormMember<T> {
    pub name: &'static str,
    pub descriptor: FieldDescriptor,
    pub dependency: Option<DependencyDecl>,
    pub get: Getter<T>,
    pub set: Setter<T>,
    /// Validates resolved values against the member's type before commit.
    pub check: Option<MemberCheck>,
}

impl<T> FormMember<T> {
    pub fn new(
        name: &'static str,
        descriptor: FieldDescriptor,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            descriptor,
            dependency: None,
            get,
            set,
            check: None,
        }
    }

    /// Reject drafts whose resolved value `set` could not store.
    pub fn with_check(mut self, check: MemberCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Attach a dependency declaration with this member as master.
    pub fn with_dependency(mut self, dependency: DependencyDecl) -> Self {
        self.dependency = Some(dependency);
        self
    }
}

impl<T> fmt::Debug for FormMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormMember")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("dependency", &self.dependency)
            .finish()
    }
}

/// An owner type that can back an [`InputForm`](crate::InputForm).
pub trait FormData: Clone + Send + Sync + 'static {
    /// Declaring type name, used in localization keys and errors.
    fn type_name() -> &'static str;

    /// Bound members in declaration order.
    fn members() -> Vec<FormMember<Self>>;

    /// Options of the provider named `provider`, or `None` if no such
    /// provider exists.
    fn options_for(&self, _provider: &str) -> Option<Vec<SelectOption>> {
        None
    }

    /// A custom preview function by name.
    fn preview_fn(_name: &str) -> Option<CustomPreview> {
        None
    }

    /// A dependency callback by name.
    fn dependency_callback(_name: &str) -> Option<DependencyFn<Self>> {
        None
    }
}

/// Anything that can supply selection options by provider name.
pub trait OptionSource {
    /// Name used in `OptionsProviderNotFound` errors.
    fn source_name(&self) -> &str;

    fn provide_options(&self, provider: &str) -> Option<Vec<SelectOption>>;
}

impl<T: FormData> OptionSource for T {
    fn source_name(&self) -> &str {
        T::type_name()
    }

    fn provide_options(&self, provider: &str) -> Option<Vec<SelectOption>> {
        self.options_for(provider)
    }
}
