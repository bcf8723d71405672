//! Prelude module for Horizon Forms.
//!
//! ```ignore
//! use horizon_forms::prelude::*;
//! ```
//!
//! This provides access to:
//! - The form and its parts (`InputForm`, `InputPart`, `FormOptions`)
//! - Binding (`FormData` trait and derive, `FieldDescriptor`)
//! - Values and errors (`FieldValue`, `FormError`, `Result`)
//! - Signals (`Signal`, `ConnectionId`)

// ============================================================================
// Form
// ============================================================================

pub use crate::form::{FormOptions, InputForm};
pub use crate::part::{InputPart, SelectOption, Validity};

// ============================================================================
// Binding
// ============================================================================

pub use crate::binding::{FormData, OptionSource};
pub use crate::dependency::{DependencyDecl, Trigger};
pub use crate::descriptor::FieldDescriptor;
pub use crate::kinds::{BoolInput, BrowseInput, DateInput, IntInput, SelectInput, TextInput};
pub use horizon_forms_macros::FormData;

// ============================================================================
// Values, Localization and Errors
// ============================================================================

pub use horizon_forms_core::{
    FieldType, FieldValue, FormError, LanguageCode, LocalSet, Localizator, Result,
    StaticLocalizator,
};

// ============================================================================
// Signals
// ============================================================================

pub use horizon_forms_core::{ConnectionId, Signal};
