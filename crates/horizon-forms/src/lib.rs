//! Horizon Forms - declarative data-entry forms.
//!
//! Annotate a struct with `#[derive(FormData)]`, build an [`InputForm`]
//! over an instance, edit its [`InputPart`]s, then commit the validated
//! values back with [`InputForm::apply_changes`].
//!
//! This is the main umbrella crate that re-exports the core crate and the
//! derive macro.
//!
//! # Example
//!
//! ```
//! use horizon_forms::prelude::*;
//!
//! #[derive(Clone, FormData)]
//! struct Signup {
//!     #[input(text, caption = "Name", description = "Your name")]
//!     name: String,
//!     #[input(int(min = 18, max = 120), caption = "Age", description = "Your age")]
//!     age: u32,
//!     #[input(bool, caption = "Newsletter", description = "Send me news")]
//!     #[depends(switch, dependents(topics))]
//!     newsletter: bool,
//!     #[input(text, caption = "Topics", description = "Interests", required = false)]
//!     topics: String,
//! }
//!
//! let form = InputForm::new(Signup {
//!     name: String::new(),
//!     age: 30,
//!     newsletter: false,
//!     topics: String::new(),
//! })
//! .unwrap();
//!
//! assert!(!form.is_valid());
//! form.part("name").unwrap().set_value("Ada").unwrap();
//! form.part("newsletter").unwrap().set_value(true).unwrap();
//! assert!(form.part("topics").unwrap().is_locked());
//!
//! let signup = form.apply_changes().unwrap();
//! assert_eq!(signup.name, "Ada");
//! assert!(signup.newsletter);
//! ```
//!
//! # Logging
//!
//! Construction, dependency wiring and commit are instrumented with
//! `tracing` under the targets in [`logging::targets`].

extern crate self as horizon_forms;

pub use horizon_forms_core::*;
pub use horizon_forms_macros::FormData;

pub mod binding;
pub mod config;
pub mod context;
pub mod dependency;
pub mod descriptor;
pub mod form;
pub mod kinds;
pub mod locals;
pub mod mapper;
pub mod part;
pub mod prelude;
pub mod preview;

pub use binding::{DependencyFn, FormData, FormMember, Getter, OptionSource, Setter};
pub use config::FormsConfig;
pub use context::{FieldContext, FormEnvironment};
pub use dependency::{switch_dependent, DependencyCallback, DependencyDecl, DependencyLink, Trigger};
pub use descriptor::{FieldDescriptor, FieldKind, LocalText};
pub use form::{FormOptions, InputForm};
pub use locals::{ErrorKeys, Locals};
pub use mapper::{global_mapper, register_builder, set_default_builder, FieldBuilder, FieldMapper};
pub use part::{BrowseInfo, InputPart, SelectOption, Validity};
pub use preview::{CustomPreview, PreviewFn, ValueBuilder};
