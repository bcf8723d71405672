//! Core systems for Horizon Forms.
//!
//! This crate provides the building blocks the form engine is made of:
//!
//! - **Signal/Slot System**: synchronous, re-entrant observer lists
//! - **Property System**: value cells with change detection
//! - **Field Values**: the dynamic value model and member-type conversions
//! - **Localization**: language codes, error descriptors and the
//!   [`Localizator`] contract
//! - **Errors**: the [`FormError`] taxonomy
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_forms_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Field Value Example
//!
//! ```
//! use horizon_forms_core::{FieldType, FieldValue};
//!
//! let value = 7u16.to_field_value();
//! assert_eq!(value, FieldValue::Int(7));
//! assert_eq!(u16::from_field_value(value).unwrap(), 7);
//! ```

mod error;
pub mod localization;
pub mod logging;
pub mod property;
pub mod signal;
pub mod value;

pub use error::{FormError, Result};
pub use localization::{LanguageCode, LocalSet, Localizator, StaticLocalizator};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use value::{FieldType, FieldValue};

// Re-exported so generated code and downstream crates agree on the date type.
pub use chrono::NaiveDate;
