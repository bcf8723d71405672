//! Reactive value cells.
//!
//! A [`Property<T>`] wraps a value behind interior mutability and reports
//! whether a write actually changed it, so the owner can decide whether to
//! emit a change notification.
//!
//! # Example
//!
//! ```
//! use horizon_forms_core::{Property, Signal};
//!
//! struct Switch {
//!     on: Property<bool>,
//!     toggled: Signal<bool>,
//! }
//!
//! impl Switch {
//!     fn set_on(&self, on: bool) {
//!         if self.on.set(on) {
//!             self.toggled.emit(on);
//!         }
//!     }
//! }
//!
//! let switch = Switch { on: Property::new(false), toggled: Signal::new() };
//! switch.set_on(true);
//! assert!(switch.on.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value cell with change detection.
///
/// `Property<T>` is `Send + Sync` when `T` is, and never holds its lock
/// across caller code except inside [`Property::with`].
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
