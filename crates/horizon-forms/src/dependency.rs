//! Dependency declarations between bound members.
//!
//! A [`DependencyDecl`] is attached to a master member and names one or
//! more slave members. When the form is built, each (master, slave) pair
//! becomes a [`DependencyLink`]: a subscription on one of the master's
//! signals that invokes the declared callback with both parts.
//!
//! ```
//! use horizon_forms::{DependencyDecl, Trigger};
//!
//! let decl = DependencyDecl::switch(["comment"]);
//! assert_eq!(decl.trigger(), Trigger::OnSuccessfulValidation);
//!
//! let decl = DependencyDecl::callback("reload_cities", ["city"]).on_any_update();
//! assert_eq!(decl.trigger(), Trigger::OnAnyUpdate);
//! ```

use horizon_forms_core::logging::targets;
use horizon_forms_core::{ConnectionId, FieldValue};

use crate::part::InputPart;

/// Which master notification drives a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// Every distinct value change, valid or not.
    OnAnyUpdate,
    /// Only value changes that validate successfully.
    #[default]
    OnSuccessfulValidation,
}

/// The callback a dependency invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyCallback {
    /// A function on the owner type, resolved by name during construction.
    Owner(String),
    /// Lock the slave while the master's boolean value is `true`.
    Switch,
}

impl DependencyCallback {
    /// The name recorded on links, for diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Owner(name) => name,
            Self::Switch => "switch",
        }
    }
}

/// A dependency declared on a master member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    dependents: Vec<String>,
    callback: DependencyCallback,
    trigger: Trigger,
}

impl DependencyDecl {
    pub fn new<I, S>(callback: DependencyCallback, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dependents: dependents.into_iter().map(Into::into).collect(),
            callback,
            trigger: Trigger::default(),
        }
    }

    /// The built-in switch behaviour.
    pub fn switch<I, S>(dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DependencyCallback::Switch, dependents)
    }

    /// A callback function on the owner type.
    pub fn callback<I, S>(name: impl Into<String>, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DependencyCallback::Owner(name.into()), dependents)
    }

    /// Fire on every value change instead of successful validations only.
    pub fn on_any_update(self) -> Self {
        self.with_trigger(Trigger::OnAnyUpdate)
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn dependents(&self) -> &[String] {
        &self.dependents
    }

    pub fn callback_ref(&self) -> &DependencyCallback {
        &self.callback
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// Lock `slave` while `master` resolves to `true`, unlock it on `false`.
///
/// Non-boolean master values leave the slave untouched.
pub fn switch_dependent(master: &InputPart, slave: &InputPart) {
    match master.get_resolved_value() {
        FieldValue::Bool(locked) => slave.set_locked(locked),
        other => tracing::debug!(
            target: targets::DEPENDENCY,
            master = master.member(),
            value = %other,
            "switch master is not boolean"
        ),
    }
}

/// A wired master→slave dependency of a built form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    pub master: String,
    pub slave: String,
    pub trigger: Trigger,
    pub callback: String,
    pub(crate) connection: ConnectionId,
}

impl DependencyLink {
    /// The connection on the master's signal.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }
}
