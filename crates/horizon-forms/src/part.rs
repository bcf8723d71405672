//! Input parts: the runtime state of one editable field.
//!
//! An [`InputPart`] holds the current draft, its validity, an advisory lock
//! flag, the preview that decides validity, and an optional value builder
//! that converts the draft at commit time. State changes are announced
//! through the part's public signals.
//!
//! # State machine
//!
//! A part starts [`Validity::Unvalidated`]. The first validation moves it to
//! `Valid` or `Invalid`, after which every distinct value change may flip
//! it freely between the two.
//!
//! ```
//! use horizon_forms::{FieldContext, FieldDescriptor, FieldValue, InputPart};
//! use horizon_forms::kinds::IntInput;
//!
//! let descriptor = FieldDescriptor::new(IntInput::between(0, 10)).caption("Qty");
//! let part = InputPart::new(&FieldContext::detached("qty", "Qty"), &descriptor);
//!
//! part.set_value("5").unwrap();
//! assert!(part.is_valid());
//! assert_eq!(part.get_resolved_value(), FieldValue::Int(5));
//!
//! part.set_value("15").unwrap();
//! assert!(!part.is_valid());
//! ```
//!
//! # Signals
//!
//! For a single `set_value` call, `validation_succeeded` (when the new draft
//! is valid) fires before `value_updated`, followed by `validation_changed`
//! when the validity flag flipped. Every slot runs before `set_value`
//! returns, and no lock is held while slots run, so a slot may mutate other
//! parts or this one.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_forms_core::logging::targets;
use horizon_forms_core::{
    FieldValue, FormError, LanguageCode, LocalSet, Property, Result, Signal,
};

use crate::binding::OptionSource;
use crate::context::{FieldContext, FormEnvironment};
use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::kinds::BrowseInput;
use crate::preview::{kind_preview, kind_value_builder, MemberCheck, PreviewFn, ValueBuilder};

/// Validation state of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    /// No preview has run yet.
    #[default]
    Unvalidated,
    /// The last preview reported no error.
    Valid,
    /// The last preview reported an error.
    Invalid,
}

impl Validity {
    fn from_valid(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    /// Whether this is `Valid`.
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// One entry of a selection field: a display label and the payload
/// committed when the label is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: FieldValue,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// File dialog hints of a browse field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseInfo {
    pub filter: String,
    pub initial_directory: Option<PathBuf>,
    pub title: Option<String>,
}

#[derive(Debug, Default)]
struct PartState {
    value: FieldValue,
    validity: Validity,
}

struct SelectState {
    provider: String,
    options: RwLock<Vec<SelectOption>>,
}

impl SelectState {
    fn find(&self, label: &str) -> Option<SelectOption> {
        self.options
            .read()
            .iter()
            .find(|option| option.label.to_lowercase() == label.to_lowercase())
            .cloned()
    }

    fn label_of(&self, payload: &FieldValue) -> Option<String> {
        self.options
            .read()
            .iter()
            .find(|option| &option.value == payload)
            .map(|option| option.label.clone())
    }
}

enum PartVariant {
    Plain,
    Select(SelectState),
    Browse(BrowseInfo),
}

/// The runtime representation of one editable field.
pub struct InputPart {
    member: String,
    caption: String,
    description: String,
    required: bool,
    kind: Arc<dyn FieldKind>,
    environment: Arc<FormEnvironment>,
    state: RwLock<PartState>,
    locked: Property<bool>,
    preview: Option<PreviewFn>,
    value_builder: Option<ValueBuilder>,
    member_check: Option<MemberCheck>,
    variant: PartVariant,

    /// Emitted after every distinct value change, valid or not.
    pub value_updated: Signal<FieldValue>,

    /// Emitted when the validity flag flips.
    pub validation_changed: Signal<bool>,

    /// Emitted when a value change validates successfully.
    pub validation_succeeded: Signal<FieldValue>,

    /// Emitted when the lock flag changes.
    pub lock_changed: Signal<bool>,

    /// Emitted after the option set of a selection field is refreshed.
    pub options_changed: Signal<()>,
}

impl InputPart {
    /// Create a plain part seeded with the context's value.
    ///
    /// The kind's default preview and value builder are attached. The part
    /// stays unvalidated until [`validate`](Self::validate) or the first
    /// [`set_value`](Self::set_value).
    pub fn new(context: &FieldContext, descriptor: &FieldDescriptor) -> Self {
        Self::with_variant(context, descriptor, PartVariant::Plain)
    }

    /// Create a selection part and fetch its options from `owner`.
    ///
    /// Falls back to a plain part when the descriptor's kind names no
    /// options provider.
    pub fn select(
        context: &FieldContext,
        descriptor: &FieldDescriptor,
        owner: &dyn OptionSource,
    ) -> Result<Self> {
        let Some(provider) = descriptor.kind().options_provider() else {
            return Ok(Self::new(context, descriptor));
        };
        let variant = PartVariant::Select(SelectState {
            provider: provider.to_string(),
            options: RwLock::new(Vec::new()),
        });
        let part = Self::with_variant(context, descriptor, variant);
        part.refresh_options(owner)?;

        // The seed is a payload; the draft of a selection field is a label.
        let draft = part.label_for(&context.value);
        part.state.write().value = draft;
        Ok(part)
    }

    /// Create a browse part carrying the kind's dialog hints.
    pub fn browse(context: &FieldContext, descriptor: &FieldDescriptor) -> Self {
        let info = descriptor
            .kind_as::<BrowseInput>()
            .map(|kind| BrowseInfo {
                filter: kind.filter.clone(),
                initial_directory: kind.initial_directory.clone(),
                title: kind.title.clone(),
            })
            .unwrap_or_default();
        Self::with_variant(context, descriptor, PartVariant::Browse(info))
    }

    fn with_variant(
        context: &FieldContext,
        descriptor: &FieldDescriptor,
        variant: PartVariant,
    ) -> Self {
        let kind = descriptor.kind().clone();
        let environment = context.environment.clone();
        let draft = match variant {
            PartVariant::Select(_) => context.value.clone(),
            _ => kind.present(context.value.clone()),
        };
        Self {
            member: context.member.clone(),
            caption: context.caption.clone(),
            description: context.description.clone(),
            required: descriptor.is_required(),
            preview: Some(kind_preview(
                kind.clone(),
                descriptor.is_required(),
                environment.locals().clone(),
            )),
            value_builder: Some(kind_value_builder(kind.clone())),
            member_check: None,
            kind,
            environment,
            state: RwLock::new(PartState {
                value: draft,
                validity: Validity::Unvalidated,
            }),
            locked: Property::new(false),
            variant,
            value_updated: Signal::new(),
            validation_changed: Signal::new(),
            validation_succeeded: Signal::new(),
            lock_changed: Signal::new(),
            options_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the preview. `None` accepts every value.
    pub fn set_preview(&mut self, preview: Option<PreviewFn>) {
        self.preview = preview;
    }

    /// Replace the value builder. `None` commits the draft unchanged.
    pub fn set_value_builder(&mut self, builder: Option<ValueBuilder>) {
        self.value_builder = builder;
    }

    /// Check resolved drafts against the bound member's type. Runs after
    /// the preview, so a draft the member cannot store is invalid.
    pub fn set_member_check(&mut self, check: Option<MemberCheck>) {
        self.member_check = check;
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The bound member name.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The tag of the descriptor kind this part was built from.
    pub fn kind_tag(&self) -> &'static str {
        self.kind.tag()
    }

    // =========================================================================
    // Value and validity
    // =========================================================================

    /// The current draft.
    pub fn value(&self) -> FieldValue {
        self.state.read().value.clone()
    }

    pub fn validity(&self) -> Validity {
        self.state.read().validity
    }

    /// Whether the last preview of the current draft reported no error.
    pub fn is_valid(&self) -> bool {
        self.validity().is_valid()
    }

    /// Store a new draft and revalidate it.
    ///
    /// Returns `Ok(false)` without side effects when `value` equals the
    /// current draft. A preview that cannot handle the value's type fails
    /// with `UnsupportedInputType` and leaves the part untouched.
    pub fn set_value(&self, value: impl Into<FieldValue>) -> Result<bool> {
        let value = value.into();
        if self.state.read().value == value {
            return Ok(false);
        }

        let valid = self.preview(&value)?.is_none();
        let previous = {
            let mut state = self.state.write();
            state.value = value.clone();
            std::mem::replace(&mut state.validity, Validity::from_valid(valid))
        };
        tracing::trace!(
            target: targets::PART,
            member = %self.member,
            %value,
            valid,
            "value set"
        );

        if valid {
            self.validation_succeeded.emit(value.clone());
        }
        self.value_updated.emit(value);
        if previous != Validity::from_valid(valid) {
            self.validation_changed.emit(valid);
        }
        Ok(true)
    }

    /// Re-run the preview on the current draft.
    ///
    /// Emits `validation_changed` when the flag flips. Returns the new
    /// validity flag.
    pub fn validate(&self) -> Result<bool> {
        let value = self.value();
        let valid = self.preview(&value)?.is_none();
        let previous = std::mem::replace(&mut self.state.write().validity, Validity::from_valid(valid));
        if previous != Validity::from_valid(valid) {
            tracing::trace!(target: targets::PART, member = %self.member, valid, "validity changed");
            self.validation_changed.emit(valid);
        }
        Ok(valid)
    }

    /// Validate `value` without storing it.
    pub fn preview(&self, value: &FieldValue) -> Result<Option<LocalSet>> {
        if let Some(preview) = &self.preview {
            if let Some(error) = preview(value)? {
                return Ok(Some(error));
            }
        }
        if let PartVariant::Select(select) = &self.variant {
            if let Some(error) = self.check_option(select, value) {
                return Ok(Some(error));
            }
        }
        if let Some(check) = self.member_check {
            return Ok(check(&self.resolve(value), self.environment.locals()));
        }
        Ok(None)
    }

    /// Validate `value` and resolve the error for `language`, or the
    /// environment's current language.
    pub fn preview_localized(
        &self,
        value: &FieldValue,
        language: Option<&LanguageCode>,
    ) -> Result<Option<String>> {
        match self.preview(value)? {
            Some(error) => self.environment.resolve_set(&error, language).map(Some),
            None => Ok(None),
        }
    }

    /// The value to commit for the current draft.
    ///
    /// Selection fields map the label back to the option payload first:
    /// an unmatched label resolves to `Empty` and a blank draft on a
    /// non-required field to `Unselected`.
    pub fn get_resolved_value(&self) -> FieldValue {
        self.resolve(&self.value())
    }

    fn resolve(&self, value: &FieldValue) -> FieldValue {
        let value = match &self.variant {
            PartVariant::Select(select) => self.resolve_option(select, value),
            _ => value.clone(),
        };
        match &self.value_builder {
            Some(builder) => builder(&value),
            None => value,
        }
    }

    // =========================================================================
    // Lock
    // =========================================================================

    /// Whether the part is locked. The lock is advisory: it does not stop
    /// [`set_value`](Self::set_value).
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Set the lock flag. Emits `lock_changed` when it changes.
    pub fn set_locked(&self, locked: bool) {
        if self.locked.set(locked) {
            tracing::trace!(target: targets::PART, member = %self.member, locked, "lock changed");
            self.lock_changed.emit(locked);
        }
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Whether this part carries an option set.
    pub fn has_options(&self) -> bool {
        matches!(self.variant, PartVariant::Select(_))
    }

    /// A snapshot of the current options. Empty for non-selection parts.
    pub fn options(&self) -> Vec<SelectOption> {
        match &self.variant {
            PartVariant::Select(select) => select.options.read().clone(),
            _ => Vec::new(),
        }
    }

    /// Fetch the option set from `owner`'s provider.
    ///
    /// A non-required field gets the "no selection" placeholder at index 0.
    /// Emits `options_changed`, then revalidates the current draft unless
    /// the part is still unvalidated. A no-op for non-selection parts.
    pub fn refresh_options(&self, owner: &dyn OptionSource) -> Result<()> {
        let PartVariant::Select(select) = &self.variant else {
            return Ok(());
        };
        let mut options = owner.provide_options(&select.provider).ok_or_else(|| {
            FormError::OptionsProviderNotFound {
                provider: select.provider.clone(),
                type_name: owner.source_name().to_string(),
            }
        })?;
        if !self.required {
            options.insert(0, self.placeholder());
        }
        tracing::debug!(
            target: targets::PART,
            member = %self.member,
            count = options.len(),
            "options refreshed"
        );
        *select.options.write() = options;

        self.options_changed.emit(());
        if self.validity() != Validity::Unvalidated {
            self.validate()?;
        }
        Ok(())
    }

    /// The dialog hints of a browse field.
    pub fn browse_info(&self) -> Option<&BrowseInfo> {
        match &self.variant {
            PartVariant::Browse(info) => Some(info),
            _ => None,
        }
    }

    fn placeholder(&self) -> SelectOption {
        let key = self.environment.locals().default_select_option();
        let label = self.environment.resolve_key(&key).unwrap_or(key);
        SelectOption::new(label, FieldValue::Unselected)
    }

    fn label_for(&self, payload: &FieldValue) -> FieldValue {
        let PartVariant::Select(select) = &self.variant else {
            return payload.clone();
        };
        let payload = match payload {
            FieldValue::Empty => &FieldValue::Unselected,
            other => other,
        };
        match select.label_of(payload) {
            Some(label) => FieldValue::Text(label),
            None => FieldValue::Text(String::new()),
        }
    }

    fn check_option(&self, select: &SelectState, value: &FieldValue) -> Option<LocalSet> {
        let locals = self.environment.locals();
        match value {
            FieldValue::Text(label) if !label.is_empty() => match select.find(label) {
                Some(option) if self.required && option.value == FieldValue::Unselected => {
                    Some(locals.field_required())
                }
                Some(_) => None,
                None => Some(locals.should_select_option()),
            },
            FieldValue::Empty | FieldValue::Unselected | FieldValue::Text(_) => {
                self.required.then(|| locals.field_required())
            }
            _ => Some(locals.should_select_option()),
        }
    }

    fn resolve_option(&self, select: &SelectState, value: &FieldValue) -> FieldValue {
        match value {
            FieldValue::Text(label) if !label.is_empty() => select
                .find(label)
                .map(|option| option.value)
                .unwrap_or(FieldValue::Empty),
            _ if !self.required => FieldValue::Unselected,
            _ => FieldValue::Empty,
        }
    }
}

impl fmt::Display for InputPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        write!(f, "{}: {} ({:?})", self.caption, state.value, state.validity)
    }
}

impl fmt::Debug for InputPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("InputPart")
            .field("member", &self.member)
            .field("kind", &self.kind.tag())
            .field("value", &state.value)
            .field("validity", &state.validity)
            .field("locked", &self.locked.get())
            .finish()
    }
}

static_assertions::assert_impl_all!(InputPart: Send, Sync);
