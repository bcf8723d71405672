//! The field builder registry.
//!
//! [`FieldMapper`] maps a descriptor kind tag to the function that
//! materializes an [`InputPart`] for it. A process-wide mapper holds the
//! built-in kinds and any custom registrations; every form takes a
//! snapshot of it at construction, so later registrations never affect
//! forms that already exist. A form may also be given its own mapper
//! through [`FormOptions`](crate::FormOptions).
//!
//! # Registering a custom kind
//!
//! ```
//! use std::any::Any;
//! use horizon_forms::{register_builder, FieldKind, FieldValue, InputPart, LocalSet, Locals};
//!
//! #[derive(Debug)]
//! struct Slider;
//!
//! impl FieldKind for Slider {
//!     fn tag(&self) -> &'static str { "slider" }
//!     fn default_preview(&self, input: &FieldValue, _: bool, locals: &Locals) -> Option<LocalSet> {
//!         input.as_int().is_none().then(|| locals.should_type_number())
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! register_builder("slider", |ctx, descriptor, _| Ok(InputPart::new(ctx, descriptor)), false)
//!     .unwrap();
//! assert!(register_builder("slider", |ctx, d, _| Ok(InputPart::new(ctx, d)), false).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use horizon_forms_core::logging::targets;
use horizon_forms_core::{FormError, Result};

use crate::binding::OptionSource;
use crate::context::FieldContext;
use crate::descriptor::FieldDescriptor;
use crate::part::InputPart;

/// Materializes an input part for a descriptor.
pub type FieldBuilder =
    Arc<dyn Fn(&FieldContext, &FieldDescriptor, &dyn OptionSource) -> Result<InputPart> + Send + Sync>;

/// Maps descriptor kind tags to field builders.
#[derive(Clone)]
pub struct FieldMapper {
    builders: HashMap<String, FieldBuilder>,
    default_builder: FieldBuilder,
}

impl FieldMapper {
    /// A mapper with builders for the built-in kinds and the plain builder
    /// as default.
    pub fn new() -> Self {
        let plain = plain_builder();
        let mut builders: HashMap<String, FieldBuilder> = HashMap::new();
        for tag in ["text", "int", "date", "bool"] {
            builders.insert(tag.to_string(), plain.clone());
        }
        builders.insert(
            "select".to_string(),
            Arc::new(|ctx: &FieldContext, descriptor: &FieldDescriptor, owner: &dyn OptionSource| {
                InputPart::select(ctx, descriptor, owner)
            }),
        );
        builders.insert(
            "browse".to_string(),
            Arc::new(|ctx: &FieldContext, descriptor: &FieldDescriptor, _: &dyn OptionSource| {
                Ok(InputPart::browse(ctx, descriptor))
            }),
        );
        Self {
            builders,
            default_builder: plain,
        }
    }

    /// A mapper with no registered kinds; everything uses the default builder.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
            default_builder: plain_builder(),
        }
    }

    /// Register a builder for `kind`.
    ///
    /// Fails with `DuplicateRegistration` if `kind` already has a builder
    /// and `overwrite` is false.
    pub fn register<F>(&mut self, kind: impl Into<String>, builder: F, overwrite: bool) -> Result<()>
    where
        F: Fn(&FieldContext, &FieldDescriptor, &dyn OptionSource) -> Result<InputPart>
            + Send
            + Sync
            + 'static,
    {
        let kind = kind.into();
        if !overwrite && self.builders.contains_key(&kind) {
            return Err(FormError::DuplicateRegistration { kind });
        }
        tracing::debug!(target: targets::MAPPER, %kind, overwrite, "builder registered");
        self.builders.insert(kind, Arc::new(builder));
        Ok(())
    }

    /// Replace the builder used for unregistered kinds.
    pub fn set_default_builder<F>(&mut self, builder: F)
    where
        F: Fn(&FieldContext, &FieldDescriptor, &dyn OptionSource) -> Result<InputPart>
            + Send
            + Sync
            + 'static,
    {
        self.default_builder = Arc::new(builder);
    }

    /// Whether `kind` has a registered builder.
    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered kind tags, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Materialize the part for `descriptor`, falling back to the default
    /// builder when its kind is not registered.
    pub fn resolve(
        &self,
        context: &FieldContext,
        descriptor: &FieldDescriptor,
        owner: &dyn OptionSource,
    ) -> Result<InputPart> {
        let kind = descriptor.kind_tag();
        let builder = match self.builders.get(kind) {
            Some(builder) => builder,
            None => {
                tracing::debug!(
                    target: targets::MAPPER,
                    kind,
                    member = %context.member,
                    "no builder registered, using default"
                );
                &self.default_builder
            }
        };
        builder(context, descriptor, owner)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapper")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn plain_builder() -> FieldBuilder {
    Arc::new(|ctx: &FieldContext, descriptor: &FieldDescriptor, _: &dyn OptionSource| {
        Ok(InputPart::new(ctx, descriptor))
    })
}

static GLOBAL_MAPPER: OnceLock<RwLock<FieldMapper>> = OnceLock::new();

fn global() -> &'static RwLock<FieldMapper> {
    GLOBAL_MAPPER.get_or_init(|| RwLock::new(FieldMapper::new()))
}

/// Register a builder in the process-wide mapper.
///
/// Forms built before the call keep the builders they were built with.
pub fn register_builder<F>(kind: impl Into<String>, builder: F, overwrite: bool) -> Result<()>
where
    F: Fn(&FieldContext, &FieldDescriptor, &dyn OptionSource) -> Result<InputPart>
        + Send
        + Sync
        + 'static,
{
    global().write().register(kind, builder, overwrite)
}

/// Replace the default builder of the process-wide mapper.
pub fn set_default_builder<F>(builder: F)
where
    F: Fn(&FieldContext, &FieldDescriptor, &dyn OptionSource) -> Result<InputPart>
        + Send
        + Sync
        + 'static,
{
    global().write().set_default_builder(builder);
}

/// A snapshot of the process-wide mapper.
pub fn global_mapper() -> FieldMapper {
    global().read().clone()
}
