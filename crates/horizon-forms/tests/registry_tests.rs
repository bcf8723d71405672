//! Integration tests for the field builder registry and custom kinds.

use std::any::Any;

use horizon_forms::prelude::*;
use horizon_forms::{
    global_mapper, register_builder, FieldContext, FieldKind, FieldMapper, Locals,
};

/// A bounded integer knob.
#[derive(Debug)]
struct Dial {
    max: i64,
}

impl FieldKind for Dial {
    fn tag(&self) -> &'static str {
        "dial"
    }

    fn default_preview(&self, input: &FieldValue, _required: bool, locals: &Locals) -> Option<LocalSet> {
        match input.as_int() {
            Some(level) if (0..=self.max).contains(&level) => None,
            _ => Some(locals.number_between(0, self.max)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, FormData)]
struct Mixer {
    #[input(kind = Dial { max: 11 }, caption = "Volume", description = "Output level")]
    volume: i64,

    #[input(text, caption = "Channel", description = "Channel name")]
    channel: String,
}

fn mixer() -> Mixer {
    Mixer {
        volume: 5,
        channel: "main".to_string(),
    }
}

fn locking_builder(
    context: &FieldContext,
    descriptor: &FieldDescriptor,
    _owner: &dyn OptionSource,
) -> Result<InputPart> {
    let part = InputPart::new(context, descriptor);
    part.set_locked(true);
    Ok(part)
}

#[test]
fn test_unregistered_kind_uses_default_builder() {
    let form = InputForm::with_options(mixer(), FormOptions::new().mapper(FieldMapper::new())).unwrap();
    let volume = form.part("volume").unwrap();
    assert_eq!(volume.kind_tag(), "dial");
    assert!(!volume.is_locked());
    assert!(volume.is_valid());

    volume.set_value(12).unwrap();
    assert!(!volume.is_valid());
    volume.set_value(11).unwrap();
    assert_eq!(form.apply_changes().unwrap().volume, 11);
}

#[test]
fn test_explicit_mapper_builder() {
    let mut mapper = FieldMapper::new();
    mapper.register("dial", locking_builder, false).unwrap();
    assert!(mapper.contains("dial"));

    let form = InputForm::with_options(mixer(), FormOptions::new().mapper(mapper)).unwrap();
    assert!(form.part("volume").unwrap().is_locked());
    assert!(!form.part("channel").unwrap().is_locked());
}

#[test]
fn test_builtin_kinds_are_registered() {
    let mut mapper = FieldMapper::new();
    assert_eq!(
        mapper.kinds(),
        vec!["bool", "browse", "date", "int", "select", "text"]
    );
    let err = mapper
        .register("text", locking_builder, false)
        .unwrap_err();
    assert!(matches!(err, FormError::DuplicateRegistration { ref kind } if kind == "text"));
    mapper.register("text", locking_builder, true).unwrap();

    let form = InputForm::with_options(mixer(), FormOptions::new().mapper(mapper)).unwrap();
    assert!(form.part("channel").unwrap().is_locked());
}

#[test]
fn test_global_registry_snapshot() {
    let before = InputForm::new(mixer()).unwrap();
    assert!(!before.part("volume").unwrap().is_locked());

    register_builder("dial", locking_builder, false).unwrap();
    assert!(global_mapper().contains("dial"));

    let err = register_builder("dial", locking_builder, false).unwrap_err();
    assert!(matches!(err, FormError::DuplicateRegistration { .. }));
    register_builder("dial", locking_builder, true).unwrap();

    let after = InputForm::new(mixer()).unwrap();
    assert!(after.part("volume").unwrap().is_locked());
    // Forms keep the registry they were built with.
    assert!(!before.part("volume").unwrap().is_locked());
}
