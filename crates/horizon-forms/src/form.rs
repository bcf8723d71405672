//! The form: input parts for every bound member of an owner object.
//!
//! [`InputForm::new`] builds the form in two passes over `T::members()`:
//!
//! 1. **Materialization.** Each member's caption and description are
//!    localized, the field builder registry produces an input part seeded
//!    with the member's current value, the custom preview (if any) is
//!    attached, and the part is validated and connected to the form's
//!    `validation_changed` fan-in.
//! 2. **Dependency wiring.** Each dependency declaration is checked and
//!    turned into [`DependencyLink`]s subscribed on the master part.
//!
//! Any error aborts construction; no partially built form is returned.
//!
//! [`InputForm::apply_changes`] commits every part's resolved value back
//! onto the owner, either all of them or none.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_forms_core::logging::targets;
use horizon_forms_core::{
    FieldValue, FormError, LanguageCode, Localizator, PerfSpan, Result, Signal,
};

use crate::binding::{FormData, FormMember, Setter};
use crate::context::{FieldContext, FormEnvironment};
use crate::dependency::{switch_dependent, DependencyCallback, DependencyDecl, DependencyLink, Trigger};
use crate::locals::Locals;
use crate::mapper::{global_mapper, FieldMapper};
use crate::part::InputPart;
use crate::preview::custom_preview;

type LinkCallback = Arc<dyn Fn(&InputPart, &InputPart) + Send + Sync>;

/// Per-form construction options.
#[derive(Clone, Default)]
pub struct FormOptions {
    /// Initial language. Defaults to `en`.
    pub language: Option<LanguageCode>,
    /// Resolves captions, descriptions and error descriptors.
    pub localizator: Option<Arc<dyn Localizator>>,
    /// Builder registry to use instead of a snapshot of the global one.
    pub mapper: Option<FieldMapper>,
    /// Error key table. Defaults to the `iforms` namespace.
    pub locals: Option<Locals>,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<LanguageCode>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn localizator(mut self, localizator: Arc<dyn Localizator>) -> Self {
        self.localizator = Some(localizator);
        self
    }

    pub fn mapper(mut self, mapper: FieldMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn locals(mut self, locals: Locals) -> Self {
        self.locals = Some(locals);
        self
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("language", &self.language)
            .field("has_localizator", &self.localizator.is_some())
            .field("mapper", &self.mapper)
            .field("locals", &self.locals)
            .finish()
    }
}

/// An editable form over an owner object of type `T`.
pub struct InputForm<T: FormData> {
    data: Arc<RwLock<T>>,
    parts: Vec<Arc<InputPart>>,
    setters: Vec<Setter<T>>,
    links: Vec<DependencyLink>,
    environment: Arc<FormEnvironment>,

    /// Emitted with `(member, valid)` whenever any part's validity flips.
    pub validation_changed: Arc<Signal<(String, bool)>>,
}

impl<T: FormData> InputForm<T> {
    /// Build a form with default options and a snapshot of the global
    /// builder registry.
    pub fn new(data: T) -> Result<Self> {
        Self::with_options(data, FormOptions::default())
    }

    /// Build a form with explicit options.
    pub fn with_options(data: T, options: FormOptions) -> Result<Self> {
        let _span = PerfSpan::new("form_construct");
        let type_name = T::type_name();
        let environment = Arc::new(FormEnvironment::new(
            options.locals.unwrap_or_default(),
            options.localizator,
            options.language.unwrap_or_default(),
        ));
        let mapper = options.mapper.unwrap_or_else(global_mapper);
        let members = T::members();
        let validation_changed = Arc::new(Signal::new());

        let parts = members
            .iter()
            .map(|member| materialize(member, &data, &mapper, &environment, &validation_changed))
            .collect::<Result<Vec<_>>>()?;

        let data = Arc::new(RwLock::new(data));
        let mut links = Vec::new();
        for member in &members {
            if let Some(decl) = &member.dependency {
                links.extend(wire(member.name, decl, &parts, &data)?);
            }
        }

        tracing::debug!(
            target: targets::FORM,
            type_name,
            parts = parts.len(),
            links = links.len(),
            "form constructed"
        );

        Ok(Self {
            data,
            parts,
            setters: members.iter().map(|member| member.set).collect(),
            links,
            environment,
            validation_changed,
        })
    }

    // =========================================================================
    // Parts
    // =========================================================================

    /// Parts in declaration order.
    pub fn parts(&self) -> &[Arc<InputPart>] {
        &self.parts
    }

    /// The part bound to `member`.
    pub fn part(&self, member: &str) -> Option<&Arc<InputPart>> {
        self.parts.iter().find(|part| part.member() == member)
    }

    /// The wired dependency links.
    pub fn links(&self) -> &[DependencyLink] {
        &self.links
    }

    /// Whether every part is valid. Computed on each call.
    pub fn is_valid(&self) -> bool {
        self.parts.iter().all(|part| part.is_valid())
    }

    /// Members whose parts are not valid, in declaration order.
    pub fn invalid_members(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter(|part| !part.is_valid())
            .map(|part| part.member().to_string())
            .collect()
    }

    /// Re-fetch the options of `member` from the owner object.
    pub fn refresh_options(&self, member: &str) -> Result<()> {
        let part = self.part(member).ok_or_else(|| FormError::DependencyTargetNotFound {
            member: member.to_string(),
        })?;
        let data = self.data();
        part.refresh_options(&data)
    }

    // =========================================================================
    // Environment
    // =========================================================================

    pub fn environment(&self) -> &Arc<FormEnvironment> {
        &self.environment
    }

    pub fn language(&self) -> LanguageCode {
        self.environment.language()
    }

    /// Change the language used by `preview_localized`. Captions resolved
    /// at construction are kept.
    pub fn set_language(&self, language: impl Into<LanguageCode>) -> bool {
        self.environment.set_language(language.into())
    }

    // =========================================================================
    // Owner access and commit
    // =========================================================================

    /// A copy of the owner object as of the last commit.
    pub fn data(&self) -> T {
        self.data.read_recursive().clone()
    }

    /// Write every part's resolved value back onto the owner.
    ///
    /// Fails with `FormInvalid` and leaves the owner untouched if any part
    /// is invalid. A setter failure also leaves the owner untouched: values
    /// are applied to a copy that replaces the owner only once every
    /// setter succeeded. Returns a copy of the updated owner.
    pub fn apply_changes(&self) -> Result<T> {
        let _span = PerfSpan::new("form_commit");
        let invalid = self.invalid_members();
        if !invalid.is_empty() {
            tracing::info!(
                target: targets::FORM,
                type_name = T::type_name(),
                ?invalid,
                "commit rejected"
            );
            return Err(FormError::FormInvalid { invalid });
        }

        let mut updated = self.data.read_recursive().clone();
        for (part, set) in self.parts.iter().zip(&self.setters) {
            set(&mut updated, part.get_resolved_value())?;
        }
        *self.data.write() = updated.clone();

        tracing::info!(
            target: targets::FORM,
            type_name = T::type_name(),
            fields = self.parts.len(),
            "changes applied"
        );
        Ok(updated)
    }

    /// Consume the form and return the owner object.
    pub fn into_data(self) -> T {
        match Arc::try_unwrap(self.data) {
            Ok(lock) => lock.into_inner(),
            Err(shared) => shared.read_recursive().clone(),
        }
    }
}

impl<T: FormData> fmt::Debug for InputForm<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputForm")
            .field("type_name", &T::type_name())
            .field("parts", &self.parts)
            .field("links", &self.links)
            .finish()
    }
}

/// Pass 1 for one member.
fn materialize<T: FormData>(
    member: &FormMember<T>,
    data: &T,
    mapper: &FieldMapper,
    environment: &Arc<FormEnvironment>,
    fan_in: &Arc<Signal<(String, bool)>>,
) -> Result<Arc<InputPart>> {
    let type_name = T::type_name();
    let descriptor = &member.descriptor;
    let (caption, description) = descriptor.localize(type_name, member.name, environment)?;
    let context = FieldContext {
        member: member.name.to_string(),
        type_name,
        caption,
        description,
        value: (member.get)(data),
        environment: environment.clone(),
    };

    let mut part = mapper.resolve(&context, descriptor, data)?;
    if let Some(name) = descriptor.preview_name() {
        match T::preview_fn(name) {
            Some(function) => part.set_preview(Some(custom_preview(function))),
            None => tracing::warn!(
                target: targets::FORM,
                type_name,
                member = member.name,
                preview = name,
                "custom preview not found, using the default preview"
            ),
        }
    }
    part.set_member_check(member.check);
    part.validate()?;

    let part = Arc::new(part);
    let fan_in = Arc::downgrade(fan_in);
    let name = member.name.to_string();
    part.validation_changed.connect(move |valid| {
        if let Some(signal) = fan_in.upgrade() {
            signal.emit((name.clone(), *valid));
        }
    });
    tracing::debug!(
        target: targets::FORM,
        member = member.name,
        kind = part.kind_tag(),
        valid = part.is_valid(),
        "part materialized"
    );
    Ok(part)
}

/// Pass 2 for one declaration on `master_name`.
fn wire<T: FormData>(
    master_name: &str,
    decl: &DependencyDecl,
    parts: &[Arc<InputPart>],
    data: &Arc<RwLock<T>>,
) -> Result<Vec<DependencyLink>> {
    if decl.dependents().is_empty() {
        return Err(FormError::invalid_dependency(master_name, "no dependents declared"));
    }
    if decl.dependents().iter().any(|slave| slave == master_name) {
        return Err(FormError::invalid_dependency(master_name, "member depends on itself"));
    }

    let find = |name: &str| -> Result<Arc<InputPart>> {
        parts
            .iter()
            .find(|part| part.member() == name)
            .cloned()
            .ok_or_else(|| FormError::DependencyTargetNotFound {
                member: name.to_string(),
            })
    };
    let master = find(master_name)?;
    let slaves = decl
        .dependents()
        .iter()
        .map(|name| find(name.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let callback: LinkCallback = match decl.callback_ref() {
        DependencyCallback::Switch => Arc::new(switch_dependent),
        DependencyCallback::Owner(name) => {
            let function =
                T::dependency_callback(name).ok_or_else(|| FormError::CallbackNotFound {
                    callback: name.clone(),
                    type_name: T::type_name().to_string(),
                })?;
            let owner = Arc::downgrade(data);
            Arc::new(move |master: &InputPart, slave: &InputPart| {
                if let Some(owner) = owner.upgrade() {
                    // No lock is held while the callback runs.
                    let snapshot = owner.read_recursive().clone();
                    function(&snapshot, master, slave);
                }
            })
        }
    };

    let links = slaves
        .into_iter()
        .map(|slave| {
            let weak_master = Arc::downgrade(&master);
            let weak_slave = Arc::downgrade(&slave);
            let callback = callback.clone();
            let slot = move |_: &FieldValue| {
                if let (Some(master), Some(slave)) = (weak_master.upgrade(), weak_slave.upgrade()) {
                    tracing::trace!(
                        target: targets::DEPENDENCY,
                        master = master.member(),
                        slave = slave.member(),
                        "dependency fired"
                    );
                    callback(&master, &slave);
                }
            };
            let connection = match decl.trigger() {
                Trigger::OnAnyUpdate => master.value_updated.connect(slot),
                Trigger::OnSuccessfulValidation => master.validation_succeeded.connect(slot),
            };
            tracing::debug!(
                target: targets::DEPENDENCY,
                master = master_name,
                slave = slave.member(),
                trigger = ?decl.trigger(),
                callback = decl.callback_ref().name(),
                "dependency wired"
            );
            DependencyLink {
                master: master_name.to_string(),
                slave: slave.member().to_string(),
                trigger: decl.trigger(),
                callback: decl.callback_ref().name().to_string(),
                connection,
            }
        })
        .collect();
    Ok(links)
}

#[cfg(test)]
mod tests {
    use std::marker::PhantomData;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::binding::DependencyFn;
    use crate::descriptor::FieldDescriptor;
    use crate::kinds::{BoolInput, IntInput, TextInput};
    use horizon_forms_core::{FieldType, StaticLocalizator};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Order {
        item: String,
        quantity: i64,
        gift: bool,
        note: String,
    }

    /// Picks the dependency declared on `gift`.
    trait GiftDependency: Send + Sync + 'static {
        fn decl() -> Option<DependencyDecl>;
    }

    macro_rules! gift_dependency {
        ($name:ident, $decl:expr) => {
            #[derive(Debug, Clone, PartialEq)]
            struct $name;

            impl GiftDependency for $name {
                fn decl() -> Option<DependencyDecl> {
                    $decl
                }
            }
        };
    }

    gift_dependency!(Plain, None);
    gift_dependency!(Switched, Some(DependencyDecl::switch(["note"])));
    gift_dependency!(SelfDependent, Some(DependencyDecl::switch(["gift"])));
    gift_dependency!(Dangling, Some(DependencyDecl::switch(["missing"])));
    gift_dependency!(NoCallback, Some(DependencyDecl::callback("nope", ["note"])));
    gift_dependency!(NoDependents, Some(DependencyDecl::switch(Vec::<String>::new())));
    gift_dependency!(
        Callback,
        Some(DependencyDecl::callback("clear_note", ["note"]).on_any_update())
    );

    #[derive(Debug, Clone, PartialEq)]
    struct Wired<D>(Order, PhantomData<D>);

    fn wired<D>(order: Order) -> Wired<D> {
        Wired(order, PhantomData)
    }

    static NOTES_CLEARED: AtomicUsize = AtomicUsize::new(0);

    fn clear_note<D>(_owner: &Wired<D>, master: &InputPart, slave: &InputPart) {
        if master.get_resolved_value() == FieldValue::Bool(false) {
            NOTES_CLEARED.fetch_add(1, Ordering::SeqCst);
            let _ = slave.set_value("");
        }
    }

    impl<D: GiftDependency + Clone> FormData for Wired<D> {
        fn type_name() -> &'static str {
            "Order"
        }

        fn members() -> Vec<FormMember<Self>> {
            let mut gift = FormMember::new(
                "gift",
                FieldDescriptor::new(BoolInput).caption("Gift").description("-"),
                |o: &Self| o.0.gift.to_field_value(),
                |o: &mut Self, v| {
                    o.0.gift = bool::from_field_value(v)?;
                    Ok(())
                },
            );
            if let Some(decl) = D::decl() {
                gift = gift.with_dependency(decl);
            }
            vec![
                FormMember::new(
                    "item",
                    FieldDescriptor::new(TextInput).caption("Item").description("-"),
                    |o: &Self| o.0.item.to_field_value(),
                    |o: &mut Self, v| {
                        o.0.item = String::from_field_value(v)?;
                        Ok(())
                    },
                ),
                FormMember::new(
                    "quantity",
                    FieldDescriptor::new(IntInput::between(1, 10))
                        .caption("Quantity")
                        .description("-"),
                    |o: &Self| o.0.quantity.to_field_value(),
                    |o: &mut Self, v| {
                        o.0.quantity = i64::from_field_value(v)?;
                        Ok(())
                    },
                ),
                gift,
                FormMember::new(
                    "note",
                    FieldDescriptor::new(TextInput)
                        .caption("Note")
                        .description("-")
                        .required(false),
                    |o: &Self| o.0.note.to_field_value(),
                    |o: &mut Self, v| {
                        o.0.note = String::from_field_value(v)?;
                        Ok(())
                    },
                ),
            ]
        }

        fn dependency_callback(name: &str) -> Option<DependencyFn<Self>> {
            match name {
                "clear_note" => Some(clear_note::<D>),
                _ => None,
            }
        }
    }

    fn order() -> Order {
        Order {
            item: "Tea".into(),
            quantity: 2,
            gift: false,
            note: String::new(),
        }
    }

    #[test]
    fn test_parts_follow_declaration_order() {
        let form = InputForm::new(wired::<Plain>(order())).unwrap();
        let names: Vec<_> = form.parts().iter().map(|p| p.member().to_string()).collect();
        assert_eq!(names, ["item", "quantity", "gift", "note"]);
        assert_eq!(form.part("quantity").unwrap().value(), FieldValue::Text("2".into()));
        assert!(form.is_valid());
        assert!(form.links().is_empty());
    }

    #[test]
    fn test_invalid_seed_is_reported() {
        let mut data = order();
        data.quantity = 0;
        let form = InputForm::new(wired::<Plain>(data)).unwrap();
        assert_eq!(form.invalid_members(), vec!["quantity".to_string()]);
    }

    #[test]
    fn test_commit_applies_resolved_values() {
        let form = InputForm::new(wired::<Plain>(order())).unwrap();
        form.part("quantity").unwrap().set_value("7").unwrap();
        form.part("note").unwrap().set_value("wrap it").unwrap();

        let committed = form.apply_changes().unwrap();
        assert_eq!(committed.0.quantity, 7);
        assert_eq!(committed.0.note, "wrap it");
        assert_eq!(form.apply_changes().unwrap(), committed);
        assert_eq!(form.data(), committed);
        assert_eq!(form.into_data(), committed);
    }

    #[test]
    fn test_commit_rejected_when_invalid() {
        let form = InputForm::new(wired::<Plain>(order())).unwrap();
        form.part("note").unwrap().set_value("changed").unwrap();
        form.part("quantity").unwrap().set_value("99").unwrap();

        for _ in 0..2 {
            assert_eq!(
                form.apply_changes().unwrap_err(),
                FormError::FormInvalid {
                    invalid: vec!["quantity".into()]
                }
            );
            assert_eq!(form.data().0, order());
        }
    }

    #[test]
    fn test_validation_fan_in() {
        let form = InputForm::new(wired::<Plain>(order())).unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let s = seen.clone();
        form.validation_changed.connect(move |(member, valid)| {
            s.lock().push((member.clone(), *valid));
        });

        let item = form.part("item").unwrap();
        item.set_value("").unwrap();
        item.set_value("Coffee").unwrap();
        item.set_value("Cocoa").unwrap();

        assert_eq!(
            *seen.lock(),
            vec![("item".to_string(), false), ("item".to_string(), true)]
        );
    }

    #[test]
    fn test_switch_dependency() {
        let form = InputForm::new(wired::<Switched>(order())).unwrap();
        assert_eq!(form.links().len(), 1);
        assert_eq!(form.links()[0].slave, "note");

        let gift = form.part("gift").unwrap();
        let note = form.part("note").unwrap();
        gift.set_value(true).unwrap();
        assert!(note.is_locked());
        gift.set_value(false).unwrap();
        assert!(!note.is_locked());
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            InputForm::new(wired::<SelfDependent>(order())).unwrap_err(),
            FormError::invalid_dependency("gift", "member depends on itself")
        );
        assert_eq!(
            InputForm::new(wired::<Dangling>(order())).unwrap_err(),
            FormError::DependencyTargetNotFound {
                member: "missing".into()
            }
        );
        assert_eq!(
            InputForm::new(wired::<NoCallback>(order())).unwrap_err(),
            FormError::CallbackNotFound {
                callback: "nope".into(),
                type_name: "Order".into()
            }
        );
        assert!(matches!(
            InputForm::new(wired::<NoDependents>(order())),
            Err(FormError::InvalidDependency { .. })
        ));
    }

    #[test]
    fn test_owner_callback_on_any_update() {
        let form = InputForm::new(wired::<Callback>(order())).unwrap();
        let gift = form.part("gift").unwrap();
        let note = form.part("note").unwrap();
        note.set_value("hello").unwrap();

        let before = NOTES_CLEARED.load(Ordering::SeqCst);
        gift.set_value(true).unwrap();
        assert_eq!(note.value(), FieldValue::Text("hello".into()));
        gift.set_value(false).unwrap();
        assert_eq!(note.value(), FieldValue::Text(String::new()));
        assert!(NOTES_CLEARED.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn test_captions_localized_from_default_keys() {
        #[derive(Clone)]
        struct Named {
            title: String,
        }

        impl FormData for Named {
            fn type_name() -> &'static str {
                "Named"
            }

            fn members() -> Vec<FormMember<Self>> {
                vec![FormMember::new(
                    "title",
                    FieldDescriptor::new(TextInput),
                    |n| n.title.to_field_value(),
                    |n, v| {
                        n.title = String::from_field_value(v)?;
                        Ok(())
                    },
                )]
            }
        }

        let data = Named { title: "x".into() };
        assert_eq!(
            InputForm::new(data.clone()).unwrap_err(),
            FormError::localization_missing("iforms.Named.title.Caption", "en")
        );

        let loc = StaticLocalizator::new()
            .entry("en", "iforms.Named.title.Caption", "Title")
            .entry("en", "iforms.Named.title.Description", "The title");
        let form = InputForm::with_options(data, FormOptions::new().localizator(Arc::new(loc))).unwrap();
        let part = form.part("title").unwrap();
        assert_eq!(part.caption(), "Title");
        assert_eq!(part.description(), "The title");
    }
}
