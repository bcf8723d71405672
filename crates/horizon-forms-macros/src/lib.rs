//! Procedural macros for Horizon Forms.
//!
//! This crate provides `#[derive(FormData)]`, which turns annotated struct
//! fields into the bound-member table an `InputForm` is built from.
//!
//! # Attributes
//!
//! ## `#[input(...)]`
//!
//! Binds a field. Exactly one kind is required:
//!
//! ```ignore
//! #[input(text)]
//! #[input(int(min = 0, max = 10))]
//! #[input(date(format = "%Y-%m-%d"))]
//! #[input(bool)]
//! #[input(select(options = "colors"))]
//! #[input(browse(filter = "*.toml", title = "Open", must_exist = false))]
//! #[input(kind = MyKind::new())]
//! ```
//!
//! Descriptor options:
//! - `caption = "..."` / `description = "..."`: literal texts
//! - `caption_key = "..."` / `description_key = "..."`: key templates
//! - `required` / `required = false`: required-ness (default `true`)
//! - `preview = "fn_name"`: custom preview, an associated
//!   `fn(&FieldValue) -> Result<Option<LocalSet>>`
//!
//! Fields without `#[input]` are not bound.
//!
//! ## `#[depends(...)]`
//!
//! Declares this field as the master of a dependency:
//!
//! ```ignore
//! #[depends(switch, dependents(comment))]
//! #[depends(callback = "reload_cities", dependents(city), on_any_update)]
//! ```
//!
//! A callback is a method `fn(&self, master: &InputPart, slave: &InputPart)`.
//!
//! ## `#[form(...)]`
//!
//! Struct-level options:
//!
//! ```ignore
//! #[derive(FormData)]
//! #[form(type_name = "Person")]  // Name used in localization keys
//! struct PersonForm {
//!     // ...
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Field, Fields, Ident, LitBool, LitStr,
};

/// Derive the `FormData` trait.
///
/// This macro generates:
/// - `type_name()` from the struct name or `#[form(type_name = "...")]`
/// - `members()`: one `FormMember` per `#[input]` field, in declaration order,
///   whose drafts are also checked against the field's Rust type
/// - `options_for()` dispatching to the named options providers
/// - `preview_fn()` and `dependency_callback()` resolving names to functions
///
/// # Example
///
/// ```ignore
/// use horizon_forms::prelude::*;
///
/// #[derive(Clone, FormData)]
/// struct Order {
///     #[input(select(options = "products"), caption = "Product", description = "-")]
///     product: u32,
///
///     #[input(int(min = 1, max = 99), caption = "Quantity", description = "-")]
///     quantity: u32,
/// }
///
/// impl Order {
///     fn products(&self) -> Vec<SelectOption> {
///         vec![SelectOption::new("Tea", 1), SelectOption::new("Coffee", 2)]
///     }
/// }
/// ```
#[proc_macro_derive(FormData, attributes(form, input, depends))]
pub fn derive_form_data(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_form_data(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed field kind.
enum KindAttr {
    Text,
    Int { min: Option<Expr>, max: Option<Expr> },
    Date { format: Option<LitStr> },
    Bool,
    Select { options: LitStr },
    Browse {
        filter: Option<LitStr>,
        initial_directory: Option<LitStr>,
        title: Option<LitStr>,
        must_exist: Option<LitBool>,
    },
    Custom(Expr),
}

/// Parsed `#[input(...)]` attribute.
struct InputInfo {
    field_name: Ident,
    kind: KindAttr,
    caption: Option<LitStr>,
    caption_key: Option<LitStr>,
    description: Option<LitStr>,
    description_key: Option<LitStr>,
    required: Option<bool>,
    preview: Option<LitStr>,
    dependency: Option<DependsInfo>,
}

/// Parsed `#[depends(...)]` attribute.
struct DependsInfo {
    callback: Option<LitStr>,
    dependents: Vec<String>,
    on_any_update: bool,
}

fn impl_derive_form_data(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = parse_form_attrs(&input.attrs)?.unwrap_or_else(|| struct_name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "FormData derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "FormData derive only supports structs",
            ))
        }
    };

    let mut inputs = Vec::new();
    for field in fields.iter() {
        if let Some(info) = parse_input_field(field)? {
            inputs.push((info, field));
        }
    }

    let members: Vec<TokenStream2> = inputs
        .iter()
        .map(|(info, field)| generate_member(info, field))
        .collect();

    let providers: Vec<&LitStr> = inputs
        .iter()
        .filter_map(|(info, _)| match &info.kind {
            KindAttr::Select { options } => Some(options),
            _ => None,
        })
        .collect();
    let provider_arms = dedup(&providers).into_iter().map(|lit| {
        let function = Ident::new(&lit.value(), lit.span());
        quote! { #lit => ::std::option::Option::Some(self.#function()), }
    });

    let previews: Vec<&LitStr> = inputs
        .iter()
        .filter_map(|(info, _)| info.preview.as_ref())
        .collect();
    let preview_arms = dedup(&previews).into_iter().map(|lit| {
        let function = Ident::new(&lit.value(), lit.span());
        quote! {
            #lit => ::std::option::Option::Some(Self::#function as ::horizon_forms::CustomPreview),
        }
    });

    let callbacks: Vec<&LitStr> = inputs
        .iter()
        .filter_map(|(info, _)| info.dependency.as_ref()?.callback.as_ref())
        .collect();
    let callback_arms = dedup(&callbacks).into_iter().map(|lit| {
        let function = Ident::new(&lit.value(), lit.span());
        quote! {
            #lit => ::std::option::Option::Some(
                Self::#function as ::horizon_forms::DependencyFn<Self>
            ),
        }
    });

    let expanded = quote! {
        impl #impl_generics ::horizon_forms::FormData for #struct_name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn members() -> ::std::vec::Vec<::horizon_forms::FormMember<Self>> {
                ::std::vec![#(#members),*]
            }

            #[allow(unused_variables)]
            fn options_for(
                &self,
                provider: &str,
            ) -> ::std::option::Option<::std::vec::Vec<::horizon_forms::SelectOption>> {
                match provider {
                    #(#provider_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn preview_fn(name: &str) -> ::std::option::Option<::horizon_forms::CustomPreview> {
                match name {
                    #(#preview_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn dependency_callback(
                name: &str,
            ) -> ::std::option::Option<::horizon_forms::DependencyFn<Self>> {
                match name {
                    #(#callback_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Parse struct-level #[form(...)] attributes.
fn parse_form_attrs(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut type_name = None;

    for attr in attrs {
        if !attr.path().is_ident("form") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                let value: LitStr = meta.value()?.parse()?;
                type_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute"))
            }
        })?;
    }

    Ok(type_name)
}

/// Parse the #[input] and #[depends] attributes of a field.
fn parse_input_field(field: &Field) -> syn::Result<Option<InputInfo>> {
    let Some(field_name) = field.ident.clone() else {
        return Ok(None);
    };
    let Some(input_attr) = field.attrs.iter().find(|attr| attr.path().is_ident("input")) else {
        if let Some(depends) = field.attrs.iter().find(|attr| attr.path().is_ident("depends")) {
            return Err(syn::Error::new_spanned(
                depends,
                "#[depends] requires an #[input] attribute on the same field",
            ));
        }
        return Ok(None);
    };

    let mut kind = None;
    let mut caption = None;
    let mut caption_key = None;
    let mut description = None;
    let mut description_key = None;
    let mut required = None;
    let mut preview = None;

    input_attr.parse_nested_meta(|meta| {
        let parsed = if meta.path.is_ident("text") {
            Some(KindAttr::Text)
        } else if meta.path.is_ident("int") {
            Some(parse_int_kind(&meta)?)
        } else if meta.path.is_ident("date") {
            Some(parse_date_kind(&meta)?)
        } else if meta.path.is_ident("bool") {
            Some(KindAttr::Bool)
        } else if meta.path.is_ident("select") {
            Some(parse_select_kind(&meta)?)
        } else if meta.path.is_ident("browse") {
            Some(parse_browse_kind(&meta)?)
        } else if meta.path.is_ident("kind") {
            Some(KindAttr::Custom(meta.value()?.parse()?))
        } else {
            None
        };

        if let Some(parsed) = parsed {
            if kind.is_some() {
                return Err(meta.error("only one field kind may be given"));
            }
            kind = Some(parsed);
        } else if meta.path.is_ident("caption") {
            caption = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("caption_key") {
            caption_key = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("description") {
            description = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("description_key") {
            description_key = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("required") {
            required = Some(parse_flag(&meta)?);
        } else if meta.path.is_ident("preview") {
            preview = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unsupported input attribute"));
        }
        Ok(())
    })?;

    let Some(kind) = kind else {
        return Err(syn::Error::new_spanned(
            input_attr,
            "#[input] requires a field kind: text, int, date, bool, select, browse or kind = ...",
        ));
    };

    let dependency = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("depends"))
        .map(parse_depends)
        .transpose()?;

    Ok(Some(InputInfo {
        field_name,
        kind,
        caption,
        caption_key,
        description,
        description_key,
        required,
        preview,
        dependency,
    }))
}

fn parse_int_kind(meta: &ParseNestedMeta) -> syn::Result<KindAttr> {
    let mut min = None;
    let mut max = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("min") {
                min = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("max") {
                max = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("expected `min` or `max`"));
            }
            Ok(())
        })?;
    }
    Ok(KindAttr::Int { min, max })
}

fn parse_date_kind(meta: &ParseNestedMeta) -> syn::Result<KindAttr> {
    let mut format = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("format") {
                format = Some(inner.value()?.parse()?);
                Ok(())
            } else {
                Err(inner.error("expected `format`"))
            }
        })?;
    }
    Ok(KindAttr::Date { format })
}

fn parse_select_kind(meta: &ParseNestedMeta) -> syn::Result<KindAttr> {
    let mut options = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("options") {
            options = Some(inner.value()?.parse()?);
            Ok(())
        } else {
            Err(inner.error("expected `options`"))
        }
    })?;
    let options = options.ok_or_else(|| meta.error("select requires `options = \"provider\"`"))?;
    Ok(KindAttr::Select { options })
}

fn parse_browse_kind(meta: &ParseNestedMeta) -> syn::Result<KindAttr> {
    let mut filter = None;
    let mut initial_directory = None;
    let mut title = None;
    let mut must_exist = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("filter") {
                filter = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("initial_directory") {
                initial_directory = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("title") {
                title = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("must_exist") {
                must_exist = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("unsupported browse attribute"));
            }
            Ok(())
        })?;
    }
    Ok(KindAttr::Browse {
        filter,
        initial_directory,
        title,
        must_exist,
    })
}

/// Parse `flag` or `flag = bool`.
fn parse_flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(syn::Token![=]) {
        let value: LitBool = meta.value()?.parse()?;
        Ok(value.value)
    } else {
        Ok(true)
    }
}

fn parse_depends(attr: &Attribute) -> syn::Result<DependsInfo> {
    let mut switch = false;
    let mut callback: Option<LitStr> = None;
    let mut dependents = Vec::new();
    let mut on_any_update = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("switch") {
            switch = true;
        } else if meta.path.is_ident("callback") {
            callback = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("dependents") {
            meta.parse_nested_meta(|inner| {
                let ident = inner
                    .path
                    .get_ident()
                    .ok_or_else(|| inner.error("expected a field name"))?;
                dependents.push(ident.to_string());
                Ok(())
            })?;
        } else if meta.path.is_ident("on_any_update") {
            on_any_update = true;
        } else {
            return Err(meta.error("unsupported depends attribute"));
        }
        Ok(())
    })?;

    if switch == callback.is_some() {
        return Err(syn::Error::new_spanned(
            attr,
            "#[depends] requires exactly one of `switch` or `callback = \"...\"`",
        ));
    }

    Ok(DependsInfo {
        callback,
        dependents,
        on_any_update,
    })
}

/// Generate one `FormMember` expression.
fn generate_member(info: &InputInfo, field: &Field) -> TokenStream2 {
    let field_name = &info.field_name;
    let field_name_str = field_name.to_string();
    let field_type = &field.ty;
    let descriptor = generate_descriptor(info);

    let dependency = info.dependency.as_ref().map(|depends| {
        let dependents = &depends.dependents;
        let count = dependents.len();
        let constructor = match &depends.callback {
            Some(callback) => quote! {
                ::horizon_forms::DependencyDecl::callback::<[&'static str; #count], &'static str>(
                    #callback,
                    [#(#dependents),*],
                )
            },
            None => quote! {
                ::horizon_forms::DependencyDecl::switch::<[&'static str; #count], &'static str>(
                    [#(#dependents),*],
                )
            },
        };
        let trigger = if depends.on_any_update {
            quote! { .on_any_update() }
        } else {
            quote! {}
        };
        quote! { .with_dependency(#constructor #trigger) }
    });

    quote! {
        ::horizon_forms::FormMember::<Self>::new(
            #field_name_str,
            #descriptor,
            |owner: &Self| ::horizon_forms::FieldType::to_field_value(&owner.#field_name),
            |owner: &mut Self, value: ::horizon_forms::FieldValue| {
                owner.#field_name =
                    <#field_type as ::horizon_forms::FieldType>::from_field_value(value)?;
                ::std::result::Result::Ok(())
            },
        )
        .with_check(::horizon_forms::preview::member_check::<#field_type>)
        #dependency
    }
}

/// Generate the `FieldDescriptor` expression of a field.
fn generate_descriptor(info: &InputInfo) -> TokenStream2 {
    let kind = generate_kind(&info.kind);

    let mut calls = Vec::new();
    if let Some(caption) = &info.caption {
        calls.push(quote! { .caption(#caption) });
    }
    if let Some(key) = &info.caption_key {
        calls.push(quote! { .caption_key(#key) });
    }
    if let Some(description) = &info.description {
        calls.push(quote! { .description(#description) });
    }
    if let Some(key) = &info.description_key {
        calls.push(quote! { .description_key(#key) });
    }
    if let Some(required) = info.required {
        calls.push(quote! { .required(#required) });
    }
    if let Some(preview) = &info.preview {
        calls.push(quote! { .preview(#preview) });
    }

    quote! {
        ::horizon_forms::FieldDescriptor::new(#kind) #(#calls)*
    }
}

fn generate_kind(kind: &KindAttr) -> TokenStream2 {
    match kind {
        KindAttr::Text => quote! { ::horizon_forms::kinds::TextInput },
        KindAttr::Int { min, max } => {
            let min = option_i64(min.as_ref());
            let max = option_i64(max.as_ref());
            quote! { ::horizon_forms::kinds::IntInput { min: #min, max: #max } }
        }
        KindAttr::Date { format: Some(format) } => {
            quote! { ::horizon_forms::kinds::DateInput::new(#format) }
        }
        KindAttr::Date { format: None } => {
            quote! { <::horizon_forms::kinds::DateInput as ::std::default::Default>::default() }
        }
        KindAttr::Bool => quote! { ::horizon_forms::kinds::BoolInput },
        KindAttr::Select { options } => {
            quote! { ::horizon_forms::kinds::SelectInput::new(#options) }
        }
        KindAttr::Browse {
            filter,
            initial_directory,
            title,
            must_exist,
        } => {
            let filter = filter.as_ref().map(|v| quote! { .filter(#v) });
            let initial_directory = initial_directory
                .as_ref()
                .map(|v| quote! { .initial_directory(#v) });
            let title = title.as_ref().map(|v| quote! { .title(#v) });
            let must_exist = must_exist.as_ref().map(|v| quote! { .must_exist(#v) });
            quote! {
                ::horizon_forms::kinds::BrowseInput::new()
                    #filter #initial_directory #title #must_exist
            }
        }
        KindAttr::Custom(expr) => quote! { #expr },
    }
}

fn option_i64(expr: Option<&Expr>) -> TokenStream2 {
    match expr {
        Some(expr) => quote! { ::std::option::Option::Some((#expr) as i64) },
        None => quote! { ::std::option::Option::None },
    }
}

/// Remove repeated names, keeping first occurrences.
fn dedup<'a>(names: &[&'a LitStr]) -> Vec<&'a LitStr> {
    let mut seen = Vec::new();
    let mut unique = Vec::new();
    for lit in names {
        let value = lit.value();
        if !seen.contains(&value) {
            seen.push(value);
            unique.push(*lit);
        }
    }
    unique
}
