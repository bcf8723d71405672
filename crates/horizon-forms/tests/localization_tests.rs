//! Integration tests for localized captions, error messages and TOML
//! configuration.

use std::sync::Arc;

use horizon_forms::prelude::*;
use horizon_forms::FormsConfig;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
namespace = "shop"
default_language = "de"
fallback_language = "en"

[messages.en]
"shop.Profile.nickname.Caption" = "Nickname"
"shop.Profile.nickname.Description" = "How others see you"
"shop.Profile.level.Caption" = "Level"
"shop.Profile.level.Description" = "Skill level"
"shop.FieldRequired" = "This field is required"
"shop.NumberBetweenErrorKey" = "Enter a number between {0} and {1}"
"shop.DefaultSelectOption" = "(none)"
"titles.Profile.team" = "Team"

[messages.de]
"shop.Profile.nickname.Caption" = "Spitzname"
"shop.NumberBetweenErrorKey" = "Zahl zwischen {0} und {1} eingeben"
"shop.DefaultSelectOption" = "(keine)"
"#;

#[derive(Clone, FormData)]
struct Profile {
    #[input(text)]
    nickname: String,

    #[input(int(min = 1, max = 3))]
    level: u8,

    #[input(
        select(options = "teams"),
        caption_key = "titles.{type}.{member}",
        description = "Team membership",
        required = false
    )]
    team: Option<u32>,
}

impl Profile {
    fn teams(&self) -> Vec<SelectOption> {
        vec![SelectOption::new("Red", 1), SelectOption::new("Blue", 2)]
    }
}

fn profile() -> Profile {
    Profile {
        nickname: String::new(),
        level: 1,
        team: None,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("horizon_forms=trace"))
        .with_test_writer()
        .try_init();
}

fn localized_form() -> InputForm<Profile> {
    let config = FormsConfig::from_toml_str(CONFIG).expect("config parses");
    InputForm::with_options(profile(), config.form_options()).expect("form builds")
}

#[test]
fn test_default_caption_keys_resolve_with_fallback() {
    init_tracing();
    let form = localized_form();
    assert_eq!(form.language(), LanguageCode::new("de"));

    let nickname = form.part("nickname").unwrap();
    assert_eq!(nickname.caption(), "Spitzname");
    assert_eq!(nickname.description(), "How others see you");
    assert_eq!(form.part("level").unwrap().caption(), "Level");
    assert_eq!(form.part("team").unwrap().caption(), "Team");
    assert_eq!(form.part("team").unwrap().description(), "Team membership");
}

#[test]
fn test_placeholder_label_is_localized() {
    let form = localized_form();
    let team = form.part("team").unwrap();
    assert_eq!(team.options()[0].label, "(keine)");
    assert_eq!(team.value(), FieldValue::from("(keine)"));
    assert!(team.is_valid());
}

#[test]
fn test_error_messages_follow_language() {
    init_tracing();
    let form = localized_form();
    let level = form.part("level").unwrap();
    let input = FieldValue::from("7");

    assert_eq!(
        level.preview_localized(&input, None).unwrap().as_deref(),
        Some("Zahl zwischen 1 und 3 eingeben")
    );
    assert_eq!(
        level
            .preview_localized(&input, Some(&LanguageCode::new("en")))
            .unwrap()
            .as_deref(),
        Some("Enter a number between 1 and 3")
    );

    assert!(form.set_language("en"));
    assert!(!form.set_language("EN"));
    assert_eq!(
        form.part("nickname")
            .unwrap()
            .preview_localized(&FieldValue::from(""), None)
            .unwrap()
            .as_deref(),
        Some("This field is required")
    );
    assert_eq!(level.preview_localized(&FieldValue::from("2"), None).unwrap(), None);
    // Captions resolved at construction are kept.
    assert_eq!(form.part("nickname").unwrap().caption(), "Spitzname");
}

#[test]
fn test_missing_caption_fails_construction() {
    let err = InputForm::new(profile()).unwrap_err();
    assert!(
        matches!(&err, FormError::LocalizationMissing { key, .. } if key == "iforms.Profile.nickname.Caption"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_missing_message_is_reported() {
    let config = FormsConfig::from_toml_str(CONFIG).unwrap();
    let catalog = StaticLocalizator::new()
        .entry("en", "shop.Profile.nickname.Caption", "Nickname")
        .entry("en", "shop.Profile.nickname.Description", "-")
        .entry("en", "shop.Profile.level.Caption", "Level")
        .entry("en", "shop.Profile.level.Description", "-")
        .entry("en", "titles.Profile.team", "Team");
    let options = FormOptions::new()
        .language("en")
        .locals(config.locals())
        .localizator(Arc::new(catalog));
    let form = InputForm::with_options(profile(), options).unwrap();

    // The placeholder label falls back to its key.
    assert_eq!(
        form.part("team").unwrap().options()[0].label,
        "shop.DefaultSelectOption"
    );
    let err = form
        .part("level")
        .unwrap()
        .preview_localized(&FieldValue::from("9"), None)
        .unwrap_err();
    assert!(matches!(err, FormError::LocalizationMissing { .. }));
}

#[test]
fn test_catalog_loaded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forms.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let config = FormsConfig::load(&path).unwrap();
    assert_eq!(config.namespace, "shop");
    let form = InputForm::with_options(profile(), config.form_options()).unwrap();
    assert_eq!(form.part("nickname").unwrap().caption(), "Spitzname");
}
