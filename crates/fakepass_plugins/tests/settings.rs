//! Configuration loading tests.

use fakepass_plugins::{InjectionSettings, TracingFormat};

#[test]
fn injection_settings_from_json() {
    let settings: InjectionSettings =
        serde_json::from_str(r#"{ "auto_inject": true, "auto_find_injector": true }"#)
            .expect("settings should deserialize");

    assert_eq!(
        settings,
        InjectionSettings::default()
            .with_auto_inject(true)
            .with_auto_find_injector(true)
    );
}

#[test]
fn injection_settings_empty_object_uses_defaults() {
    let settings: InjectionSettings =
        serde_json::from_str("{}").expect("empty settings should deserialize");
    assert_eq!(settings, InjectionSettings::default());
}

#[test]
fn injection_settings_serialize_field_names() {
    let json = serde_json::to_value(InjectionSettings::default().with_auto_inject(true))
        .expect("settings should serialize");
    assert_eq!(
        json,
        serde_json::json!({ "auto_inject": true, "auto_find_injector": false })
    );
}

#[test]
fn tracing_format_lowercase_names() {
    let formats: Vec<TracingFormat> = serde_json::from_str(r#"["pretty", "compact", "json"]"#)
        .expect("formats should deserialize");
    assert_eq!(
        formats,
        vec![
            TracingFormat::Pretty,
            TracingFormat::Compact,
            TracingFormat::Json
        ]
    );
    assert!(serde_json::from_str::<TracingFormat>(r#""Pretty""#).is_err());
}
