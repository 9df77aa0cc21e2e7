//! Settings store behavior against a real database.
//!
//! Run with: `cargo test -p sitedesk-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};

use sitedesk_core::{SettingKey, SettingType};
use sitedesk_integration_tests::TestDb;
use sitedesk_server::db::SettingsRepository;
use sitedesk_server::services::{SettingsError, SettingsService};
use sitedesk_server::site_config::{DecodeFailure, Namespace, SiteConfig};

// =============================================================================
// Upsert
// =============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_upsert_twice_leaves_one_row() {
    let db = TestDb::new().await;
    let service = SettingsService::new(&db.pool);

    let first = service
        .upsert("about_title", r#""About Us""#, SettingType::String)
        .await
        .unwrap();
    let second = service
        .upsert("about_title", r#""About Us""#, SettingType::String)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);

    let all = SettingsRepository::new(&db.pool).list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, r#""About Us""#);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_upsert_overwrites_value_and_type() {
    let db = TestDb::new().await;
    let service = SettingsService::new(&db.pool);

    service
        .upsert("about_values", r#""none""#, SettingType::String)
        .await
        .unwrap();
    let updated = service
        .upsert("about_values", r#"["Quality","Trust"]"#, SettingType::Json)
        .await
        .unwrap();

    assert_eq!(updated.setting_type, SettingType::Json);
    assert!(updated.updated_at >= updated.created_at);

    let key = SettingKey::parse("about_values").unwrap();
    let stored = SettingsRepository::new(&db.pool)
        .get_by_key(&key)
        .await
        .unwrap();
    assert_eq!(stored.value, r#"["Quality","Trust"]"#);
    assert_eq!(stored.setting_type, SettingType::Json);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_json_value_round_trips() {
    let db = TestDb::new().await;
    let original = json!({
        "links": [
            { "label": "Careers", "url": "/careers" },
            { "label": "Press", "url": "/press", "external": false }
        ],
        "columns": 2,
        "note": null
    });

    SettingsService::new(&db.pool)
        .upsert("footer_links", &original.to_string(), SettingType::Json)
        .await
        .unwrap();

    let key = SettingKey::parse("footer_links").unwrap();
    let stored = SettingsRepository::new(&db.pool)
        .get_by_key(&key)
        .await
        .unwrap();
    assert_eq!(stored.setting_type, SettingType::Json);
    let parsed: Value = serde_json::from_str(&stored.value).unwrap();
    assert_eq!(parsed, original);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_upserts_to_one_key_keep_one_row() {
    let db = TestDb::new().await;
    let service = SettingsService::new(&db.pool);

    let (a, b) = tokio::join!(
        service.upsert("hero_title", r#""A""#, SettingType::String),
        service.upsert("hero_title", r#""B""#, SettingType::String),
    );
    a.unwrap();
    b.unwrap();

    let all = SettingsRepository::new(&db.pool).list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].value == r#""A""# || all[0].value == r#""B""#);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_invalid_json_is_not_stored() {
    let db = TestDb::new().await;
    let service = SettingsService::new(&db.pool);

    let err = service
        .upsert("seo_keywords", "[broken", SettingType::Json)
        .await
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidJson(_)));

    let all = SettingsRepository::new(&db.pool).list_all().await.unwrap();
    assert!(all.is_empty());
}

// =============================================================================
// Decoding stored rows
// =============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_badly_named_row_does_not_hide_the_others() {
    let db = TestDb::new().await;
    SettingsService::new(&db.pool)
        .upsert("contact_email", r#""hello@acme.test""#, SettingType::String)
        .await
        .unwrap();
    // Written around the API, as a seed script might.
    sqlx::query(
        "INSERT INTO cms.site_setting (setting_key, setting_value, setting_type) \
         VALUES ('Contact Email', '\"x\"', 'string')",
    )
    .execute(&db.pool)
    .await
    .unwrap();

    let settings = SettingsRepository::new(&db.pool).list_all().await.unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].key.as_str(), "contact_email");

    let (config, _) = SiteConfig::from_settings(&settings);
    assert_eq!(config.contact.email, "hello@acme.test");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_site_config_from_stored_rows() {
    let db = TestDb::new().await;
    let service = SettingsService::new(&db.pool);

    service
        .upsert("about_title", r#""Who we are""#, SettingType::String)
        .await
        .unwrap();
    service
        .upsert("about_show_team", "false", SettingType::Json)
        .await
        .unwrap();
    service
        .upsert("about_stats", r#""not a list""#, SettingType::Json)
        .await
        .unwrap();
    service
        .upsert(
            "social_links",
            r#"{"facebook":"https://facebook.com/acme"}"#,
            SettingType::Json,
        )
        .await
        .unwrap();

    let settings = SettingsRepository::new(&db.pool).list_all().await.unwrap();
    let (config, fallbacks) = SiteConfig::from_settings(&settings);

    assert_eq!(config.about.title, "Who we are");
    assert!(!config.about.show_team);
    assert_eq!(config.about.stats, SiteConfig::default().about.stats);
    assert_eq!(config.social_links.facebook, "https://facebook.com/acme");

    assert_eq!(fallbacks.len(), 1);
    let (namespace, fallback) = &fallbacks[0];
    assert_eq!(*namespace, Namespace::About);
    assert_eq!(fallback.field, "stats");
    assert!(matches!(fallback.reason, DecodeFailure::Incompatible(_)));
}
