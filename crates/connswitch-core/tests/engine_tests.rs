use connswitch_core::prelude::*;
use connswitch_core::{create_backup, environment, mask_sensitive, ConfigFormat};
use connswitch_test_utils::{FixtureDir, APPSETTINGS_BLOCKS, APPSETTINGS_TREE, WEB_CONFIG};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_comment_mode_activates_dev_block() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_BLOCKS);
    let engine = ConnectionStringEngine::default();

    let request = SwitchRequest::new(&path, EnvironmentType::Development).with_mode(SwitchMode::Comment);
    let outcome = engine.switch(&request).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.mode, SwitchMode::Comment);
    let report = outcome.comment_report.unwrap();
    assert_eq!(report.blocks.len(), 3);
    assert_eq!(report.uncommented, 2);
    assert_eq!(report.commented, 2);

    let text = dir.read("appsettings.json");
    assert!(text.contains("\n    \"DevConnection\": \"Server=dev-sql;"));
    assert!(text.contains("\n    //\"ProdConnection\": \"Server=prod-sql;"));
    assert!(text.contains("\n    //\"QAConnection\": \"Server=qa-sql;"));
    // Non-connection lines keep their bytes
    assert!(text.starts_with("{\n  \"Logging\": {\n    \"LogLevel\": {\n      \"Default\": \"Information\""));
}

#[tokio::test]
async fn test_comment_mode_twice_is_stable() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_BLOCKS);
    let engine = ConnectionStringEngine::default();
    let request = SwitchRequest::new(&path, EnvironmentType::QA).with_mode(SwitchMode::Comment);

    assert!(engine.switch(&request).await.unwrap().changed);
    let first = dir.read("appsettings.json");
    assert!(!engine.switch(&request).await.unwrap().changed);
    assert_eq!(dir.read("appsettings.json"), first);
}

#[tokio::test]
async fn test_comment_mode_on_active_block_is_noop() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_BLOCKS);
    let request = SwitchRequest::new(&path, EnvironmentType::Production).with_mode(SwitchMode::Comment);

    let outcome = ConnectionStringEngine::default().switch(&request).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(dir.read("appsettings.json"), APPSETTINGS_BLOCKS);
}

#[tokio::test]
async fn test_default_mode_copies_value() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_TREE);

    let request = SwitchRequest::new(&path, EnvironmentType::Production);
    ConnectionStringEngine::default().switch(&request).await.unwrap();

    let before: serde_json::Value = serde_json::from_str(APPSETTINGS_TREE).unwrap();
    let after: serde_json::Value = serde_json::from_str(&dir.read("appsettings.json")).unwrap();
    assert_eq!(
        after["ConnectionStrings"]["DefaultConnection"],
        before["ConnectionStrings"]["ProductionConnection"]
    );
    assert_eq!(after["Logging"], before["Logging"]);
    assert_eq!(after["AllowedHosts"], before["AllowedHosts"]);
    assert_eq!(
        after["ConnectionStrings"]["QAConnection"],
        before["ConnectionStrings"]["QAConnection"]
    );
}

#[tokio::test]
async fn test_xml_production_inserts_default_connection() {
    let dir = FixtureDir::new();
    let path = dir.write("web.config", WEB_CONFIG);

    let outcome = ConnectionStringEngine::default()
        .switch(&SwitchRequest::new(&path, EnvironmentType::Production))
        .await
        .unwrap();
    assert_eq!(outcome.format, ConfigFormat::Xml);
    assert!(outcome.changed);

    let expected = WEB_CONFIG.replace(
        "  </connectionStrings>",
        "    <add name=\"DefaultConnection\" connectionString=\"Server=prod-sql;Database=App;Uid=prod;Pwd=prod-secret;\" providerName=\"Microsoft.Data.SqlClient\"/>\n  </connectionStrings>",
    );
    assert_eq!(dir.read("web.config"), expected);
}

#[tokio::test]
async fn test_xml_comment_mode_falls_back_to_structural() {
    let dir = FixtureDir::new();
    let path = dir.write("App.Config", WEB_CONFIG);

    let request = SwitchRequest::new(&path, EnvironmentType::Development).with_mode(SwitchMode::Comment);
    let outcome = ConnectionStringEngine::default().switch(&request).await.unwrap();
    assert_eq!(outcome.mode, SwitchMode::Default);
    assert!(outcome.comment_report.is_none());
    assert!(dir.read("App.Config").contains("<add name=\"DefaultConnection\" connectionString=\"Server=dev-sql;"));
}

#[tokio::test]
async fn test_yaml_is_rejected_without_side_effects() {
    let dir = FixtureDir::new();
    let path = dir.write("settings.yaml", "ConnectionStrings: {}\n");

    let err = ConnectionStringEngine::default()
        .switch(&SwitchRequest::new(&path, EnvironmentType::QA))
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchError::UnsupportedFormat { .. }));
    assert_eq!(dir.read("settings.yaml"), "ConnectionStrings: {}\n");
    assert_eq!(dir.file_names(), vec!["settings.yaml".to_string()]);
}

#[test]
fn test_note_mentioning_connection_is_not_a_header() {
    assert_eq!(environment::header_label("// DevConnection test"), None);
    assert_eq!(environment::header_label("// Dev"), Some("Development"));
}

#[tokio::test]
async fn test_list_and_mask() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_BLOCKS);
    let engine = ConnectionStringEngine::default();

    let entries = engine.list(&path).await.unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0].name, "SysSetupConnection (commented)");
    assert_eq!(entries[0].environment, Some(EnvironmentType::Development));
    assert!(entries[5].name == "ProdConnection" && !entries[5].is_commented);

    let masked = mask_sensitive(&entries[5].raw_value, &engine.config().sensitive_keys);
    assert_eq!(masked, "Server=prod-sql;Database=App;Uid=****;Pwd=****");
}

#[tokio::test]
async fn test_list_xml() {
    let dir = FixtureDir::new();
    let path = dir.write("web.config", WEB_CONFIG);
    let entries = ConnectionStringEngine::default().list(&path).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["DevelopmentConnection", "ProductionConnection"]);
    assert_eq!(entries[1].provider_name.as_deref(), Some("Microsoft.Data.SqlClient"));
}

#[tokio::test]
async fn test_backup_matches_original() {
    let dir = FixtureDir::new();
    let path = dir.write("appsettings.json", APPSETTINGS_TREE);

    let backup = create_backup(&path).await.unwrap();
    ConnectionStringEngine::default()
        .switch(&SwitchRequest::new(&path, EnvironmentType::QA))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(backup).unwrap(), APPSETTINGS_TREE);
    assert_ne!(dir.read("appsettings.json"), APPSETTINGS_TREE);
}
