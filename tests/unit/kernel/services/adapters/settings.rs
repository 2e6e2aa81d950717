use super::*;
use tempfile::tempdir;

#[test]
fn test_settings_path_is_under_app_folder() {
    let path = get_settings_path().unwrap();
    assert!(path.ends_with(".mdpad/setting.json"));
}

#[test]
fn test_write_default_settings_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".mdpad").join(SETTINGS_FILE);

    write_default_settings(&path).unwrap();
    assert!(path.exists());

    let config = load_settings_from(&path).unwrap();
    assert_eq!(config.draft_debounce_ms, AppConfig::default().draft_debounce_ms);
}

#[test]
fn test_write_default_settings_keeps_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    std::fs::write(&path, r#"{"draft_debounce_ms": 42}"#).unwrap();

    write_default_settings(&path).unwrap();
    assert_eq!(load_settings_from(&path).unwrap().draft_debounce_ms, 42);
}

#[test]
fn test_load_settings_from_invalid_json_is_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_settings_from(&path).is_none());
    assert!(load_settings_from(&dir.path().join("missing.json")).is_none());
}
