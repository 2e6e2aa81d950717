use super::*;

#[test]
fn test_get_storage_dir() {
    let dir = get_storage_dir();
    // 测试环境中应该能获取到目录
    assert!(dir.is_some());
    let dir = dir.unwrap();
    assert!(dir.to_string_lossy().contains(APP_NAME));
    assert!(dir.to_string_lossy().contains(STORAGE_DIR));
}

#[test]
fn test_get_log_dir() {
    let dir = get_log_dir();
    assert!(dir.is_some());
    let dir = dir.unwrap();
    assert!(dir.to_string_lossy().contains(APP_NAME));
    assert!(dir.to_string_lossy().contains(LOG_DIR));
}

#[test]
fn test_storage_and_log_dirs_share_app_dir() {
    let storage = get_storage_dir().unwrap();
    let logs = get_log_dir().unwrap();
    assert_eq!(storage.parent(), logs.parent());
}
