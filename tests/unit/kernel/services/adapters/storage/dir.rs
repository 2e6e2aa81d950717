use super::*;
use tempfile::tempdir;

#[test]
fn test_encode_decode_key() {
    assert_eq!(encode_key("workspace:abc-1"), "workspace%3Aabc-1");
    assert_eq!(decode_key("workspace%3Aabc-1").as_deref(), Some("workspace:abc-1"));
    assert_eq!(encode_key("theme"), "theme");
    assert_eq!(decode_key("bad%4"), None);
}

#[test]
fn test_read_write_remove() {
    let dir = tempdir().unwrap();
    let storage = DirStorage::open(dir.path()).unwrap();

    assert_eq!(storage.get("workspace:1").unwrap(), None);
    storage.set("workspace:1", "{\"id\":\"1\"}").unwrap();
    assert_eq!(
        storage.get("workspace:1").unwrap().as_deref(),
        Some("{\"id\":\"1\"}")
    );
    assert!(dir.path().join("workspace%3A1.json").exists());

    storage.remove("workspace:1").unwrap();
    assert_eq!(storage.get("workspace:1").unwrap(), None);
    storage.remove("workspace:1").unwrap();
}

#[test]
fn test_keys_roundtrip_and_ignore_foreign_files() {
    let dir = tempdir().unwrap();
    let storage = DirStorage::open(dir.path()).unwrap();

    storage.set("current-workspace-id", "\"default\"").unwrap();
    storage.set("workspace:default", "{}").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

    assert_eq!(
        storage.keys().unwrap(),
        vec![
            "current-workspace-id".to_string(),
            "workspace:default".to_string()
        ]
    );
}

#[test]
fn test_overwrite_replaces_content() {
    let dir = tempdir().unwrap();
    let storage = DirStorage::open(dir.path()).unwrap();
    storage.set("k", "one").unwrap();
    storage.set("k", "two").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn test_open_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let storage = DirStorage::open(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(storage.root(), nested.as_path());
}

#[test]
fn test_open_rejects_file_path() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    std::fs::write(&file, "x").unwrap();
    assert!(matches!(
        DirStorage::open(&file),
        Err(StorageError::Unavailable(_))
    ));
}

#[test]
fn test_concurrent_set_same_key() {
    let dir = tempdir().unwrap();
    let storage = std::sync::Arc::new(DirStorage::open(dir.path()).unwrap());
    let values = ["{\"content\":\"left\"}", "{\"content\":\"right\"}"];

    let handles: Vec<_> = values
        .iter()
        .map(|value| {
            let storage = storage.clone();
            let value = value.to_string();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    storage.set("markdown-draft", &value).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = storage.get("markdown-draft").unwrap().unwrap();
    assert!(values.contains(&stored.as_str()));
    // 没有遗留的临时文件
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    assert_eq!(storage.keys().unwrap(), vec!["markdown-draft".to_string()]);
}
