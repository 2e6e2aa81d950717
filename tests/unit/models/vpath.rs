use super::*;

#[test]
fn test_join_root_and_nested() {
    assert_eq!(join("/", "notes.md"), "/notes.md");
    assert_eq!(join("/docs", "api.md"), "/docs/api.md");
    assert_eq!(join("/docs/", "api.md"), "/docs/api.md");
}

#[test]
fn test_parent_of() {
    assert_eq!(parent_of("/"), None);
    assert_eq!(parent_of("/notes.md"), Some("/"));
    assert_eq!(parent_of("/docs/api.md"), Some("/docs"));
    assert_eq!(parent_of("/a/b/c"), Some("/a/b"));
}

#[test]
fn test_file_name() {
    assert_eq!(file_name("/docs/api.md"), "api.md");
    assert_eq!(file_name("/docs"), "docs");
    assert_eq!(file_name("/"), "");
}

#[test]
fn test_is_ancestor_is_segment_aligned() {
    assert!(is_ancestor("/docs", "/docs/api.md"));
    assert!(is_ancestor("/", "/docs"));
    assert!(!is_ancestor("/doc", "/docs/api.md"));
    assert!(!is_ancestor("/docs", "/docs"));
    assert!(is_same_or_ancestor("/docs", "/docs"));
}

#[test]
fn test_rebase() {
    assert_eq!(
        rebase("/docs/api.md", "/docs", "/archive").as_deref(),
        Some("/archive/api.md")
    );
    assert_eq!(rebase("/docs", "/docs", "/archive").as_deref(), Some("/archive"));
    assert_eq!(
        rebase("/a.md", "/", "/folder").as_deref(),
        Some("/folder/a.md")
    );
    assert_eq!(rebase("/other/x.md", "/docs", "/archive"), None);
}

#[test]
fn test_validate_name() {
    assert!(validate_name("notes.md").is_ok());
    assert_eq!(validate_name(""), Err(NameError::Empty));
    assert_eq!(validate_name("  "), Err(NameError::Empty));
    assert_eq!(validate_name(".."), Err(NameError::Reserved));
    assert_eq!(validate_name("a/b"), Err(NameError::ContainsSeparator));
}

#[test]
fn test_segments() {
    let parts: Vec<&str> = segments("/docs/api/v1.md").collect();
    assert_eq!(parts, vec!["docs", "api", "v1.md"]);
    assert_eq!(segments("/").count(), 0);
}

#[test]
fn test_sanitize_name() {
    assert_eq!(sanitize_name("notes.md"), "notes.md");
    assert_eq!(sanitize_name("d/b.md"), "d-b.md");
    assert_eq!(sanitize_name(""), "untitled");
    assert_eq!(sanitize_name(".."), "untitled");
    assert!(validate_name(&sanitize_name("/")).is_ok());
}

#[test]
fn test_disambiguate() {
    let taken = ["a.md", "a (1).md", "docs"];
    let is_taken = |name: &str| taken.contains(&name);

    assert_eq!(disambiguate("a.md", is_taken), "a (2).md");
    assert_eq!(disambiguate("docs", is_taken), "docs (1)");
    assert_eq!(disambiguate(".env", |_| false), ".env (1)");
}
