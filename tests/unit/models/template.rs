use super::*;
use crate::models::file_tree::FileTree;
use rustc_hash::FxHashSet;

fn deep_template() -> Vec<TemplateNode> {
    vec![
        TemplateNode::file("a.md", "a"),
        TemplateNode::folder(
            "x",
            vec![
                TemplateNode::file("b.md", "b"),
                TemplateNode::folder(
                    "y",
                    vec![TemplateNode::folder(
                        "z",
                        vec![TemplateNode::file("c.md", "c")],
                    )],
                ),
            ],
        ),
    ]
}

#[test]
fn test_expand_assigns_distinct_ids() {
    let tree = FileTree::from_nodes(expand(&deep_template(), "/"));
    let ids: FxHashSet<&str> = tree.iter().map(|n| n.id().as_str()).collect();
    assert_eq!(ids.len(), tree.len());
    assert_eq!(tree.len(), 6);
}

#[test]
fn test_expand_computes_paths() {
    let tree = FileTree::from_nodes(expand(&deep_template(), "/"));
    tree.validate().unwrap();

    let c = tree.find_by_path("/x/y/z/c.md").unwrap();
    assert_eq!(c.content(), Some("c"));
    assert!(tree.find_by_path("/x").unwrap().is_expanded());
}

#[test]
fn test_expand_at_base_path() {
    let nodes = expand(&deep_template(), "/projects");
    assert_eq!(nodes[0].path(), "/projects/a.md");
    assert_eq!(nodes[1].children()[0].path(), "/projects/x/b.md");
}

#[test]
fn test_expand_with_deterministic_ids() {
    let mut counter = 0;
    let mut next = || {
        counter += 1;
        NodeId::from_raw(format!("n{}", counter))
    };
    let nodes = expand_with(&deep_template(), "/", &mut next);

    assert_eq!(nodes[0].id().as_str(), "n1");
    assert_eq!(nodes[1].id().as_str(), "n2");
    assert_eq!(nodes[1].children()[0].id().as_str(), "n3");
}

#[test]
fn test_expand_twice_yields_fresh_ids() {
    let first = starter().expand();
    let second = starter().expand();
    assert_ne!(first[0].id(), second[0].id());
    assert_eq!(first[0].path(), second[0].path());
}

#[test]
fn test_starter_has_welcome_and_sample_folder() {
    let tree = FileTree::from_nodes(starter().expand());
    assert_eq!(tree.first_file().unwrap().path(), "/welcome.md");
    assert!(tree.find_by_path("/examples/sample.md").is_some());
}

#[test]
fn test_builtin_templates_are_well_formed() {
    for template in builtin_templates() {
        let tree = FileTree::from_nodes(template.expand());
        tree.validate().unwrap();
        assert!(find_template(&template.id).is_some());
    }
    assert!(find_template("nope").is_none());
}

#[test]
fn test_template_from_json() {
    let json = r#"{"id":"t","name":"T","nodes":[
        {"type":"folder","name":"src","children":[{"type":"file","name":"main.md"}]}
    ]}"#;
    let template: Template = serde_json::from_str(json).unwrap();
    let tree = FileTree::from_nodes(template.expand());
    assert_eq!(tree.find_by_path("/src/main.md").unwrap().content(), Some(""));
}

#[test]
fn test_expand_repairs_duplicate_and_invalid_names() {
    let json = r#"{"id":"t","name":"T","nodes":[
        {"type":"file","name":"a.md","content":"one"},
        {"type":"file","name":"a.md","content":"two"},
        {"type":"file","name":"d/b.md"},
        {"type":"folder","name":"d","children":[{"type":"file","name":"b.md"}]}
    ]}"#;
    let template: Template = serde_json::from_str(json).unwrap();
    let tree = FileTree::from_nodes(template.expand());

    tree.validate().unwrap();
    let paths: Vec<&str> = tree.iter().map(|n| n.path()).collect();
    assert_eq!(paths, vec!["/a.md", "/a (1).md", "/d-b.md", "/d", "/d/b.md"]);
    assert_eq!(tree.find_by_path("/a (1).md").unwrap().content(), Some("two"));
}

#[test]
fn test_expand_with_keeps_valid_names_untouched() {
    let nodes = expand(&deep_template(), "/");
    let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["a.md", "x"]);
}
