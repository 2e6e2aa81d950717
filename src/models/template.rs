//! 文件夹模板
//!
//! 模板是静态的目录结构描述，展开时为每个节点分配新的 id 并计算路径。

use super::file_tree::{normalize_nodes, Node, NodeId};
use super::vpath::ROOT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateNode {
    File {
        name: String,
        #[serde(default)]
        content: String,
    },
    Folder {
        name: String,
        #[serde(default)]
        children: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        TemplateNode::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<TemplateNode>) -> Self {
        TemplateNode::Folder {
            name: name.into(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<TemplateNode>,
}

impl Template {
    pub fn expand(&self) -> Vec<Node> {
        expand(&self.nodes, ROOT)
    }
}

pub fn expand(nodes: &[TemplateNode], base: &str) -> Vec<Node> {
    expand_with(nodes, base, &mut NodeId::new)
}

/// `next_id` 决定 id 来源；传入确定性的生成器即可得到可复现的结果。
/// 非法或重复的名称会被改成可用的名称
pub fn expand_with(
    nodes: &[TemplateNode],
    base: &str,
    next_id: &mut impl FnMut() -> NodeId,
) -> Vec<Node> {
    let mut expanded = build(nodes, base, next_id);
    let repaired = normalize_nodes(&mut expanded, base);
    if repaired > 0 {
        tracing::warn!(repaired, "template names adjusted during expansion");
    }
    expanded
}

fn build(nodes: &[TemplateNode], base: &str, next_id: &mut impl FnMut() -> NodeId) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            TemplateNode::File { name, content } => {
                Node::file(next_id(), name.as_str(), base, content.as_str())
            }
            TemplateNode::Folder { name, children } => {
                let id = next_id();
                let path = super::vpath::join(base, name);
                let children = build(children, &path, next_id);
                Node::folder(id, name.as_str(), base, children).with_expanded(true)
            }
        })
        .collect()
}

pub const STARTER_ID: &str = "starter";

/// 新工作区的初始内容：一个欢迎文件 + 一个带示例的文件夹
pub fn starter() -> Template {
    Template {
        id: STARTER_ID.to_string(),
        name: "Starter".to_string(),
        description: "Welcome file and a sample folder".to_string(),
        nodes: vec![
            TemplateNode::file(
                "welcome.md",
                "# Welcome\n\nWrite markdown on the left, preview it on the right.\n",
            ),
            TemplateNode::folder(
                "examples",
                vec![TemplateNode::file(
                    "sample.md",
                    "# Sample\n\n- item one\n- item two\n",
                )],
            ),
        ],
    }
}

pub fn presentation() -> Template {
    Template {
        id: "presentation".to_string(),
        name: "Presentation".to_string(),
        description: "Slide deck with speaker notes".to_string(),
        nodes: vec![
            TemplateNode::file("slides.md", "---\nmarp: true\n---\n\n# Title\n\n---\n\n# Agenda\n"),
            TemplateNode::file("notes.md", "# Speaker notes\n"),
            TemplateNode::folder("assets", Vec::new()),
        ],
    }
}

pub fn documentation() -> Template {
    Template {
        id: "documentation".to_string(),
        name: "Documentation".to_string(),
        description: "README with a docs folder".to_string(),
        nodes: vec![
            TemplateNode::file("README.md", "# Project\n"),
            TemplateNode::folder(
                "docs",
                vec![
                    TemplateNode::file("getting-started.md", "# Getting started\n"),
                    TemplateNode::file("api.md", "# API\n"),
                    TemplateNode::folder(
                        "diagrams",
                        vec![TemplateNode::file(
                            "architecture.md",
                            "```mermaid\ngraph TD\n  A --> B\n```\n",
                        )],
                    ),
                ],
            ),
        ],
    }
}

pub fn builtin_templates() -> Vec<Template> {
    vec![starter(), presentation(), documentation()]
}

pub fn find_template(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
#[path = "../../tests/unit/models/template.rs"]
mod tests;
