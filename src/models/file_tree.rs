//! 文件树数据模型
//!
//! 工作区内的虚拟文件树：按插入顺序保存的节点森林，以绝对路径寻址。
//! 节点路径始终等于父路径 + `/` + 名称，同一棵树中路径唯一。

use super::vpath::{self, NameError, ROOT};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeError {
    ParentNotFound(String),
    NameCollision(String),
    MoveIntoDescendant,
    InvalidName(NameError),
    InconsistentPath(String),
    DuplicatePath(String),
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::ParentNotFound(p) => write!(f, "parent folder not found: {}", p),
            FileTreeError::NameCollision(p) => write!(f, "name already exists: {}", p),
            FileTreeError::MoveIntoDescendant => {
                write!(f, "cannot move node into its own subtree")
            }
            FileTreeError::InvalidName(e) => match e {
                NameError::Empty => write!(f, "name must not be empty"),
                NameError::Reserved => write!(f, "name is reserved"),
                NameError::ContainsSeparator => write!(f, "name must not contain '/'"),
            },
            FileTreeError::InconsistentPath(p) => {
                write!(f, "node path does not match its position: {}", p)
            }
            FileTreeError::DuplicatePath(p) => write!(f, "duplicate path in tree: {}", p),
        }
    }
}

impl std::error::Error for FileTreeError {}

impl From<NameError> for FileTreeError {
    fn from(e: NameError) -> Self {
        FileTreeError::InvalidName(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File {
        #[serde(default)]
        content: String,
    },
    Folder {
        #[serde(default)]
        children: Vec<Node>,
        #[serde(default)]
        expanded: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: String,
    path: String,
    #[serde(flatten)]
    kind: NodeKind,
}

impl Node {
    pub fn file(
        id: NodeId,
        name: impl Into<String>,
        parent: &str,
        content: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id,
            path: vpath::join(parent, &name),
            name,
            kind: NodeKind::File {
                content: content.into(),
            },
        }
    }

    /// 子节点会被重新挂到新文件夹路径下
    pub fn folder(id: NodeId, name: impl Into<String>, parent: &str, children: Vec<Node>) -> Self {
        let name = name.into();
        let mut node = Self {
            id,
            path: vpath::join(parent, &name),
            name,
            kind: NodeKind::Folder {
                children,
                expanded: false,
            },
        };
        node.rebase(parent);
        node
    }

    pub fn with_expanded(mut self, value: bool) -> Self {
        if let NodeKind::Folder { expanded, .. } = &mut self.kind {
            *expanded = value;
        }
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { expanded: true, .. })
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Folder { children, .. } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    fn rebase(&mut self, parent: &str) {
        self.path = vpath::join(parent, &self.name);
        if let NodeKind::Folder { children, .. } = &mut self.kind {
            for child in children.iter_mut() {
                child.rebase(&self.path);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<Node>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 外部来源（存储记录、模板）的节点：修正非法名称、重名兄弟节点与路径
    pub fn from_nodes(mut nodes: Vec<Node>) -> Self {
        let repaired = normalize_nodes(&mut nodes, ROOT);
        if repaired > 0 {
            tracing::warn!(repaired, "file tree repaired: invalid names, duplicate siblings or stale paths");
        }
        Self { roots: nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.roots
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.iter().find(|node| node.path == path)
    }

    fn find_by_path_mut(&mut self, path: &str) -> Option<&mut Node> {
        find_in_mut(&mut self.roots, path)
    }

    pub fn first_file(&self) -> Option<&Node> {
        self.iter().find(|node| node.is_file())
    }

    /// 名称包含 `query`（不区分大小写）的节点，深度优先顺序
    pub fn search(&self, query: &str) -> Vec<&Node> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|node| node.name.to_lowercase().contains(&needle))
            .collect()
    }

    fn children_of(&self, parent: &str) -> Option<&Vec<Node>> {
        if parent == ROOT {
            return Some(&self.roots);
        }
        match &self.find_by_path(parent)?.kind {
            NodeKind::Folder { children, .. } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    fn children_of_mut(&mut self, parent: &str) -> Option<&mut Vec<Node>> {
        if parent == ROOT {
            return Some(&mut self.roots);
        }
        self.find_by_path_mut(parent)?.children_mut()
    }

    pub fn insert(&mut self, parent: &str, mut node: Node) -> Result<(), FileTreeError> {
        vpath::validate_name(&node.name)?;

        let siblings = self
            .children_of_mut(parent)
            .ok_or_else(|| FileTreeError::ParentNotFound(parent.to_string()))?;
        if siblings.iter().any(|s| s.name == node.name) {
            return Err(FileTreeError::NameCollision(vpath::join(parent, &node.name)));
        }

        node.rebase(parent);
        siblings.push(node);
        Ok(())
    }

    /// 路径不存在时不做任何修改
    pub fn remove(&mut self, path: &str) -> Option<Node> {
        remove_in(&mut self.roots, path)
    }

    /// 返回 `Ok(false)` 表示路径不存在或名称未变化
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<bool, FileTreeError> {
        vpath::validate_name(new_name)?;

        let Some(parent) = vpath::parent_of(path) else {
            return Ok(false);
        };
        let Some(siblings) = self.children_of_mut(parent) else {
            return Ok(false);
        };
        let Some(idx) = siblings.iter().position(|n| n.path == path) else {
            return Ok(false);
        };

        if siblings[idx].name == new_name {
            return Ok(false);
        }
        if siblings.iter().any(|n| n.name == new_name) {
            return Err(FileTreeError::NameCollision(vpath::join(parent, new_name)));
        }

        let node = &mut siblings[idx];
        node.name = new_name.to_string();
        node.rebase(parent);
        Ok(true)
    }

    pub fn move_to(&mut self, path: &str, new_parent: &str) -> Result<bool, FileTreeError> {
        if self.find_by_path(path).is_none() {
            return Ok(false);
        }
        if vpath::is_same_or_ancestor(path, new_parent) {
            return Err(FileTreeError::MoveIntoDescendant);
        }
        if vpath::parent_of(path) == Some(new_parent) {
            return Ok(false);
        }

        let name = vpath::file_name(path);
        let target = self
            .children_of(new_parent)
            .ok_or_else(|| FileTreeError::ParentNotFound(new_parent.to_string()))?;
        if target.iter().any(|n| n.name == name) {
            return Err(FileTreeError::NameCollision(vpath::join(new_parent, name)));
        }

        match self.remove(path) {
            Some(node) => {
                self.insert(new_parent, node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 文件或不存在的路径返回 `false`
    pub fn toggle_folder(&mut self, path: &str) -> bool {
        match self.find_by_path_mut(path).map(|n| &mut n.kind) {
            Some(NodeKind::Folder { expanded, .. }) => {
                *expanded = !*expanded;
                true
            }
            _ => false,
        }
    }

    pub fn set_content(&mut self, path: &str, text: &str) -> bool {
        match self.find_by_path_mut(path).map(|n| &mut n.kind) {
            Some(NodeKind::File { content }) => {
                content.clear();
                content.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// 校验路径不变式与路径唯一性
    pub fn validate(&self) -> Result<(), FileTreeError> {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<(&str, &Node)> = self.roots.iter().map(|n| (ROOT, n)).collect();

        while let Some((parent, node)) = stack.pop() {
            vpath::validate_name(&node.name)?;
            if node.path != vpath::join(parent, &node.name) {
                return Err(FileTreeError::InconsistentPath(node.path.clone()));
            }
            if !seen.insert(node.path.as_str()) {
                return Err(FileTreeError::DuplicatePath(node.path.clone()));
            }
            for child in node.children() {
                stack.push((node.path.as_str(), child));
            }
        }

        Ok(())
    }
}

/// 逐层修正：名称合法、兄弟间不重名、路径等于父路径 + 名称。返回被修改的次数
pub(crate) fn normalize_nodes(nodes: &mut [Node], parent: &str) -> usize {
    let mut repaired = 0;
    let mut taken: FxHashSet<String> = FxHashSet::default();

    for node in nodes.iter_mut() {
        let mut name = vpath::sanitize_name(&node.name);
        if taken.contains(&name) {
            name = vpath::disambiguate(&name, |candidate| taken.contains(candidate));
        }
        if name != node.name {
            tracing::debug!(from = %node.name, to = %name, "node renamed during repair");
            node.name = name.clone();
            repaired += 1;
        }
        taken.insert(name);

        let expected = vpath::join(parent, &node.name);
        if node.path != expected {
            node.path = expected;
            repaired += 1;
        }
        if let NodeKind::Folder { children, .. } = &mut node.kind {
            repaired += normalize_nodes(children, &node.path);
        }
    }

    repaired
}

fn find_in_mut<'a>(nodes: &'a mut [Node], path: &str) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if node.path == path {
            return Some(node);
        }
        if let NodeKind::Folder { children, .. } = &mut node.kind {
            if let Some(found) = find_in_mut(children, path) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_in(nodes: &mut Vec<Node>, path: &str) -> Option<Node> {
    if let Some(idx) = nodes.iter().position(|n| n.path == path) {
        return Some(nodes.remove(idx));
    }
    for node in nodes.iter_mut() {
        if let NodeKind::Folder { children, .. } = &mut node.kind {
            if let Some(removed) = remove_in(children, path) {
                return Some(removed);
            }
        }
    }
    None
}

/// 先序深度优先遍历
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[derive(Debug, Clone)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: String,
    pub path: String,
    pub is_folder: bool,
    pub is_expanded: bool,
}

impl FileTree {
    /// 可见行：只展开 `expanded` 的文件夹，保持插入顺序
    pub fn flatten_for_view(&self) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(&Node, u16)> = self.roots.iter().rev().map(|n| (n, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            result.push(FileTreeRow {
                id: node.id.clone(),
                depth,
                name: node.name.clone(),
                path: node.path.clone(),
                is_folder: node.is_folder(),
                is_expanded: node.is_expanded(),
            });

            if node.is_expanded() {
                for child in node.children().iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
