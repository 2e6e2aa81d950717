//! 编辑会话中的文件系统
//!
//! 持有当前工作区的内存文件树与打开的文件。每次修改后把
//! `{files, currentFilePath}` 写回 `WorkspaceStore`；写失败只影响保存状态，不回滚内存。

use super::draft::SaveStatus;
use super::workspace_store::{WorkspaceError, WorkspaceStore};
use crate::kernel::services::ports::storage::{self, StorageError};
use crate::models::template::{self, Template};
use crate::models::vpath;
use crate::models::{FileTree, FileTreeError, Node, NodeId, Workspace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub id: NodeId,
    pub path: String,
    pub name: String,
    pub content: String,
}

impl OpenFile {
    fn from_node(node: &Node) -> Option<Self> {
        Some(Self {
            id: node.id().clone(),
            path: node.path().to_string(),
            name: node.name().to_string(),
            content: node.content()?.to_string(),
        })
    }
}

pub struct FileSystemController {
    store: WorkspaceStore,
    tree: FileTree,
    current_file: Option<OpenFile>,
    save_status: SaveStatus,
}

impl FileSystemController {
    pub fn new(store: WorkspaceStore) -> Self {
        let mut controller = Self {
            store,
            tree: FileTree::new(),
            current_file: None,
            save_status: SaveStatus::Idle,
        };
        controller.load_active();
        controller
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn current_file(&self) -> Option<&OpenFile> {
        self.current_file.as_ref()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn workspace(&self) -> &Workspace {
        self.store.active()
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    /// 空且未被清空过的工作区填充初始模板
    fn load_active(&mut self) {
        let workspace = self.store.active();

        if workspace.files.is_empty() && !workspace.cleared {
            tracing::debug!(workspace = %workspace.id, "seeding starter tree");
            self.tree = FileTree::from_nodes(template::starter().expand());
            self.current_file = self.tree.first_file().and_then(OpenFile::from_node);
            self.persist();
            return;
        }

        self.tree = FileTree::from_nodes(workspace.files.clone());
        self.current_file = workspace
            .current_file_path
            .as_deref()
            .and_then(|path| self.tree.find_by_path(path))
            .and_then(OpenFile::from_node);
        self.save_status = SaveStatus::Idle;
    }

    fn current_path(&self) -> Option<String> {
        self.current_file.as_ref().map(|f| f.path.clone())
    }

    fn flush(&mut self) -> storage::Result<()> {
        let result = self
            .store
            .persist_active(self.tree.nodes().to_vec(), self.current_path());
        self.record_save(&result);
        result
    }

    fn persist(&mut self) {
        let _ = self.flush();
    }

    fn record_save<T>(&mut self, result: &storage::Result<T>) {
        match result {
            Ok(_) => self.save_status = SaveStatus::Saved,
            Err(e) => {
                tracing::warn!(workspace = %self.store.active_id(), error = %e, "failed to persist workspace");
                self.save_status = SaveStatus::Error;
            }
        }
    }

    /// 只有文件可以被打开；文件夹或不存在的路径返回 `false`
    pub fn select_file(&mut self, path: &str) -> bool {
        let Some(open) = self.tree.find_by_path(path).and_then(OpenFile::from_node) else {
            return false;
        };
        self.current_file = Some(open);
        self.persist();
        true
    }

    pub fn update_content(&mut self, path: &str, text: &str) -> bool {
        if !self.tree.set_content(path, text) {
            return false;
        }
        if let Some(open) = self.current_file.as_mut().filter(|f| f.path == path) {
            open.content = text.to_string();
        }
        self.persist();
        true
    }

    /// 新文件立即成为打开的文件
    pub fn create_file(&mut self, parent: &str, name: &str) -> Result<NodeId, FileTreeError> {
        let id = NodeId::new();
        self.tree
            .insert(parent, Node::file(id.clone(), name, parent, ""))?;
        self.current_file = self
            .tree
            .find_by_path(&vpath::join(parent, name))
            .and_then(OpenFile::from_node);
        self.persist();
        Ok(id)
    }

    pub fn create_folder(&mut self, parent: &str, name: &str) -> Result<NodeId, FileTreeError> {
        let id = NodeId::new();
        self.tree
            .insert(parent, Node::folder(id.clone(), name, parent, Vec::new()))?;
        self.persist();
        Ok(id)
    }

    /// 删除文件夹时其中打开的文件一并关闭
    pub fn delete_node(&mut self, path: &str) -> bool {
        if self.tree.remove(path).is_none() {
            return false;
        }

        if self
            .current_file
            .as_ref()
            .is_some_and(|f| vpath::is_same_or_ancestor(path, &f.path))
        {
            self.current_file = None;
        }
        if self.tree.is_empty() {
            self.store.set_cleared(true);
        }

        tracing::debug!(path = %path, "node deleted");
        self.persist();
        true
    }

    pub fn rename_node(&mut self, path: &str, new_name: &str) -> Result<bool, FileTreeError> {
        if !self.tree.rename(path, new_name)? {
            return Ok(false);
        }
        let parent = vpath::parent_of(path).unwrap_or(vpath::ROOT);
        self.follow_open_file(path, &vpath::join(parent, new_name));
        self.persist();
        Ok(true)
    }

    pub fn move_node(&mut self, path: &str, new_parent: &str) -> Result<bool, FileTreeError> {
        if !self.tree.move_to(path, new_parent)? {
            return Ok(false);
        }
        self.follow_open_file(path, &vpath::join(new_parent, vpath::file_name(path)));
        self.persist();
        Ok(true)
    }

    /// 打开的文件在被移动的子树内时，同步其路径与名称
    fn follow_open_file(&mut self, from: &str, to: &str) {
        let Some(open) = self.current_file.as_mut() else {
            return;
        };
        if let Some(path) = vpath::rebase(&open.path, from, to) {
            open.name = vpath::file_name(&path).to_string();
            open.path = path;
        }
    }

    pub fn toggle_folder(&mut self, path: &str) -> bool {
        if !self.tree.toggle_folder(path) {
            return false;
        }
        self.persist();
        true
    }

    /// 用给定节点替换整棵树，打开深度优先的第一个文件
    pub fn initialize_from_template(&mut self, nodes: Vec<Node>) {
        self.tree = FileTree::from_nodes(nodes);
        self.current_file = self.tree.first_file().and_then(OpenFile::from_node);
        self.store.set_cleared(self.tree.is_empty());
        self.persist();
    }

    pub fn apply_template(&mut self, template: &Template) {
        tracing::info!(template = %template.id, "applying template");
        self.initialize_from_template(template.expand());
    }

    pub fn clear_all(&mut self) {
        self.tree.clear();
        self.current_file = None;
        self.store.set_cleared(true);
        self.persist();
    }

    pub fn switch_workspace(&mut self, id: &str) -> storage::Result<()> {
        self.flush()?;
        let result = self.store.switch_to(id);
        self.record_save(&result);
        result?;
        self.load_active();
        Ok(())
    }

    pub fn create_workspace(&mut self, name: &str) -> storage::Result<String> {
        self.flush()?;
        let result = self.store.create(name);
        self.record_save(&result);
        let id = result?;
        self.load_active();
        Ok(id)
    }

    pub fn create_workspace_from_template(
        &mut self,
        name: &str,
        template: &Template,
    ) -> storage::Result<String> {
        self.flush()?;
        let result = self.store.create_from_template(name, template);
        self.record_save(&result);
        let id = result?;
        self.load_active();
        Ok(id)
    }

    pub fn rename_workspace(&mut self, id: &str, name: &str) -> Result<(), WorkspaceError> {
        let result = self.store.rename(id, name);
        self.record_workspace_save(&result);
        result
    }

    pub fn delete_workspace(&mut self, id: &str) -> Result<(), WorkspaceError> {
        let was_active = self.store.active_id() == id;
        let result = self.store.delete(id);
        self.record_workspace_save(&result);
        result?;
        if was_active {
            self.load_active();
        }
        Ok(())
    }

    /// 被拒绝的操作（`DefaultProtected` / `NotFound`）不影响保存状态
    fn record_workspace_save(&mut self, result: &Result<(), WorkspaceError>) {
        match result {
            Ok(()) => self.record_save(&Ok::<(), StorageError>(())),
            Err(WorkspaceError::Storage(e)) => {
                tracing::warn!(workspace = %self.store.active_id(), error = %e, "failed to update workspace record");
                self.save_status = SaveStatus::Error;
            }
            Err(_) => {}
        }
    }

    pub fn list_workspaces(&self) -> storage::Result<Vec<Workspace>> {
        self.store.list()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/file_system.rs"]
mod tests;
