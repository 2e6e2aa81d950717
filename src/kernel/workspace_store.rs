//! 工作区持久化
//!
//! 每个工作区一条 `workspace:<id>` 记录，外加一个 `current-workspace-id` 指针。
//! `default` 工作区始终存在且不可删除；读到损坏记录时回退到 `default` 并记录警告。

use crate::kernel::services::ports::storage::{self, KeyValueStorage, StorageError};
use crate::models::template::Template;
use crate::models::workspace::{Workspace, DEFAULT_WORKSPACE_ID};
use crate::models::{FileTree, Node};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const CURRENT_WORKSPACE_KEY: &str = "current-workspace-id";
const WORKSPACE_KEY_PREFIX: &str = "workspace:";

pub fn workspace_key(id: &str) -> String {
    format!("{}{}", WORKSPACE_KEY_PREFIX, id)
}

/// 毫秒时间戳来源
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug)]
pub enum WorkspaceError {
    DefaultProtected,
    NotFound(String),
    Storage(StorageError),
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceError::DefaultProtected => {
                write!(f, "the default workspace cannot be deleted")
            }
            WorkspaceError::NotFound(id) => write!(f, "workspace not found: {}", id),
            WorkspaceError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WorkspaceError {}

impl From<StorageError> for WorkspaceError {
    fn from(e: StorageError) -> Self {
        WorkspaceError::Storage(e)
    }
}

pub struct WorkspaceStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Clock,
    active: Workspace,
}

impl WorkspaceStore {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_clock(storage, Arc::new(system_clock))
    }

    /// 打开存储并加载指针指向的工作区；指针缺失、损坏或指向不存在的记录时加载 `default`
    pub fn with_clock(storage: Arc<dyn KeyValueStorage>, clock: Clock) -> Self {
        let default = ensure_default(storage.as_ref(), clock());

        let pointer = match storage.get(CURRENT_WORKSPACE_KEY) {
            Ok(pointer) => pointer.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                tracing::warn!(key = CURRENT_WORKSPACE_KEY, error = %e, "failed to read current workspace pointer");
                None
            }
        };

        let active = match pointer.as_deref() {
            None | Some(DEFAULT_WORKSPACE_ID) => default,
            Some(id) => match load_workspace(storage.as_ref(), id) {
                Ok(Some(workspace)) => workspace,
                Ok(None) => {
                    tracing::warn!(workspace = %id, "current workspace record missing, using default");
                    default
                }
                Err(e) => {
                    tracing::warn!(workspace = %id, error = %e, "current workspace unreadable, using default");
                    default
                }
            },
        };

        if pointer.as_deref() != Some(active.id.as_str()) {
            if let Err(e) = storage.set(CURRENT_WORKSPACE_KEY, &active.id) {
                tracing::warn!(key = CURRENT_WORKSPACE_KEY, error = %e, "failed to write current workspace pointer");
            }
        }

        tracing::info!(workspace = %active.id, "workspace store opened");

        Self {
            storage,
            clock,
            active,
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    pub fn active(&self) -> &Workspace {
        &self.active
    }

    pub fn active_id(&self) -> &str {
        &self.active.id
    }

    pub(crate) fn now(&self) -> u64 {
        (self.clock)()
    }

    /// 覆盖当前工作区的文件与打开文件，立即写入存储
    pub fn persist_active(
        &mut self,
        files: Vec<Node>,
        current_file_path: Option<String>,
    ) -> storage::Result<()> {
        self.active.files = files;
        self.active.current_file_path = current_file_path;
        self.active.last_modified = self.now();
        self.write_active()
    }

    /// 只改内存，随下一次 `persist_active` 落盘
    pub fn set_cleared(&mut self, cleared: bool) {
        self.active.cleared = cleared;
    }

    pub fn switch_to(&mut self, id: &str) -> storage::Result<()> {
        self.write_active()?;

        let next = match load_workspace(self.storage.as_ref(), id) {
            Ok(Some(workspace)) => workspace,
            Ok(None) if id == DEFAULT_WORKSPACE_ID => {
                let workspace = Workspace::default_workspace(self.now());
                storage::save_json(self.storage.as_ref(), &workspace_key(id), &workspace)?;
                workspace
            }
            Ok(None) => {
                let workspace = Workspace::new(id, id, self.now());
                storage::save_json(self.storage.as_ref(), &workspace_key(id), &workspace)?;
                tracing::info!(workspace = %id, "created workspace on first switch");
                workspace
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::warn!(workspace = %id, error = %e, "corrupt workspace record, falling back to default");
                ensure_default(self.storage.as_ref(), self.now())
            }
            Err(e) => return Err(e),
        };

        self.storage.set(CURRENT_WORKSPACE_KEY, &next.id)?;
        tracing::info!(from = %self.active.id, to = %next.id, "switched workspace");
        self.active = next;
        Ok(())
    }

    pub fn create(&mut self, name: &str) -> storage::Result<String> {
        let workspace = Workspace::new(uuid::Uuid::new_v4().to_string(), name, self.now());
        self.activate_new(workspace)
    }

    /// 新工作区预先填充模板内容，并打开其中第一个文件
    pub fn create_from_template(
        &mut self,
        name: &str,
        template: &Template,
    ) -> storage::Result<String> {
        let tree = FileTree::from_nodes(template.expand());
        let mut workspace = Workspace::new(uuid::Uuid::new_v4().to_string(), name, self.now());
        workspace.current_file_path = tree.first_file().map(|n| n.path().to_string());
        workspace.files = tree.into_nodes();
        self.activate_new(workspace)
    }

    fn activate_new(&mut self, workspace: Workspace) -> storage::Result<String> {
        self.write_active()?;
        storage::save_json(
            self.storage.as_ref(),
            &workspace_key(&workspace.id),
            &workspace,
        )?;
        self.storage.set(CURRENT_WORKSPACE_KEY, &workspace.id)?;

        tracing::info!(workspace = %workspace.id, name = %workspace.name, "created workspace");
        let id = workspace.id.clone();
        self.active = workspace;
        Ok(id)
    }

    /// 删除当前工作区时先切回 `default`，再移除记录
    pub fn delete(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if id == DEFAULT_WORKSPACE_ID {
            tracing::warn!(workspace = %id, "refusing to delete the default workspace");
            return Err(WorkspaceError::DefaultProtected);
        }

        let key = workspace_key(id);
        if self.active.id == id {
            let default = ensure_default(self.storage.as_ref(), self.now());
            self.storage.set(CURRENT_WORKSPACE_KEY, &default.id)?;
            self.active = default;
        } else if self.storage.get(&key)?.is_none() {
            return Err(WorkspaceError::NotFound(id.to_string()));
        }

        self.storage.remove(&key)?;
        tracing::info!(workspace = %id, "deleted workspace");
        Ok(())
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), WorkspaceError> {
        if self.active.id == id {
            self.active.name = new_name.to_string();
            self.active.last_modified = self.now();
            self.write_active()?;
            return Ok(());
        }

        let key = workspace_key(id);
        let mut workspace = match load_workspace(self.storage.as_ref(), id)? {
            Some(workspace) => workspace,
            None if id == DEFAULT_WORKSPACE_ID => Workspace::default_workspace(self.now()),
            None => return Err(WorkspaceError::NotFound(id.to_string())),
        };
        workspace.name = new_name.to_string();
        workspace.last_modified = self.now();
        storage::save_json(self.storage.as_ref(), &key, &workspace)?;
        Ok(())
    }

    /// 只读地取出某个工作区的文件树，不填充初始模板也不写存储
    pub fn tree_of(&self, id: &str) -> Result<FileTree, WorkspaceError> {
        if id == self.active.id {
            return Ok(FileTree::from_nodes(self.active.files.clone()));
        }
        match load_workspace(self.storage.as_ref(), id)? {
            Some(workspace) => Ok(FileTree::from_nodes(workspace.files)),
            None if id == DEFAULT_WORKSPACE_ID => Ok(FileTree::new()),
            None => Err(WorkspaceError::NotFound(id.to_string())),
        }
    }

    /// 按 `lastModified` 降序（相同则按 id），跳过损坏记录，始终包含 `default`
    pub fn list(&self) -> storage::Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();

        for key in self.storage.keys()? {
            let Some(id) = key.strip_prefix(WORKSPACE_KEY_PREFIX) else {
                continue;
            };
            if id == self.active.id {
                continue;
            }
            match load_workspace(self.storage.as_ref(), id) {
                Ok(Some(workspace)) => workspaces.push(workspace),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping unreadable workspace record");
                }
            }
        }

        workspaces.push(self.active.clone());
        if !workspaces.iter().any(|w| w.id == DEFAULT_WORKSPACE_ID) {
            workspaces.push(Workspace::default_workspace(self.now()));
        }

        workspaces.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(workspaces)
    }

    fn write_active(&self) -> storage::Result<()> {
        storage::save_json(
            self.storage.as_ref(),
            &workspace_key(&self.active.id),
            &self.active,
        )
    }
}

/// 记录里的 `id` 与键不一致时以键为准
fn load_workspace(storage: &dyn KeyValueStorage, id: &str) -> storage::Result<Option<Workspace>> {
    let Some(mut workspace) = storage::load_json::<Workspace>(storage, &workspace_key(id))? else {
        return Ok(None);
    };
    if workspace.id != id {
        tracing::warn!(key = %workspace_key(id), stored = %workspace.id, "workspace id does not match its key");
        workspace.id = id.to_string();
    }
    Ok(Some(workspace))
}

/// 读取 `default`；不存在或损坏时新建并写回。读失败（IO）时只在内存中新建，不覆盖原记录
fn ensure_default(storage: &dyn KeyValueStorage, now: u64) -> Workspace {
    let key = workspace_key(DEFAULT_WORKSPACE_ID);
    let write_back = match load_workspace(storage, DEFAULT_WORKSPACE_ID) {
        Ok(Some(workspace)) => return workspace,
        Ok(None) => true,
        Err(e @ StorageError::Corrupt { .. }) => {
            tracing::warn!(key = %key, error = %e, "default workspace corrupt, recreating");
            true
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "default workspace unreadable");
            false
        }
    };

    let workspace = Workspace::default_workspace(now);
    if write_back {
        if let Err(e) = storage::save_json(storage, &key, &workspace) {
            tracing::warn!(key = %key, error = %e, "failed to write default workspace");
        }
    }
    workspace
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/workspace_store.rs"]
mod tests;
