//! 工作区记录：一棵文件树 + 当前打开的文件

use super::file_tree::Node;
use serde::{Deserialize, Serialize};

/// 永远存在且不可删除的工作区
pub const DEFAULT_WORKSPACE_ID: &str = "default";
pub const DEFAULT_WORKSPACE_NAME: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file_path: Option<String>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub last_modified: u64,
    /// 用户主动清空过；为空时不再填充初始模板
    #[serde(default)]
    pub cleared: bool,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            files: Vec::new(),
            current_file_path: None,
            created_at: now,
            last_modified: now,
            cleared: false,
        }
    }

    pub fn default_workspace(now: u64) -> Self {
        Self::new(DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME, now)
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_WORKSPACE_ID
    }
}
