//! 数据模型层

pub mod file_tree;
pub mod template;
pub mod vpath;
pub mod workspace;

pub use file_tree::{FileTree, FileTreeError, FileTreeRow, Node, NodeId, NodeKind};
pub use template::{Template, TemplateNode};
pub use workspace::{Workspace, DEFAULT_WORKSPACE_ID};
