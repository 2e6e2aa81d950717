//! mdpad - markdown 编辑器的虚拟文件系统与多工作区持久化
//!
//! 模块结构：
//! - models: 数据模型（FileTree, Template, Workspace, 虚拟路径）
//! - kernel: 有状态服务（WorkspaceStore, FileSystemController, 草稿自动保存, 主题偏好）
//! - kernel::services: 存储、配置、文档转换的契约与实现

pub mod kernel;
pub mod models;
