//! 键值存储后端

pub mod dir;
pub mod memory;

pub use dir::DirStorage;
pub use memory::MemoryStorage;
