//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod convert;
pub mod paths;
pub mod settings;
pub mod storage;

pub use convert::ProcessConverter;
pub use paths::{ensure_log_dir, ensure_storage_dir, get_log_dir, get_storage_dir};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
pub use storage::{DirStorage, MemoryStorage};
