//! Headless core: workspace persistence, the editing session and draft autosave.

pub mod draft;
pub mod file_system;
pub mod preferences;
pub mod services;
pub mod workspace_store;

pub use draft::{Draft, DraftAutosave, DraftStore, SaveStatus};
pub use file_system::{FileSystemController, OpenFile};
pub use preferences::Preferences;
pub use workspace_store::{WorkspaceError, WorkspaceStore};
