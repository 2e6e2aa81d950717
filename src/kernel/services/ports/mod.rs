//! Service ports: traits + data contracts.

pub mod config;
pub mod convert;
pub mod settings;
pub mod storage;

pub use config::{AppConfig, ConverterConfig};
pub use convert::{
    ConvertError, ConvertFuture, ConvertOptions, ConvertedFile, Converter, ExportFormat,
};
pub use settings::ThemeMode;
pub use storage::{KeyValueStorage, Result as StorageResult, StorageError};
