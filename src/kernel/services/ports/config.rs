use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 为空时使用平台数据目录下的 `storage/`
    #[serde(alias = "storageDir", skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(alias = "draftDebounceMs")]
    pub draft_debounce_ms: u64,
    pub converter: ConverterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            draft_debounce_ms: 1000,
            converter: ConverterConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn draft_debounce(&self) -> Duration {
        Duration::from_millis(self.draft_debounce_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 生成幻灯片（pptx）的命令
    #[serde(alias = "slidesCommand")]
    pub slides_command: String,
    /// 生成 pdf / docx / html 的命令
    #[serde(alias = "documentCommand")]
    pub document_command: String,
    #[serde(alias = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            slides_command: "marp".to_string(),
            document_command: "pandoc".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ConverterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
