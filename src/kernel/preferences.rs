//! 主题偏好

use crate::kernel::services::ports::settings::ThemeMode;
use crate::kernel::services::ports::storage::{self, KeyValueStorage};
use std::sync::Arc;

pub const THEME_KEY: &str = "theme";

pub struct Preferences {
    storage: Arc<dyn KeyValueStorage>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// 缺失或无法识别时为 `Light`；也接受未加引号的 `dark` / `light`
    pub fn theme(&self) -> ThemeMode {
        match storage::load_json::<ThemeMode>(self.storage.as_ref(), THEME_KEY) {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => match self.storage.get(THEME_KEY).ok().flatten().as_deref().map(str::trim) {
                Some("dark") => ThemeMode::Dark,
                Some("light") => ThemeMode::Light,
                _ => {
                    tracing::warn!(key = THEME_KEY, error = %e, "unrecognised theme preference");
                    ThemeMode::default()
                }
            },
        }
    }

    pub fn set_theme(&self, theme: ThemeMode) -> storage::Result<()> {
        storage::save_json(self.storage.as_ref(), THEME_KEY, &theme)
    }

    pub fn toggle_theme(&self) -> storage::Result<ThemeMode> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        tracing::debug!(theme = next.as_str(), "theme toggled");
        Ok(next)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/preferences.rs"]
mod tests;
