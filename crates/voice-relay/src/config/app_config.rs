use serde::{Deserialize, Serialize};

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Push-to-talk key, in `global-hotkey` syntax (e.g. `PageUp`, `ctrl+KeyT`).
    pub hotkey: String,
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hotkey: "PageUp".to_string(),
            log_level: "info".to_string(),
        }
    }
}
