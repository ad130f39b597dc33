use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dk_platform::headless::HeadlessConfig;
use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// 显示环境配置
///
/// Only tunes logging and the headless backend; cache, registry and event-loop behavior is not
/// configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub headless: HeadlessConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            headless: HeadlessConfig::default(),
        }
    }
}

impl DisplayConfig {
    /// `$DK_DISPLAY_CONFIG` if set, else `<home>/.dk_display/display.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        PathBuf::from(default_config_dir())
            .join(".dk_display")
            .join("display.json")
    }

    /// 从默认路径加载，失败时使用默认值
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from `path`, falling back to defaults if the file is missing or invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::try_load_from(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config {}: {e:#}", path.display());
            Self::default()
        })
    }

    pub fn try_load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// 保存为格式化 JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
