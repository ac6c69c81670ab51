//! 應用設定

use std::path::Path;

use pcp_core::{AggregationConfig, PcpError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// 覆寫日誌等級的環境變數
pub const LOG_LEVEL_ENV: &str = "PCP_LOG_LEVEL";

/// 應用設定（聚合參數 + 日誌）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aggregation: AggregationConfig,
    /// `EnvFilter` 語法，例如 `info` 或 `info,pcp_calc=debug`
    pub log_level: String,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aggregation: AggregationConfig::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Settings {
    /// 從 JSON 檔案載入，並套用環境變數覆寫
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PcpError::Config(format!("無法讀取 {}: {}", path.display(), e)))?;

        let mut settings = Self::from_json_str(&raw)?;
        settings.apply_log_level_override(std::env::var(LOG_LEVEL_ENV).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// 從 JSON 字串解析（缺少的欄位使用預設值）
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(raw)
            .map_err(|e| PcpError::Config(format!("設定格式錯誤: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 以外部提供的等級覆寫，空字串忽略
    pub fn apply_log_level_override(&mut self, level: Option<String>) {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.aggregation.validate()?;
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| PcpError::Config(format!("無效的日誌等級 {}: {}", self.log_level, e)))?;
        Ok(())
    }
}
