//! tracing 初始化

use pcp_core::{PcpError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化 tracing，`RUST_LOG` 優先於傳入的等級
///
/// 重複初始化會返回 `PcpError::Config`。
pub fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .map_err(|e| PcpError::Config(format!("無效的日誌等級 {}: {}", log_level, e)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| PcpError::Config(format!("tracing 初始化失敗: {}", e)))
}
