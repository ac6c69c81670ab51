//! 彙總計算配置

use chrono::{FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PcpError, Result};

/// 儀表板月份數上限（100 年）
pub const MAX_WINDOW_MONTHS: u32 = 1200;

/// 彙總計算參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// 月份歸屬使用的時區（相對 UTC 的分鐘數）
    ///
    /// 完成時間先換算到此時區，再決定屬於哪個日曆月。
    pub utc_offset_minutes: i32,

    /// 儀表板月度序列的月份數（含當月）
    pub window_months: u32,

    /// 低於此進度百分比的近期需求視為緊急
    pub critical_progress_threshold: Decimal,

    /// A 類累計百分比上限（含）
    pub abc_a_threshold: Decimal,

    /// B 類累計百分比上限（含）
    pub abc_b_threshold: Decimal,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            window_months: 6,
            critical_progress_threshold: Decimal::from(25),
            abc_a_threshold: Decimal::from(80),
            abc_b_threshold: Decimal::from(95),
        }
    }
}

impl AggregationConfig {
    /// 創建預設配置（UTC、6 個月、25%、80/95）
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置時區偏移（分鐘）
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// 建構器模式：設置儀表板月份數
    pub fn with_window_months(mut self, months: u32) -> Self {
        self.window_months = months;
        self
    }

    /// 建構器模式：設置緊急需求門檻
    pub fn with_critical_progress_threshold(mut self, threshold: Decimal) -> Self {
        self.critical_progress_threshold = threshold;
        self
    }

    /// 建構器模式：設置 ABC 分類門檻
    pub fn with_abc_thresholds(mut self, a: Decimal, b: Decimal) -> Self {
        self.abc_a_threshold = a;
        self.abc_b_threshold = b;
        self
    }

    /// 月份歸屬時區
    ///
    /// 偏移超出 ±24 小時時退回 UTC；載入時應先呼叫 [`validate`](Self::validate)。
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(utc)
    }

    /// 檢查配置是否合法
    pub fn validate(&self) -> Result<()> {
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(PcpError::Config(format!(
                "時區偏移超出範圍: {} 分鐘",
                self.utc_offset_minutes
            )));
        }

        if self.window_months > MAX_WINDOW_MONTHS {
            return Err(PcpError::Config(format!(
                "儀表板月份數超出上限 {}: {}",
                MAX_WINDOW_MONTHS, self.window_months
            )));
        }

        let hundred = Decimal::ONE_HUNDRED;
        if self.abc_a_threshold <= Decimal::ZERO
            || self.abc_a_threshold > self.abc_b_threshold
            || self.abc_b_threshold > hundred
        {
            return Err(PcpError::Config(format!(
                "ABC 門檻需滿足 0 < A <= B <= 100: A={}, B={}",
                self.abc_a_threshold, self.abc_b_threshold
            )));
        }

        if self.critical_progress_threshold < Decimal::ZERO
            || self.critical_progress_threshold > hundred
        {
            return Err(PcpError::Config(format!(
                "緊急門檻需介於 0 與 100: {}",
                self.critical_progress_threshold
            )));
        }

        Ok(())
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
