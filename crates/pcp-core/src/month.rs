//! 月份鍵（YYYY-MM）

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::PcpError;

/// 日曆月份
///
/// 依 (年, 月) 排序，即時間先後順序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    /// 1..=12
    month: u32,
}

impl MonthKey {
    /// 創建月份鍵，月份超出 1..=12 時返回 `None`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 以零為基準的月份（0 = 一月）
    pub fn month0(&self) -> u32 {
        self.month - 1
    }

    /// 某時間點在指定時區下所屬的月份
    pub fn from_instant(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// 該月第一天
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// 月份位移（可為負數）
    pub fn add_months(&self, months: i32) -> Self {
        let index = self.year * 12 + self.month0() as i32 + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// 下一個月
    pub fn succ(&self) -> Self {
        self.add_months(1)
    }

    /// 上一個月
    pub fn pred(&self) -> Self {
        self.add_months(-1)
    }

    /// 月份縮寫（Jan, Feb, ...）
    pub fn short_label(&self) -> String {
        self.first_day().format("%b").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = PcpError;

    /// 嚴格解析 `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PcpError::InvalidMonthKey(s.to_string());

        let (year_str, month_str) = s.split_once('-').ok_or_else(invalid)?;
        if year_str.len() != 4
            || month_str.len() != 2
            || !year_str.bytes().all(|b| b.is_ascii_digit())
            || !month_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = PcpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}
