/// 运行配置
///
/// 从 JSON 读取，所有字段都有默认值，空对象 `{}` 即为默认配置。

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 指纹表结构配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// 字段分隔符
    pub delimiter: char,
    /// 表头前部元数据列数量，其后每列对应一个接入点
    pub metadata_columns: usize,
    /// 写入时间列下标，该列始终不进入记录
    pub write_time_column: usize,
    /// X 坐标列的表头文本
    pub x_column: String,
    /// Y 坐标列的表头文本
    pub y_column: String,
}

impl TableConfig {
    /// 分隔符对应的单字节，非 ASCII 分隔符返回 None
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        // 勘测表头为 `1,2,3,write_time,<BSSID>...`，平面由位姿分量 1 和 3 构成
        TableConfig {
            delimiter: ',',
            metadata_columns: 4,
            write_time_column: 3,
            x_column: "1".to_string(),
            y_column: "3".to_string(),
        }
    }
}

/// 实时跟踪配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// 定位更新间隔（毫秒）
    pub update_interval_ms: u64,
    /// 结果通道容量
    pub channel_capacity: usize,
    /// 只采用 SSID 匹配该正则的观测
    pub ssid_pattern: Option<String>,
}

impl TrackingConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.max(1))
    }

    /// 编译 SSID 过滤表达式
    pub fn ssid_filter(&self) -> Result<Option<Regex>, ConfigError> {
        self.ssid_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            update_interval_ms: 1000,
            channel_capacity: 16,
            ssid_pattern: None,
        }
    }
}

/// 顶层配置
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub table: TableConfig,
    pub tracking: TrackingConfig,
}

impl LocatorConfig {
    /// 从 JSON 文本解析
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件读取
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = LocatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LocatorConfig::default());
        assert_eq!(config.table.y_column, "3");
        assert_eq!(config.tracking.update_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_override() {
        let config = LocatorConfig::from_json_str(
            r#"{"table": {"delimiter": ";"}, "tracking": {"ssid_pattern": "^AirPennNet$"}}"#,
        )
        .unwrap();
        assert_eq!(config.table.delimiter, ';');
        assert_eq!(config.table.delimiter_byte(), Some(b';'));
        assert_eq!(config.table.metadata_columns, 4);
        assert!(config.tracking.ssid_filter().unwrap().is_some());
    }

    #[test]
    fn test_invalid_pattern() {
        let tracking = TrackingConfig {
            ssid_pattern: Some("([".to_string()),
            ..TrackingConfig::default()
        };
        assert!(matches!(
            tracking.ssid_filter(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LocatorConfig::from_json_str("{\"table\": 3}"),
            Err(ConfigError::Json(_))
        ));
    }
}
