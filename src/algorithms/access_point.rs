/// WiFi 接入点标识

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// 接入点标识符（通常为 BSSID，即 MAC 地址文本）
///
/// 与指纹表表头中的列名逐字比较，不做大小写或格式归一化。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPointId(String);

impl AccessPointId {
    /// 创建新的接入点标识
    pub fn new(id: impl Into<String>) -> Self {
        AccessPointId(id.into())
    }

    /// 获取标识文本
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccessPointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccessPointId {
    fn from(id: String) -> Self {
        AccessPointId(id)
    }
}

impl Borrow<str> for AccessPointId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AccessPointId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_access_point_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(AccessPointId::from("a0:b1:c2:d3:e4:f5"), -60.0);
        assert_eq!(map.get("a0:b1:c2:d3:e4:f5"), Some(&-60.0));
        assert!(map.get("A0:B1:C2:D3:E4:F5").is_none());
    }

    #[test]
    fn test_access_point_id_display() {
        let id = AccessPointId::new("ap-1".to_string());
        assert_eq!(id.to_string(), "ap-1");
        assert_eq!(id.as_str(), "ap-1");
    }
}
