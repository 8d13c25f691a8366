/// 定位结果数据结构
///
/// 包含定位输出的坐标以及匹配过程的元数据

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 平面坐标，单位与参考勘测数据一致
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// 获取 (x, y) 元组
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// 与另一坐标的欧几里得距离
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Position::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// 一次最近邻匹配的完整结果
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationResult {
    /// 估计坐标
    pub position: Position,
    /// 与最佳记录的信号平方欧氏距离
    pub signal_distance: f64,
    /// 最佳记录在数据集中的下标
    pub record_index: usize,
    /// 实时读数中被数据集识别的接入点数量
    pub observed_count: usize,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
}

impl LocationResult {
    /// 创建新的定位结果
    pub fn new(
        position: Position,
        signal_distance: f64,
        record_index: usize,
        observed_count: usize,
    ) -> Self {
        Self::with_timestamp(
            position,
            signal_distance,
            record_index,
            observed_count,
            Utc::now(),
        )
    }

    /// 创建具有自定义时间戳的结果
    pub fn with_timestamp(
        position: Position,
        signal_distance: f64,
        record_index: usize,
        observed_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        LocationResult {
            position,
            signal_distance,
            record_index,
            observed_count,
            timestamp,
        }
    }

    /// 获取 2D 坐标
    pub fn xy(&self) -> (f64, f64) {
        self.position.xy()
    }

    /// 获取详细描述
    pub fn detailed_description(&self) -> String {
        format!(
            "位置: ({:.2}, {:.2}), 信号距离: {:.2}, 记录: #{}, 识别接入点数: {}, 时间: {}",
            self.position.x,
            self.position.y,
            self.signal_distance,
            self.record_index,
            self.observed_count,
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

impl fmt::Display for LocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [#{} d²={:.1}]",
            self.position, self.record_index, self.signal_distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let p1 = Position::new(0.0, 0.0);
        let p2 = Position::new(3.0, 4.0);
        assert_eq!(p1.distance_to(&p2), 5.0);
    }

    #[test]
    fn test_location_result_display() {
        let result = LocationResult::new(Position::new(1.0, 2.5), 8.0, 0, 2);
        assert_eq!(result.to_string(), "(1.00, 2.50) [#0 d²=8.0]");
        assert_eq!(result.xy(), (1.0, 2.5));
    }

    #[test]
    fn test_location_result_serializes_to_json() {
        let result = LocationResult::new(Position::new(10.0, 0.0), 898.0, 1, 2);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["position"]["x"], 10.0);
        assert_eq!(json["record_index"], 1);
    }
}
