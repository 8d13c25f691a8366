/// 指纹定位算法模块
///
/// 该模块提供基于 WiFi 信号指纹的最近邻定位，包括：
/// - 接入点标识与信号强度向量
/// - 参考勘测表解析（指纹数据集）
/// - 最近邻匹配与离线精度评估

pub mod access_point;
pub mod signal;
pub mod results;
pub mod fingerprint;
pub mod table;
pub mod localizer;
pub mod evaluation;

pub use access_point::*;
pub use signal::*;
pub use results::*;
pub use fingerprint::*;
pub use table::{load_header, load_header_with, split_fields, TableSchema};
pub use localizer::*;
pub use evaluation::*;
