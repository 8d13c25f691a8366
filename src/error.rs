/// 错误类型定义
///
/// 数据集加载、定位计算、配置读取与实时跟踪各自有独立的错误枚举。

use std::io;
use thiserror::Error;

/// 指纹数据集加载错误
///
/// 任一错误都会使整次加载失败，不会返回部分构建的数据集。
#[derive(Debug, Error)]
pub enum DatasetError {
    /// 表格为空，缺少表头行
    #[error("表格为空：缺少表头行")]
    MissingHeader,

    /// 表头列数不足以容纳元数据列
    #[error("表头只有 {found} 列，至少需要 {required} 列元数据")]
    HeaderTooShort { found: usize, required: usize },

    /// 接入点列名重复
    #[error("接入点列 '{name}' 重复出现（第 {first} 列与第 {second} 列）")]
    DuplicateColumn {
        name: String,
        first: usize,
        second: usize,
    },

    /// 表头中找不到坐标列
    #[error("表头中不存在坐标列 '{name}'")]
    MissingColumn { name: String },

    /// 坐标列落在被排除的写入时间列上
    #[error("坐标列 '{name}' 位于第 {index} 列，该列是写入时间元数据，不参与记录")]
    PositionColumnExcluded { name: String, index: usize },

    /// 数据行字段数与表头不一致
    #[error("第 {line} 行有 {found} 个字段，表头有 {expected} 个")]
    RowArity {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// 非空字段无法解析为有限实数
    #[error("第 {line} 行列 '{column}' 的值 '{value}' 不是有效数字")]
    NumericField {
        line: usize,
        column: String,
        value: String,
    },

    /// 记录缺少某个接入点的读数
    #[error("第 {record} 条记录缺少接入点 '{id}' 的读数")]
    IncompleteRecord { record: usize, id: String },

    /// 分隔符不是单字节 ASCII 字符
    #[error("分隔符 '{delimiter}' 不是 ASCII 字符")]
    Delimiter { delimiter: char },

    /// 读取数据源失败
    #[error("读取指纹表失败: {0}")]
    Io(#[from] io::Error),

    #[error("指纹表格式错误: {0}")]
    Csv(#[from] csv::Error),
}

/// 定位计算错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// 数据集中没有任何指纹记录
    #[error("指纹数据集为空，无法定位")]
    EmptyDataset,
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] io::Error),

    #[error("配置格式错误: {0}")]
    Json(#[from] serde_json::Error),

    /// SSID 过滤正则表达式无法编译
    #[error("SSID 过滤表达式 '{pattern}' 无效: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// 实时跟踪错误
#[derive(Debug, Error)]
pub enum TrackingError {
    /// 信号源扫描失败
    #[error("信号扫描失败: {0}")]
    Scan(String),

    #[error(transparent)]
    Locate(#[from] LocateError),
}
