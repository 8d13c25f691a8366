//! WiFi 指纹室内定位
//!
//! 启动时加载参考勘测表（指纹数据集），之后对每次实时扫描读数做
//! 最近邻匹配，输出与之信号最接近的勘测点坐标。

pub mod algorithms;
pub mod config;
pub mod error;
pub mod positioning;

pub use algorithms::{
    AccessPointId, FingerprintDataset, FingerprintRecord, LocationResult, Localizer,
    NO_SIGNAL_DBM, Position, ScanObservation, SignalVector, load_header, locate,
};
pub use config::{LocatorConfig, TableConfig, TrackingConfig};
pub use error::{ConfigError, DatasetError, LocateError, TrackingError};
pub use positioning::{PositionTracker, ReplaySource, SignalSource};
