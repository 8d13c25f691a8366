/// 最近邻指纹定位
///
/// 在参考数据集中寻找与实时读数信号距离最小的记录，返回其坐标。
/// 距离为所有已知接入点上的平方欧氏距离，实时读数缺失的接入点按
/// [`NO_SIGNAL_DBM`](crate::algorithms::NO_SIGNAL_DBM) 计算，非有限读数同样按缺失处理。

use crate::algorithms::{
    FingerprintDataset, FingerprintRecord, LocationResult, Position, SignalVector,
};
use crate::error::LocateError;

/// 最近邻定位器，借用一个只读数据集
#[derive(Clone, Copy, Debug)]
pub struct Localizer<'a> {
    dataset: &'a FingerprintDataset,
}

impl<'a> Localizer<'a> {
    pub fn new(dataset: &'a FingerprintDataset) -> Self {
        Localizer { dataset }
    }

    /// 定位器使用的数据集
    pub fn dataset(&self) -> &'a FingerprintDataset {
        self.dataset
    }

    /// 实时读数与一条记录的平方欧氏距离
    pub fn squared_distance(&self, live: &SignalVector, record: &FingerprintRecord) -> f64 {
        self.dataset
            .access_point_ids()
            .iter()
            .map(|id| {
                let diff = live.effective(id.as_str()) - record.signals.effective(id.as_str());
                diff * diff
            })
            .sum()
    }

    /// 查找最近的记录
    ///
    /// 第一条记录作为初始候选，之后只有严格更小的距离才会替换，
    /// 距离相同时保留数据集中靠前的记录。
    pub fn nearest(&self, live: &SignalVector) -> Result<LocationResult, LocateError> {
        let mut records = self.dataset.records().iter().enumerate();
        let (_, first) = records.next().ok_or(LocateError::EmptyDataset)?;

        let mut best_index = 0;
        let mut best_distance = self.squared_distance(live, first);
        for (index, record) in records {
            let distance = self.squared_distance(live, record);
            if distance < best_distance {
                best_index = index;
                best_distance = distance;
            }
        }

        let observed = self
            .dataset
            .access_point_ids()
            .iter()
            .filter(|id| live.is_observed(id.as_str()))
            .count();

        Ok(LocationResult::new(
            self.dataset.records()[best_index].position,
            best_distance,
            best_index,
            observed,
        ))
    }

    /// 估计坐标
    pub fn locate(&self, live: &SignalVector) -> Result<Position, LocateError> {
        self.nearest(live).map(|result| result.position)
    }
}

/// 对给定数据集执行一次最近邻定位
pub fn locate(live: &SignalVector, dataset: &FingerprintDataset) -> Result<Position, LocateError> {
    Localizer::new(dataset).locate(live)
}
