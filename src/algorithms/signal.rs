/// 信号强度向量与原始扫描数据

use crate::algorithms::AccessPointId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 未检测到信号时使用的替代强度 (dBm)
pub const NO_SIGNAL_DBM: f64 = -100.0;

/// 单次扫描得到的一条接入点观测
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanObservation {
    /// 接入点 BSSID
    pub bssid: AccessPointId,
    /// 网络名称
    pub ssid: String,
    /// 信号强度 (dBm)
    pub level: f64,
}

impl ScanObservation {
    pub fn new(bssid: impl Into<AccessPointId>, ssid: impl Into<String>, level: f64) -> Self {
        ScanObservation {
            bssid: bssid.into(),
            ssid: ssid.into(),
            level,
        }
    }
}

/// 信号强度向量：接入点 -> 强度 (dBm)
///
/// 实时读数通常是部分的，只包含当前观测到的接入点；
/// 缺失的接入点在距离计算中按 [`NO_SIGNAL_DBM`] 处理。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalVector {
    strengths: HashMap<AccessPointId, f64>,
}

impl SignalVector {
    /// 创建空向量
    pub fn new() -> Self {
        SignalVector {
            strengths: HashMap::new(),
        }
    }

    /// 从 (接入点, 强度) 对创建
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<AccessPointId>,
    {
        let mut vector = SignalVector::new();
        for (id, strength) in pairs {
            vector.insert(id, strength);
        }
        vector
    }

    /// 从 HashMap 创建
    pub fn from_hashmap(strengths: HashMap<AccessPointId, f64>) -> Self {
        SignalVector { strengths }
    }

    /// 从扫描观测创建，不做任何过滤
    ///
    /// 同一 BSSID 出现多次时取平均值。
    pub fn from_measurements<'o, I>(measurements: I) -> Self
    where
        I: IntoIterator<Item = &'o ScanObservation>,
    {
        let mut sums: HashMap<AccessPointId, (f64, usize)> = HashMap::new();
        for obs in measurements {
            let entry = sums.entry(obs.bssid.clone()).or_insert((0.0, 0));
            entry.0 += obs.level;
            entry.1 += 1;
        }

        let strengths = sums
            .into_iter()
            .map(|(id, (sum, count))| (id, sum / count as f64))
            .collect();
        SignalVector { strengths }
    }

    /// 从原始扫描结果构建实时读数
    ///
    /// 只保留 `is_known` 接受的接入点；给定 `ssid_filter` 时还要求 SSID 匹配。
    /// 同一 BSSID 在一次扫描中出现多次时取平均值。
    pub fn from_observations<'o, I, F>(
        observations: I,
        is_known: F,
        ssid_filter: Option<&Regex>,
    ) -> Self
    where
        I: IntoIterator<Item = &'o ScanObservation>,
        F: Fn(&AccessPointId) -> bool,
    {
        Self::from_measurements(observations.into_iter().filter(|obs| {
            is_known(&obs.bssid) && ssid_filter.is_none_or(|filter| filter.is_match(&obs.ssid))
        }))
    }

    /// 插入或覆盖一个读数
    pub fn insert(&mut self, id: impl Into<AccessPointId>, strength: f64) {
        self.strengths.insert(id.into(), strength);
    }

    /// 获取读数，未观测时为 None
    pub fn get(&self, id: &str) -> Option<f64> {
        self.strengths.get(id).copied()
    }

    /// 获取参与距离计算的有效值
    ///
    /// 未观测或读数不是有限值（NaN、无穷）时取 [`NO_SIGNAL_DBM`]。
    #[inline]
    pub fn effective(&self, id: &str) -> f64 {
        self.get(id).filter(|s| s.is_finite()).unwrap_or(NO_SIGNAL_DBM)
    }

    /// 是否有可用的有限读数
    pub fn is_observed(&self, id: &str) -> bool {
        self.get(id).is_some_and(f64::is_finite)
    }

    /// 是否包含接入点
    pub fn contains(&self, id: &str) -> bool {
        self.strengths.contains_key(id)
    }

    /// 读数数量
    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }

    /// 迭代所有读数
    pub fn iter(&self) -> impl Iterator<Item = (&AccessPointId, f64)> {
        self.strengths.iter().map(|(id, s)| (id, *s))
    }

    /// 丢弃不在 `ids` 中的读数
    pub fn retain_known(&mut self, ids: &[AccessPointId]) {
        self.strengths.retain(|id, _| ids.contains(id));
    }
}

impl<K: Into<AccessPointId>> FromIterator<(K, f64)> for SignalVector {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        SignalVector::from_pairs(iter)
    }
}
