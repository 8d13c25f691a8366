/// 离线精度评估
///
/// 对带真实坐标的样本逐个定位，统计位置误差分布。

use crate::algorithms::{Localizer, Position, SignalVector};
use crate::error::LocateError;
use serde::Serialize;
use std::fmt;

/// 位置误差统计
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub count: usize,
    pub mean: f64,
    /// 总体标准差
    pub std: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

impl ErrorSummary {
    /// 由误差序列计算统计量，空序列返回 None
    pub fn from_errors(errors: &[f64]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }

        let mut sorted = errors.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / count as f64;

        Some(ErrorSummary {
            count,
            mean,
            std: variance.sqrt(),
            median: percentile(&sorted, 50.0),
            min: sorted[0],
            max: sorted[count - 1],
            q25: percentile(&sorted, 25.0),
            q75: percentile(&sorted, 75.0),
        })
    }
}

impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "样本: {}, 均值: {:.3}, 标准差: {:.3}, 中位数: {:.3}, 最大: {:.3}, 最小: {:.3}, q25: {:.3}, q75: {:.3}",
            self.count, self.mean, self.std, self.median, self.max, self.min, self.q25, self.q75
        )
    }
}

/// 相邻秩线性插值的百分位数，`sorted` 必须非空且升序
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 对标注样本逐个定位，返回每个样本的位置误差
pub fn position_errors<'s, I>(
    localizer: &Localizer<'_>,
    samples: I,
) -> Result<Vec<f64>, LocateError>
where
    I: IntoIterator<Item = &'s (SignalVector, Position)>,
{
    samples
        .into_iter()
        .map(|(live, truth)| {
            localizer
                .locate(live)
                .map(|estimate| estimate.distance_to(truth))
        })
        .collect()
}

/// 评估定位精度，没有样本时返回 `Ok(None)`
pub fn evaluate<'s, I>(
    localizer: &Localizer<'_>,
    samples: I,
) -> Result<Option<ErrorSummary>, LocateError>
where
    I: IntoIterator<Item = &'s (SignalVector, Position)>,
{
    let errors = position_errors(localizer, samples)?;
    let summary = ErrorSummary::from_errors(&errors);
    if let Some(summary) = &summary {
        tracing::debug!(
            count = summary.count,
            mean = summary.mean,
            median = summary.median,
            "定位精度评估完成"
        );
    }
    Ok(summary)
}
