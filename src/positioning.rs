/// 实时定位跟踪
///
/// 按固定周期从信号源取一次扫描结果，调用无状态的最近邻定位，
/// 并通过通道把结果推送给展示层。两次定位之间不保留任何估计状态。

use crate::algorithms::{
    FingerprintDataset, LocationResult, Localizer, ScanObservation, SignalVector,
};
use crate::config::TrackingConfig;
use crate::error::{ConfigError, LocateError, TrackingError};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};

/// 信号源：无线扫描硬件或其替身
pub trait SignalSource: Send + 'static {
    /// 执行一次扫描，返回当前可见的接入点观测
    ///
    /// 跟踪任务在阻塞线程池上调用，实现可以同步等待硬件。
    fn scan(&mut self) -> Result<Vec<ScanObservation>, TrackingError>;
}

impl<F> SignalSource for F
where
    F: FnMut() -> Result<Vec<ScanObservation>, TrackingError> + Send + 'static,
{
    fn scan(&mut self) -> Result<Vec<ScanObservation>, TrackingError> {
        self()
    }
}

/// 按顺序回放预先录制的扫描结果
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<Vec<ScanObservation>>,
    cycle: bool,
}

impl ReplaySource {
    /// 回放一遍后报告耗尽
    pub fn new(frames: Vec<Vec<ScanObservation>>) -> Self {
        ReplaySource {
            frames: frames.into(),
            cycle: false,
        }
    }

    /// 循环回放
    pub fn cycling(frames: Vec<Vec<ScanObservation>>) -> Self {
        ReplaySource {
            frames: frames.into(),
            cycle: true,
        }
    }

    /// 剩余帧数
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl SignalSource for ReplaySource {
    fn scan(&mut self) -> Result<Vec<ScanObservation>, TrackingError> {
        let frame = self
            .frames
            .pop_front()
            .ok_or_else(|| TrackingError::Scan("回放数据已耗尽".to_string()))?;
        if self.cycle {
            self.frames.push_back(frame.clone());
        }
        Ok(frame)
    }
}

/// 实时定位跟踪器
#[derive(Debug)]
pub struct PositionTracker {
    dataset: Arc<FingerprintDataset>,
    config: TrackingConfig,
    ssid_filter: Option<Regex>,
}

impl PositionTracker {
    /// 创建跟踪器，编译 SSID 过滤表达式
    pub fn new(
        dataset: Arc<FingerprintDataset>,
        config: TrackingConfig,
    ) -> Result<Self, ConfigError> {
        let ssid_filter = config.ssid_filter()?;
        Ok(PositionTracker {
            dataset,
            config,
            ssid_filter,
        })
    }

    pub fn dataset(&self) -> &FingerprintDataset {
        &self.dataset
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// 把一次扫描结果转成实时读数：只保留已知接入点，重复读数取平均
    pub fn live_vector(&self, observations: &[ScanObservation]) -> SignalVector {
        SignalVector::from_observations(
            observations,
            |id| self.dataset.knows(id.as_str()),
            self.ssid_filter.as_ref(),
        )
    }

    /// 对一次扫描结果做定位
    pub fn estimate(
        &self,
        observations: &[ScanObservation],
    ) -> Result<LocationResult, LocateError> {
        let live = self.live_vector(observations);
        Localizer::new(&self.dataset).nearest(&live)
    }

    /// 启动周期定位任务
    ///
    /// 返回结果接收端和任务句柄。丢弃接收端后任务在下一个周期结束。
    pub fn spawn<S: SignalSource>(
        self,
        source: S,
    ) -> (mpsc::Receiver<LocationResult>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let handle = tokio::spawn(async move {
            self.run(source, tx).await;
        });
        (rx, handle)
    }

    async fn run<S: SignalSource>(self, mut source: S, tx: mpsc::Sender<LocationResult>) {
        let interval = self.config.update_interval();
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            access_points = self.dataset.access_point_ids().len(),
            records = self.dataset.len(),
            "定位任务启动"
        );

        let mut published: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            // 扫描可能阻塞，放到阻塞线程池，完成后取回信号源
            let scan = task::spawn_blocking(move || {
                let scanned = source.scan();
                (source, scanned)
            });
            let scanned = match scan.await {
                Ok((returned, scanned)) => {
                    source = returned;
                    scanned
                }
                Err(e) => {
                    tracing::error!(error = %e, "扫描线程异常退出");
                    break;
                }
            };

            let observations = match scanned {
                Ok(observations) => observations,
                Err(e) => {
                    tracing::warn!(error = %e, "扫描失败，跳过本次定位");
                    continue;
                }
            };

            let result = match self.estimate(&observations) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, "定位失败，跳过本次定位");
                    continue;
                }
            };

            tracing::trace!(
                x = result.position.x,
                y = result.position.y,
                record = result.record_index,
                observed = result.observed_count,
                "定位结果"
            );

            if tx.send(result).await.is_err() {
                break;
            }
            published += 1;
        }

        tracing::info!(published, "定位任务结束");
    }
}
