/// 指纹记录与参考数据集

use crate::algorithms::{AccessPointId, Position, SignalVector, table};
use crate::config::TableConfig;
use crate::error::DatasetError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;

/// 单个参考勘测点
#[derive(Clone, Debug, PartialEq)]
pub struct FingerprintRecord {
    /// 勘测时的真实坐标
    pub position: Position,
    /// 完整信号向量，每个已知接入点一项
    pub signals: SignalVector,
    /// 其余元数据列（按列名），不含写入时间列
    pub metadata: HashMap<String, f64>,
}

impl FingerprintRecord {
    pub fn new(position: Position, signals: SignalVector, metadata: HashMap<String, f64>) -> Self {
        FingerprintRecord {
            position,
            signals,
            metadata,
        }
    }

    /// 按列名取值，先查接入点列再查元数据列
    pub fn get(&self, column: &str) -> Option<f64> {
        self.signals
            .get(column)
            .or_else(|| self.metadata.get(column).copied())
    }
}

/// 指纹数据集
///
/// 启动时一次性加载，之后只读。每条记录都包含全部接入点的读数。
#[derive(Clone, Debug)]
pub struct FingerprintDataset {
    access_point_ids: Vec<AccessPointId>,
    known: HashSet<AccessPointId>,
    records: Vec<FingerprintRecord>,
}

impl FingerprintDataset {
    /// 由接入点列表和记录构建，校验每条记录的完整性
    pub fn new(
        access_point_ids: Vec<AccessPointId>,
        records: Vec<FingerprintRecord>,
    ) -> Result<Self, DatasetError> {
        for (index, record) in records.iter().enumerate() {
            let missing = access_point_ids
                .iter()
                .find(|id| !record.signals.contains(id.as_str()));
            if let Some(id) = missing {
                return Err(DatasetError::IncompleteRecord {
                    record: index,
                    id: id.to_string(),
                });
            }
        }

        let known = access_point_ids.iter().cloned().collect();
        Ok(FingerprintDataset {
            access_point_ids,
            known,
            records,
        })
    }

    /// 按默认表结构解析
    pub fn load(raw: &str) -> Result<Self, DatasetError> {
        Self::load_with(raw, &TableConfig::default())
    }

    /// 按指定表结构解析
    pub fn load_with(raw: &str, config: &TableConfig) -> Result<Self, DatasetError> {
        let dataset = table::parse_table(raw, config)?;
        tracing::debug!(
            access_points = dataset.access_point_ids.len(),
            records = dataset.records.len(),
            "指纹数据集加载完成"
        );
        Ok(dataset)
    }

    /// 从任意字节流读取
    pub fn from_reader<R: Read>(mut reader: R, config: &TableConfig) -> Result<Self, DatasetError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::load_with(&raw, config)
    }

    /// 从文件读取
    pub fn from_path(path: impl AsRef<Path>, config: &TableConfig) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::load_with(&raw, config)
    }

    /// 接入点标识，顺序与表头一致
    pub fn access_point_ids(&self) -> &[AccessPointId] {
        &self.access_point_ids
    }

    /// 全部记录
    pub fn records(&self) -> &[FingerprintRecord] {
        &self.records
    }

    /// 记录数量
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 是否为已知接入点
    pub fn knows(&self, id: &str) -> bool {
        self.known.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_record_rejected() {
        let ids = vec![AccessPointId::from("A"), AccessPointId::from("B")];
        let record = FingerprintRecord::new(
            Position::new(0.0, 0.0),
            SignalVector::from_pairs([("A", -50.0)]),
            HashMap::new(),
        );
        match FingerprintDataset::new(ids, vec![record]) {
            Err(DatasetError::IncompleteRecord { record, id }) => {
                assert_eq!(record, 0);
                assert_eq!(id, "B");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_knows() {
        let dataset = FingerprintDataset::new(vec![AccessPointId::from("A")], Vec::new()).unwrap();
        assert!(dataset.knows("A"));
        assert!(!dataset.knows("B"));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_from_reader() {
        let raw = "1,2,3,write_time,A\n2,0,4,t,-70\n";
        let dataset =
            FingerprintDataset::from_reader(raw.as_bytes(), &TableConfig::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].position, Position::new(2.0, 4.0));
    }
}
