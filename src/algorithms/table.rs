/// 指纹表解析
///
/// 表格第一行为表头：前若干列是元数据（默认 `1,2,3,write_time`），
/// 其余每列对应一个接入点。表头位置（下标 -> 列名）由 [`TableSchema`]
/// 单独描述，记录本身只按列名存值。
///
/// 字段按分隔符逐字切分：不处理引号，不裁剪空白，保留空字段。

use crate::algorithms::{
    AccessPointId, FingerprintDataset, FingerprintRecord, NO_SIGNAL_DBM, Position,
};
use crate::config::TableConfig;
use crate::error::DatasetError;
use csv::StringRecord;
use std::collections::HashMap;

/// 表格逐行读取器
///
/// 行以 `\n` 结束，末字段上 CRLF 留下的 `\r` 会被去掉。
/// 字段数是否与表头一致由调用方检查。
struct TableReader<'r> {
    raw: &'r str,
    reader: csv::Reader<&'r [u8]>,
    record: StringRecord,
}

/// 读到的一行
struct Row<'a> {
    /// 行号，从 1 开始
    line: usize,
    /// 本行之前被跳过的空行数
    skipped: usize,
    fields: Vec<&'a str>,
}

impl Row<'_> {
    /// 空行（含只有 `\r` 的行）
    fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].is_empty()
    }

    /// 本行之前第一个空行的行号
    fn first_skipped(&self) -> Option<usize> {
        (self.skipped > 0).then(|| self.line - self.skipped)
    }
}

impl<'r> TableReader<'r> {
    fn new(raw: &'r str, config: &TableConfig) -> Result<Self, DatasetError> {
        let delimiter = config.delimiter_byte().ok_or(DatasetError::Delimiter {
            delimiter: config.delimiter,
        })?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_reader(raw.as_bytes());
        Ok(TableReader {
            raw,
            reader,
            record: StringRecord::new(),
        })
    }

    fn next_row(&mut self) -> Result<Option<Row<'_>>, DatasetError> {
        let before = self.reader.position().line();
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        // 读取器会吞掉空行，用换行数和是否以换行结尾反推
        let end = self.reader.position();
        let terminated = end.byte() < self.raw.len() as u64 || self.raw.ends_with('\n');
        let skipped = (end.line() - before).saturating_sub(terminated as u64) as usize;

        let last = self.record.len().saturating_sub(1);
        let fields = self
            .record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i == last {
                    field.strip_suffix('\r').unwrap_or(field)
                } else {
                    field
                }
            })
            .collect();

        Ok(Some(Row {
            line: before as usize + skipped,
            skipped,
            fields,
        }))
    }
}

/// 按分隔符逐字切分一行
///
/// 保留中间和末尾的空字段：`"a,,c"` 得到 3 个字段，`"a,b,"` 末尾有一个空字段。
/// 空行没有字段。
pub fn split_fields(line: &str, config: &TableConfig) -> Result<Vec<String>, DatasetError> {
    let mut reader = TableReader::new(line, config)?;
    Ok(match reader.next_row()? {
        Some(row) if !row.is_blank() => row.fields.iter().map(|f| f.to_string()).collect(),
        _ => Vec::new(),
    })
}

/// 表头结构：有序列名与被排除的写入时间列
#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    columns: Vec<String>,
    metadata_columns: usize,
    write_time_column: usize,
}

impl TableSchema {
    /// 由表头字段构建，列名原样保留
    pub fn parse(fields: &[&str], config: &TableConfig) -> Result<Self, DatasetError> {
        if fields.len() < config.metadata_columns {
            return Err(DatasetError::HeaderTooShort {
                found: fields.len(),
                required: config.metadata_columns,
            });
        }

        let schema = TableSchema {
            columns: fields.iter().map(|c| c.to_string()).collect(),
            metadata_columns: config.metadata_columns,
            write_time_column: config.write_time_column,
        };
        schema.check_duplicates()?;
        Ok(schema)
    }

    fn check_duplicates(&self) -> Result<(), DatasetError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, name) in self.columns.iter().enumerate() {
            if self.is_excluded(index) {
                continue;
            }
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(DatasetError::DuplicateColumn {
                    name: name.clone(),
                    first,
                    second: index,
                });
            }
            seen.insert(name.as_str(), index);
        }
        Ok(())
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 全部列名（含元数据列）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 该下标是否为写入时间列
    pub fn is_excluded(&self, index: usize) -> bool {
        index == self.write_time_column
    }

    /// 是否为接入点列
    pub fn is_access_point(&self, index: usize) -> bool {
        index >= self.metadata_columns && !self.is_excluded(index)
    }

    /// 按表头文本查找列下标
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 元数据列之后的接入点标识，保持表头顺序
    pub fn access_point_ids(&self) -> Vec<AccessPointId> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_access_point(*index))
            .map(|(_, name)| AccessPointId::from(name.as_str()))
            .collect()
    }

    /// 解析坐标列：按表头文本查找，落在写入时间列上则报错
    pub fn position_column(&self, name: &str) -> Result<usize, DatasetError> {
        let index = self.index_of(name).ok_or_else(|| DatasetError::MissingColumn {
            name: name.to_string(),
        })?;
        if self.is_excluded(index) {
            return Err(DatasetError::PositionColumnExcluded {
                name: name.to_string(),
                index,
            });
        }
        Ok(index)
    }
}

fn read_schema(
    reader: &mut TableReader<'_>,
    config: &TableConfig,
) -> Result<TableSchema, DatasetError> {
    match reader.next_row()? {
        Some(row) if row.skipped == 0 && !row.is_blank() => {
            TableSchema::parse(&row.fields, config)
        }
        _ => Err(DatasetError::MissingHeader),
    }
}

/// 读取表头中的接入点标识（默认表结构）
pub fn load_header(raw: &str) -> Result<Vec<AccessPointId>, DatasetError> {
    load_header_with(raw, &TableConfig::default())
}

/// 读取表头中的接入点标识
pub fn load_header_with(
    raw: &str,
    config: &TableConfig,
) -> Result<Vec<AccessPointId>, DatasetError> {
    let mut reader = TableReader::new(raw, config)?;
    Ok(read_schema(&mut reader, config)?.access_point_ids())
}

/// 解析完整指纹表
///
/// 任一数据行出错都会使整次解析失败。空行只允许出现在表格末尾。
pub fn parse_table(raw: &str, config: &TableConfig) -> Result<FingerprintDataset, DatasetError> {
    let mut reader = TableReader::new(raw, config)?;
    let schema = read_schema(&mut reader, config)?;

    // 两列都必须存在且不是写入时间列
    schema.position_column(&config.x_column)?;
    schema.position_column(&config.y_column)?;

    let mut records = Vec::new();
    let mut blank = None;
    while let Some(row) = reader.next_row()? {
        if row.is_blank() {
            blank.get_or_insert(row.line);
            continue;
        }
        if let Some(line) = blank.or(row.first_skipped()) {
            return Err(DatasetError::RowArity {
                line,
                expected: schema.len(),
                found: 0,
            });
        }
        records.push(parse_row(&row, &schema, config)?);
    }

    FingerprintDataset::new(schema.access_point_ids(), records)
}

fn parse_row(
    row: &Row<'_>,
    schema: &TableSchema,
    config: &TableConfig,
) -> Result<FingerprintRecord, DatasetError> {
    if row.fields.len() != schema.len() {
        return Err(DatasetError::RowArity {
            line: row.line,
            expected: schema.len(),
            found: row.fields.len(),
        });
    }

    let mut signals = Vec::with_capacity(row.fields.len());
    let mut metadata = HashMap::new();
    for (index, (name, raw)) in schema.columns().iter().zip(&row.fields).enumerate() {
        if schema.is_excluded(index) {
            continue;
        }
        let value = parse_cell(raw, row.line, name)?;
        if schema.is_access_point(index) {
            signals.push((name.as_str(), value));
        } else {
            metadata.insert(name.clone(), value);
        }
    }

    let mut record =
        FingerprintRecord::new(Position::default(), signals.into_iter().collect(), metadata);
    // 坐标列已在表头阶段校验过，这里按列名取值
    let x = record.get(&config.x_column).unwrap_or(NO_SIGNAL_DBM);
    let y = record.get(&config.y_column).unwrap_or(NO_SIGNAL_DBM);
    record.position = Position::new(x, y);
    Ok(record)
}

/// 单元格取值：空串为 [`NO_SIGNAL_DBM`]，否则必须是有限实数
///
/// 数字两侧的空白可以接受，只含空白的单元格不是空串。
fn parse_cell(raw: &str, line: usize, column: &str) -> Result<f64, DatasetError> {
    if raw.is_empty() {
        return Ok(NO_SIGNAL_DBM);
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DatasetError::NumericField {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "1,2,3,write_time,aa,bb\n\
                         0.5,1.2,-3.0,2023-12-07 19:43:23,-50,\n\
                         1.5,1.1,-4.0,2023-12-07 19:43:24,,-61.5\n";

    fn split(line: &str) -> Vec<String> {
        split_fields(line, &TableConfig::default()).unwrap()
    }

    #[test]
    fn test_split_fields_keeps_empty_fields() {
        assert_eq!(split("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split("a,b,"), vec!["a", "b", ""]);
        assert_eq!(split(","), vec!["", ""]);
        assert_eq!(split(" a , \"b\""), vec![" a ", " \"b\""]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = TableConfig {
            delimiter: '，',
            ..TableConfig::default()
        };
        assert!(matches!(
            split_fields("a，b", &config),
            Err(DatasetError::Delimiter { delimiter: '，' })
        ));
    }

    #[test]
    fn test_load_header_slices_metadata() {
        let ids = load_header(TABLE).unwrap();
        assert_eq!(ids, vec![AccessPointId::from("aa"), AccessPointId::from("bb")]);
    }

    #[test]
    fn test_header_names_kept_verbatim() {
        let ids = load_header("1,2,3,t, A ,B").unwrap();
        assert_eq!(ids, vec![AccessPointId::from(" A "), AccessPointId::from("B")]);
    }

    #[test]
    fn test_load_header_empty_table() {
        assert!(matches!(load_header(""), Err(DatasetError::MissingHeader)));
        assert!(matches!(load_header("\n1,2,3,t,A\n"), Err(DatasetError::MissingHeader)));
    }

    #[test]
    fn test_parse_table_positions_and_sentinel() {
        let dataset = parse_table(TABLE, &TableConfig::default()).unwrap();
        assert_eq!(dataset.len(), 2);

        let first = &dataset.records()[0];
        assert_eq!(first.position, Position::new(0.5, -3.0));
        assert_eq!(first.signals.get("aa"), Some(-50.0));
        assert_eq!(first.signals.get("bb"), Some(NO_SIGNAL_DBM));
        assert_eq!(first.get("2"), Some(1.2));
        assert_eq!(first.get("write_time"), None);

        let second = &dataset.records()[1];
        assert_eq!(second.signals.get("aa"), Some(NO_SIGNAL_DBM));
        assert_eq!(second.signals.get("bb"), Some(-61.5));
    }

    #[test]
    fn test_crlf_and_trailing_blank_lines() {
        let table = "1,2,3,t,aa\r\n1,2,3,x,-40\r\n\r\n";
        let dataset = parse_table(table, &TableConfig::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].position, Position::new(1.0, 3.0));
        assert_eq!(dataset.records()[0].signals.get("aa"), Some(-40.0));

        let trailing = "1,2,3,t,aa\n1,2,3,x,-40\n\n\n";
        assert_eq!(parse_table(trailing, &TableConfig::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_blank_line_inside_table_rejected() {
        for table in [
            "1,2,3,t,aa\n1,2,3,x,-40\n\n4,5,6,x,-60\n",
            "1,2,3,t,aa\n1,2,3,x,-40\n\n4,5,6,x,-60",
            "1,2,3,t,aa\r\n1,2,3,x,-40\r\n\r\n4,5,6,x,-60\r\n",
        ] {
            match parse_table(table, &TableConfig::default()) {
                Err(DatasetError::RowArity { line, found, .. }) => {
                    assert_eq!(line, 3);
                    assert_eq!(found, 0);
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_whitespace_only_row_rejected() {
        let table = "1,2,3,t,aa\n1,2,3,x,-40\n   \n4,5,6,x,-60\n";
        assert!(matches!(
            parse_table(table, &TableConfig::default()),
            Err(DatasetError::RowArity { line: 3, found: 1, .. })
        ));
    }

    #[test]
    fn test_whitespace_cell_is_not_empty() {
        let table = "1,2,3,t,aa\n0,0,0,t,   \n";
        match parse_table(table, &TableConfig::default()) {
            Err(DatasetError::NumericField { line, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "   ");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // 数字两侧的空白照常解析
        let padded = parse_table("1,2,3,t,aa\n0,0,0,t, -45 \n", &TableConfig::default()).unwrap();
        assert_eq!(padded.records()[0].signals.get("aa"), Some(-45.0));
    }

    #[test]
    fn test_position_column_on_write_time_is_flagged() {
        let config = TableConfig {
            y_column: "write_time".to_string(),
            ..TableConfig::default()
        };
        let err = parse_table(TABLE, &config).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::PositionColumnExcluded { index: 3, .. }
        ));
    }

    #[test]
    fn test_missing_position_column() {
        let table = "x,y,z,t,aa\n1,2,3,4,-40\n";
        assert!(matches!(
            parse_table(table, &TableConfig::default()),
            Err(DatasetError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_access_point_column() {
        let table = "1,2,3,t,aa,aa\n1,2,3,4,-40,-41\n";
        assert!(matches!(
            parse_table(table, &TableConfig::default()),
            Err(DatasetError::DuplicateColumn { first: 4, second: 5, .. })
        ));
    }

    #[test]
    fn test_header_too_short() {
        assert!(matches!(
            load_header("1,2,3\n"),
            Err(DatasetError::HeaderTooShort { found: 3, required: 4 })
        ));
    }

    #[test]
    fn test_non_numeric_cell() {
        let table = "1,2,3,t,aa\n1,2,3,4,strong\n";
        match parse_table(table, &TableConfig::default()) {
            Err(DatasetError::NumericField { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "aa");
                assert_eq!(value, "strong");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_write_time_is_never_parsed() {
        // 写入时间列内容不是数字也不影响解析
        let table = "1,2,3,3,aa\n1,2,7,not-a-number,-40\n";
        let dataset = parse_table(table, &TableConfig::default()).unwrap();
        assert_eq!(dataset.records()[0].position, Position::new(1.0, 7.0));
    }
}
