// ==========================================
// 需求预测与产能排产系统 - 需求归一化
// ==========================================
// 职责: 异构需求输入 → 指定日期区间的无缺口逐日序列
// 输入: DemandInput（映射 / 记录 / 表格 / 编码载荷）
// 输出: DemandSeries（缺失日补 0，同日求和）
// ==========================================

use crate::domain::demand::{
    find_date_field, find_value_field, DemandInput, DemandSeries, ObservedDemand,
};
use crate::domain::error::{PlanningError, PlanningResult};
use crate::importer::error::ImportError;
use crate::importer::field_parser::{parse_date_field, parse_demand_field, parse_flexible_date};
use crate::importer::http_reader::SourceTabularReader;
use crate::importer::tabular_reader_trait::{TabularData, TabularReader};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// DemandNormalizer - 需求归一化器
// ==========================================
pub struct DemandNormalizer {
    reader: Arc<dyn TabularReader>,
}

impl Default for DemandNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DemandNormalizer {
    /// 默认读取器: 本地文件 + http(s)
    pub fn new() -> Self {
        Self {
            reader: Arc::new(SourceTabularReader::default()),
        }
    }

    /// 注入自定义表格读取器
    pub fn with_reader(reader: Arc<dyn TabularReader>) -> Self {
        Self { reader }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 归一化为 [start_date, end_date] 闭区间的逐日序列
    ///
    /// # 规则
    /// - 同一自然日的多条数据求和
    /// - 区间内缺失日补 0，区间外数据丢弃
    /// - 结束早于开始 → DateRange
    ///
    /// # 幂等
    /// 同一输入与区间多次调用结果一致
    #[instrument(skip(self, input), fields(start = %start_date, end = %end_date))]
    pub fn normalize(
        &self,
        input: &DemandInput,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> PlanningResult<DemandSeries> {
        if end_date < start_date {
            return Err(PlanningError::DateRange(format!(
                "结束日期 {} 早于开始日期 {}",
                end_date, start_date
            )));
        }

        let observed = self.collect(input)?;
        let series = observed.reindex(start_date, end_date)?;
        debug!(
            observed_days = observed.len(),
            series_days = series.len(),
            "需求归一化完成"
        );
        Ok(series)
    }

    /// 收集数据源中实际出现的日需求（同日求和，不补缺口）
    pub fn collect(&self, input: &DemandInput) -> PlanningResult<ObservedDemand> {
        self.collect_inner(input, true)
    }

    fn collect_inner(&self, input: &DemandInput, allow_decode: bool) -> PlanningResult<ObservedDemand> {
        let mut observed = ObservedDemand::new();

        match input {
            DemandInput::Mapping(mapping) => {
                for (key, value) in mapping {
                    let date = parse_flexible_date(key).ok_or_else(|| {
                        PlanningError::InputFormat(format!("无法解析日期键: {}", key))
                    })?;
                    if !value.is_finite() {
                        return Err(PlanningError::InputFormat(format!(
                            "键 {} 的需求量不是有限数值: {}",
                            key, value
                        )));
                    }
                    observed.add(date, *value);
                }
            }
            DemandInput::Records(records) => {
                for (idx, record) in records.iter().enumerate() {
                    let date = parse_date_field(&record.date, idx + 1, "date")?;
                    if !record.demand.is_finite() {
                        return Err(ImportError::TypeConversionError {
                            row: idx + 1,
                            field: "demand".to_string(),
                            message: format!("需求量必须为有限数值: {}", record.demand),
                        }
                        .into());
                    }
                    observed.add(date, record.demand);
                }
            }
            DemandInput::Tabular(locator) => {
                let data = self.reader.read(locator)?;
                collect_tabular(&data, &mut observed)?;
            }
            DemandInput::Encoded(payload) => {
                if !allow_decode {
                    return Err(PlanningError::InputFormat(
                        "编码载荷嵌套了另一层字符串".to_string(),
                    ));
                }
                let decoded = decode_payload(payload)?;
                return self.collect_inner(&decoded, false);
            }
        }

        Ok(observed)
    }
}

/// 解码 JSON 载荷；字符串载荷按来源规则再判定一次
fn decode_payload(payload: &str) -> PlanningResult<DemandInput> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        warn!(error = %e, "需求载荷无法解码");
        PlanningError::from(ImportError::PayloadDecodeError(format!(
            "不支持的需求字符串输入: {}",
            e
        )))
    })?;

    match value {
        serde_json::Value::String(inner) => Ok(DemandInput::from_source_str(&inner)),
        other => DemandInput::from_json_value(other),
    }
}

/// 表格 → 日需求：按子串匹配日期列与需求列
fn collect_tabular(data: &TabularData, observed: &mut ObservedDemand) -> PlanningResult<()> {
    let header_refs: Vec<&str> = data.headers.iter().map(|h| h.as_str()).collect();
    let missing = |kind: &str| ImportError::MissingColumn {
        kind: kind.to_string(),
        headers: data.headers.join(","),
    };

    let date_name = find_date_field(&header_refs).ok_or_else(|| missing("日期"))?;
    let value_name = find_value_field(&header_refs).ok_or_else(|| missing("需求"))?;
    let date_col = data
        .find_column(|h| h == date_name)
        .ok_or_else(|| missing("日期"))?;
    let value_col = data
        .find_column(|h| h == value_name)
        .ok_or_else(|| missing("需求"))?;

    for row in 0..data.rows.len() {
        // 行号从表头之后的第 2 行开始
        let row_number = row + 2;
        let date = parse_date_field(data.cell(row, date_col), row_number, date_name)?;
        if let Some(value) = parse_demand_field(data.cell(row, value_col), row_number, value_name)? {
            observed.add(date, value);
        }
    }

    Ok(())
}
