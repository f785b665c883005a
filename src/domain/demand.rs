// ==========================================
// 需求预测与产能排产系统 - 需求领域模型
// ==========================================
// 职责: 需求输入形态（边界处一次判定）、逐日需求序列
// 红线: 序列日期严格递增且无缺口
// ==========================================

use crate::domain::error::{PlanningError, PlanningResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// DemandRecord - 单条需求记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub date: String,  // 日期字符串（宽松格式，归一化时解析）
    pub demand: f64,   // 需求量
}

impl DemandRecord {
    pub fn new(date: impl Into<String>, demand: f64) -> Self {
        Self {
            date: date.into(),
            demand,
        }
    }
}

// ==========================================
// DemandInput - 需求输入（标签化变体）
// ==========================================
// 每种可接受的输入形态一个构造分支，在边界处判定一次
#[derive(Debug, Clone, PartialEq)]
pub enum DemandInput {
    /// 日期键 → 数值 映射
    Mapping(BTreeMap<String, f64>),
    /// 记录列表（每条含日期字段与需求字段）
    Records(Vec<DemandRecord>),
    /// 表格数据源定位符（文件路径或 URL）
    Tabular(String),
    /// 编码后的结构化载荷（JSON 字符串）
    Encoded(String),
}

impl DemandInput {
    /// 根据字符串来源判定输入形态
    ///
    /// # 规则
    /// - http(s) 定位符或已存在的文件路径 → Tabular
    /// - 其余字符串 → Encoded（稍后按 JSON 解码）
    pub fn from_source_str(source: &str) -> Self {
        let trimmed = source.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || Path::new(trimmed).exists() {
            DemandInput::Tabular(trimmed.to_string())
        } else {
            DemandInput::Encoded(source.to_string())
        }
    }

    /// 从已解码的 JSON 值构造输入
    ///
    /// # 规则
    /// - 对象 → Mapping（值可以是数字或数字字符串）
    /// - 对象数组 → Records（字段名按子串匹配，忽略大小写）
    /// - 其他 → InputFormat 错误
    pub fn from_json_value(value: serde_json::Value) -> PlanningResult<Self> {
        use serde_json::Value;

        match value {
            Value::Object(map) => {
                let mut mapping = BTreeMap::new();
                for (key, raw) in map {
                    let demand = json_number(&raw).ok_or_else(|| {
                        PlanningError::InputFormat(format!("键 {} 的值不是数值: {}", key, raw))
                    })?;
                    mapping.insert(key, demand);
                }
                Ok(DemandInput::Mapping(mapping))
            }
            Value::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    let obj = item.as_object().ok_or_else(|| {
                        PlanningError::InputFormat(format!("第 {} 条记录不是对象", idx + 1))
                    })?;
                    let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
                    let date_key = find_date_field(&keys).ok_or_else(|| {
                        PlanningError::InputFormat(format!("第 {} 条记录缺少日期字段", idx + 1))
                    })?;
                    let value_key = find_value_field(&keys).ok_or_else(|| {
                        PlanningError::InputFormat(format!("第 {} 条记录缺少需求字段", idx + 1))
                    })?;

                    let date = match &obj[date_key] {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let demand = json_number(&obj[value_key]).ok_or_else(|| {
                        PlanningError::InputFormat(format!(
                            "第 {} 条记录的需求字段不是数值: {}",
                            idx + 1,
                            obj[value_key]
                        ))
                    })?;
                    records.push(DemandRecord { date, demand });
                }
                Ok(DemandInput::Records(records))
            }
            other => Err(PlanningError::InputFormat(format!(
                "不支持的需求载荷类型: {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<BTreeMap<String, f64>> for DemandInput {
    fn from(mapping: BTreeMap<String, f64>) -> Self {
        DemandInput::Mapping(mapping)
    }
}

impl From<Vec<DemandRecord>> for DemandInput {
    fn from(records: Vec<DemandRecord>) -> Self {
        DemandInput::Records(records)
    }
}

/// 日期列判定: 名称包含 "date"（忽略大小写）
pub fn is_date_field(name: &str) -> bool {
    name.to_lowercase().contains("date")
}

/// 需求列判定: 名称包含 demand / value / qty / quantity 之一（忽略大小写）
pub fn is_value_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["demand", "value", "qty", "quantity"]
        .iter()
        .any(|k| lower.contains(k))
}

/// 返回第一个日期列
pub fn find_date_field<'a>(names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|n| is_date_field(n))
}

/// 返回第一个需求列
pub fn find_value_field<'a>(names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|n| is_value_field(n))
}

/// JSON 数值或数值字符串 → 有限 f64（"NaN" / "inf" 视为非数值）
fn json_number(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ==========================================
// DemandPoint / DemandSeries - 逐日需求序列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub date: NaiveDate,
    pub demand: f64,
}

/// 逐日需求序列
///
/// 不变量: 日期严格递增、无重复、相邻两点恰好相差一天。
/// 负值原样保留（不做下限截断）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DemandSeries {
    points: Vec<DemandPoint>,
}

impl DemandSeries {
    /// 由点列构造并校验不变量
    pub fn from_points(points: Vec<DemandPoint>) -> PlanningResult<Self> {
        for pair in points.windows(2) {
            let (prev, next) = (pair[0].date, pair[1].date);
            if next <= prev {
                return Err(PlanningError::InputFormat(format!(
                    "序列日期必须严格递增: {} 之后出现 {}",
                    prev, next
                )));
            }
            if next - prev != Duration::days(1) {
                return Err(PlanningError::InputFormat(format!(
                    "序列存在缺口: {} 与 {} 之间",
                    prev, next
                )));
            }
        }
        Ok(Self { points })
    }

    /// 单日序列
    pub fn single_day(date: NaiveDate, demand: f64) -> Self {
        Self {
            points: vec![DemandPoint { date, demand }],
        }
    }

    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.demand).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.demand).sum()
    }
}

// ==========================================
// ObservedDemand - 数据源中实际出现的日需求（同日已求和）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservedDemand {
    by_day: BTreeMap<NaiveDate, f64>,
}

impl ObservedDemand {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加某天的需求（同一自然日求和）
    pub fn add(&mut self, date: NaiveDate, demand: f64) {
        *self.by_day.entry(date).or_insert(0.0) += demand;
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.by_day.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.by_day.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_day.keys().next_back().copied()
    }

    /// 重建为 [start, end] 闭区间的逐日序列，缺失日补 0
    pub fn reindex(&self, start: NaiveDate, end: NaiveDate) -> PlanningResult<DemandSeries> {
        if end < start {
            return Err(PlanningError::DateRange(format!(
                "结束日期 {} 早于开始日期 {}",
                end, start
            )));
        }

        let points = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| DemandPoint {
                date,
                demand: self.get(date).unwrap_or(0.0),
            })
            .collect();

        Ok(DemandSeries { points })
    }
}
