// ==========================================
// 需求预测与产能排产系统 - 预测领域模型
// ==========================================

use crate::domain::types::{Granularity, Period};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastTarget - 已解析的预测目标
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastTarget {
    pub granularity: Granularity,   // 预测粒度
    pub label: String,              // 原始目标字符串
    pub target_date: NaiveDate,     // 目标周期首日（年/月粒度取 1 号）
    pub horizon: u32,               // 向前预测步数（历史查询时为 0）
    pub is_historical_lookup: bool, // 是否转为历史值直接查询
}

impl ForecastTarget {
    /// 目标所在周期
    pub fn period(&self) -> Period {
        Period::of(self.target_date, self.granularity)
    }
}

// ==========================================
// PeriodValue - 聚合后的一个周期
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period: Period,
    pub value: f64,
}

// ==========================================
// ForecastOutcome - 单次预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub target: ForecastTarget,
    pub prediction: f64,
    pub model_used: String,
}
