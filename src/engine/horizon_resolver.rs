// ==========================================
// 需求预测与产能排产系统 - 预测步长解析引擎
// ==========================================
// 职责: 目标周期字符串 → 粒度 + 预测步长 / 历史查询判定
// 规则: 按固定优先级匹配定长字面形态
//   1) YYYY-MM-DD → 日
//   2) YYYY-MM    → 月
//   3) YYYY       → 年
// 说明: 日粒度步长 ≤ 0 转为历史查询；月/年粒度步长下限为 1
// ==========================================

use crate::domain::demand::ObservedDemand;
use crate::domain::error::{PlanningError, PlanningResult};
use crate::domain::forecast::ForecastTarget;
use crate::domain::types::Granularity;
use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument};

const EXPECTED_SHAPES: &str = "YYYY 或 YYYY-MM 或 YYYY-MM-DD";

// ==========================================
// HorizonResolver - 步长解析引擎
// ==========================================
pub struct HorizonResolver {
    // 无状态引擎
}

impl Default for HorizonResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HorizonResolver {
    pub fn new() -> Self {
        Self {}
    }

    /// 解析目标周期
    ///
    /// # 参数
    /// - `target`: 目标周期字符串
    /// - `last_known_date`: 历史数据最后一天
    ///
    /// # 返回
    /// - Ok(ForecastTarget)
    /// - Err(TargetFormat): 不匹配任何形态，或在形态内严格解析失败
    #[instrument(skip(self), fields(last_known = %last_known_date))]
    pub fn resolve(&self, target: &str, last_known_date: NaiveDate) -> PlanningResult<ForecastTarget> {
        let resolved = match classify(target)? {
            Shape::Day(date) => {
                let horizon = (date - last_known_date).num_days();
                ForecastTarget {
                    granularity: Granularity::Day,
                    label: target.to_string(),
                    target_date: date,
                    horizon: horizon.max(0) as u32,
                    is_historical_lookup: horizon <= 0,
                }
            }
            Shape::Month(first_day) => {
                let months = (first_day.year() - last_known_date.year()) as i64 * 12
                    + (first_day.month() as i64 - last_known_date.month() as i64);
                ForecastTarget {
                    granularity: Granularity::Month,
                    label: target.to_string(),
                    target_date: first_day,
                    horizon: months.max(1) as u32,
                    is_historical_lookup: false,
                }
            }
            Shape::Year(first_day) => {
                let years = first_day.year() as i64 - last_known_date.year() as i64;
                ForecastTarget {
                    granularity: Granularity::Year,
                    label: target.to_string(),
                    target_date: first_day,
                    horizon: years.max(1) as u32,
                    is_historical_lookup: false,
                }
            }
        };

        debug!(
            granularity = %resolved.granularity,
            horizon = resolved.horizon,
            historical = resolved.is_historical_lookup,
            "目标周期解析完成"
        );
        Ok(resolved)
    }

    /// 历史查询：返回目标日在数据源中的实际值
    ///
    /// # 返回
    /// - Err(DateRange): 目标日早于最后数据点且数据源中无该日
    pub fn lookup_historical(
        &self,
        target: &ForecastTarget,
        observed: &ObservedDemand,
    ) -> PlanningResult<f64> {
        observed.get(target.target_date).ok_or_else(|| {
            PlanningError::DateRange(format!(
                "目标日期 {} 早于最后数据点，且该日无历史值",
                target.label
            ))
        })
    }
}

// ==========================================
// 形态匹配
// ==========================================

enum Shape {
    Day(NaiveDate),
    Month(NaiveDate),
    Year(NaiveDate),
}

/// 按优先级匹配定长字面形态；形态命中后严格解析
fn classify(target: &str) -> PlanningResult<Shape> {
    let bytes = target.as_bytes();

    if matches_shape(bytes, "dddd-dd-dd") {
        let (year, month, day) = (digits(&target[0..4]), digits(&target[5..7]), digits(&target[8..10]));
        return NaiveDate::from_ymd_opt(year as i32, month, day)
            .map(Shape::Day)
            .ok_or_else(|| PlanningError::TargetFormat(format!("无效日期: {}", target)));
    }

    if matches_shape(bytes, "dddd-dd") {
        let (year, month) = (digits(&target[0..4]), digits(&target[5..7]));
        return NaiveDate::from_ymd_opt(year as i32, month, 1)
            .map(Shape::Month)
            .ok_or_else(|| PlanningError::TargetFormat(format!("无效月份: {}", target)));
    }

    if matches_shape(bytes, "dddd") {
        let year = digits(target);
        return NaiveDate::from_ymd_opt(year as i32, 1, 1)
            .map(Shape::Year)
            .ok_or_else(|| PlanningError::TargetFormat(format!("无效年份: {}", target)));
    }

    Err(PlanningError::TargetFormat(format!(
        "无法识别目标周期 {:?}，期望 {}",
        target, EXPECTED_SHAPES
    )))
}

/// 形态模板: 'd' 为 ASCII 数字，其余字符须逐字相等
fn matches_shape(bytes: &[u8], shape: &str) -> bool {
    bytes.len() == shape.len()
        && bytes.iter().zip(shape.bytes()).all(|(b, s)| match s {
            b'd' => b.is_ascii_digit(),
            other => *b == other,
        })
}

/// 已校验为纯数字的片段
fn digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}
