// ==========================================
// 需求预测与产能排产系统 - 粒度聚合引擎
// ==========================================
// 职责: 逐日序列 → 日/月/年周期合计
// 红线: 不重排周期，不丢弃有贡献日的周期（含全 0 周期）
// ==========================================

use crate::domain::demand::DemandSeries;
use crate::domain::forecast::PeriodValue;
use crate::domain::types::{Granularity, Period};

pub struct Aggregator;

impl Aggregator {
    /// 按粒度聚合
    ///
    /// 输入序列已按日期递增，故相邻同周期合并即可保持时间顺序
    pub fn aggregate(series: &DemandSeries, granularity: Granularity) -> Vec<PeriodValue> {
        let mut result: Vec<PeriodValue> = Vec::new();

        for point in series.points() {
            let period = Period::of(point.date, granularity);
            match result.last_mut() {
                Some(last) if last.period == period => last.value += point.demand,
                _ => result.push(PeriodValue {
                    period,
                    value: point.demand,
                }),
            }
        }

        result
    }

    /// 仅取聚合后的数值序列（供预测使用）
    pub fn aggregate_values(series: &DemandSeries, granularity: Granularity) -> Vec<f64> {
        Self::aggregate(series, granularity)
            .into_iter()
            .map(|p| p.value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::demand::ObservedDemand;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(start: NaiveDate, end: NaiveDate, entries: &[(NaiveDate, f64)]) -> DemandSeries {
        let mut observed = ObservedDemand::new();
        for (date, value) in entries {
            observed.add(*date, *value);
        }
        observed.reindex(start, end).unwrap()
    }

    #[test]
    fn test_day_is_identity() {
        let s = series(d(2025, 1, 1), d(2025, 1, 3), &[(d(2025, 1, 2), 5.0)]);
        let values = Aggregator::aggregate_values(&s, Granularity::Day);
        assert_eq!(values, vec![0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_month_keeps_zero_periods() {
        let s = series(
            d(2024, 11, 15),
            d(2025, 1, 10),
            &[(d(2024, 11, 20), 10.0), (d(2025, 1, 5), 7.0), (d(2025, 1, 6), 3.0)],
        );

        let agg = Aggregator::aggregate(&s, Granularity::Month);

        assert_eq!(agg.len(), 3);
        assert_eq!(agg[0].period, Period::Month { year: 2024, month: 11 });
        assert_eq!(agg[1].value, 0.0);
        assert_eq!(agg[2].value, 10.0);
    }

    #[test]
    fn test_year_sums() {
        let s = series(
            d(2023, 12, 31),
            d(2024, 1, 1),
            &[(d(2023, 12, 31), 2.0), (d(2024, 1, 1), 3.0)],
        );
        let agg = Aggregator::aggregate(&s, Granularity::Year);
        assert_eq!(
            agg.iter().map(|p| (p.period, p.value)).collect::<Vec<_>>(),
            vec![(Period::Year(2023), 2.0), (Period::Year(2024), 3.0)]
        );
    }
}
