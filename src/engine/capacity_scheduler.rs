// ==========================================
// 需求预测与产能排产系统 - 产能约束排产引擎
// ==========================================
// 红线: 产能约束优先于需求满足
// ==========================================
// 职责: 逐日顺序折叠，未满足需求结转为次日积压
// 输入: 逐日需求序列 + 初始积压 + 产线配置
// 输出: ScheduleRun（逐日结果 + 汇总）
// 说明: 每日依赖前一日积压，严禁乱序或并行处理
// ==========================================

use crate::domain::demand::DemandSeries;
use crate::domain::schedule::{MachineConfig, ScheduleDay, ScheduleRun};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

// ==========================================
// CapacityScheduler - 产能约束排产引擎
// ==========================================
pub struct CapacityScheduler {
    config: MachineConfig,
}

impl CapacityScheduler {
    /// 构造函数
    ///
    /// # 参数
    /// - `config`: 已校验的产线配置（throughput_per_machine > 0）
    pub fn new(config: MachineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排产（初始积压为 0）
    pub fn schedule(&self, series: &DemandSeries) -> ScheduleRun {
        self.schedule_with_backlog(series, 0.0)
    }

    /// 单日排产：单元素序列上的同一折叠，初始积压恒为 0
    pub fn schedule_single_day(&self, date: NaiveDate, demand: f64) -> ScheduleRun {
        self.schedule(&DemandSeries::single_day(date, demand))
    }

    /// 排产（带初始积压）
    ///
    /// 规则（逐日）：
    /// 1) effective_required = demand + backlog
    /// 2) machines_needed = ceil(effective_required / throughput)，需求 ≤ 0 时为 0
    /// 3) machines_running = min(machines_needed, machines)
    /// 4) capacity_today = machines_running × throughput
    /// 5) fulfilled_today = min(capacity_today, effective_required)
    /// 6) backlog_next = effective_required − fulfilled_today
    /// 7) operators_required = machines_running × labor_per_shift
    #[instrument(skip(self, series), fields(
        days = series.len(),
        machines = self.config.machines,
        throughput = self.config.throughput_per_machine
    ))]
    pub fn schedule_with_backlog(&self, series: &DemandSeries, initial_backlog: f64) -> ScheduleRun {
        let mut backlog = initial_backlog;
        let mut days = Vec::with_capacity(series.len());

        for point in series.points() {
            let day = self.step(point.date, point.demand, backlog);
            backlog = day.backlog_end;
            days.push(day);
        }

        let run = ScheduleRun::new(self.config, initial_backlog, days);
        info!(
            total_demand = run.summary.total_demand,
            total_fulfilled = run.summary.total_fulfilled,
            peak_machines = run.summary.peak_machines,
            final_backlog = run.final_backlog(),
            "排产完成"
        );
        run
    }

    /// 单日状态转移
    fn step(&self, date: NaiveDate, demand: f64, backlog_in: f64) -> ScheduleDay {
        let throughput = f64::from(self.config.throughput_per_machine);

        // 1. 当日有效需求
        let effective_required = demand + backlog_in;

        // 2-3. 开动机台（受可用机台数约束）
        let machines_needed = if effective_required > 0.0 {
            (effective_required / throughput).ceil()
        } else {
            0.0
        };
        let machines_running = if machines_needed >= f64::from(self.config.machines) {
            self.config.machines
        } else {
            machines_needed as u32
        };

        // 4-6. 产能、完成量、积压
        let capacity_today = u64::from(machines_running) * u64::from(self.config.throughput_per_machine);
        let fulfilled_today = (capacity_today as f64).min(effective_required);
        let backlog_end = effective_required - fulfilled_today;

        // 7. 人员
        let operators_required = u64::from(machines_running) * u64::from(self.config.labor_per_shift);

        debug!(
            %date,
            demand,
            effective_required,
            machines_running,
            fulfilled_today,
            backlog_end,
            "单日排产"
        );

        ScheduleDay {
            date,
            demand,
            effective_required,
            machines_running,
            capacity_today,
            fulfilled_today,
            backlog_end,
            operators_required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::demand::ObservedDemand;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn scheduler() -> CapacityScheduler {
        CapacityScheduler::new(MachineConfig::new(5, 100, 5).unwrap())
    }

    #[test]
    fn test_single_day_within_capacity() {
        let run = scheduler().schedule_single_day(d(2025, 11, 20), 450.0);
        let day = &run.days[0];

        assert_eq!(day.machines_running, 5);
        assert_eq!(day.capacity_today, 500);
        assert_eq!(day.fulfilled_today, 450.0);
        assert_eq!(day.backlog_end, 0.0);
        assert_eq!(day.operators_required, 25);
    }

    #[test]
    fn test_backlog_carried_to_next_day() {
        let mut observed = ObservedDemand::new();
        observed.add(d(2025, 11, 20), 600.0);
        let series = observed.reindex(d(2025, 11, 20), d(2025, 11, 21)).unwrap();

        let run = scheduler().schedule(&series);

        assert_eq!(run.days[0].machines_running, 5);
        assert_eq!(run.days[0].fulfilled_today, 500.0);
        assert_eq!(run.days[0].backlog_end, 100.0);

        assert_eq!(run.days[1].effective_required, 100.0);
        assert_eq!(run.days[1].machines_running, 1);
        assert_eq!(run.days[1].fulfilled_today, 100.0);
        assert_eq!(run.days[1].backlog_end, 0.0);
        assert_eq!(run.days[1].operators_required, 5);
    }

    #[test]
    fn test_zero_demand_idles_machines() {
        let run = scheduler().schedule_single_day(d(2025, 1, 1), 0.0);
        assert_eq!(run.days[0].machines_running, 0);
        assert_eq!(run.days[0].operators_required, 0);
        assert_eq!(run.summary.peak_machines, 0);
    }

    #[test]
    fn test_partial_machine_rounds_up() {
        let run = scheduler().schedule_single_day(d(2025, 1, 1), 101.0);
        assert_eq!(run.days[0].machines_running, 2);
        assert_eq!(run.days[0].capacity_today, 200);
        assert_eq!(run.days[0].fulfilled_today, 101.0);
    }

    #[test]
    fn test_initial_backlog_is_consumed() {
        let series = DemandSeries::single_day(d(2025, 1, 1), 50.0);
        let run = scheduler().schedule_with_backlog(&series, 30.0);
        assert_eq!(run.days[0].effective_required, 80.0);
        assert_eq!(run.days[0].backlog_start(), 30.0);
        assert_eq!(run.summary.total_demand, 50.0);
    }
}
