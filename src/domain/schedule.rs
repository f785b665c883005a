// ==========================================
// 需求预测与产能排产系统 - 排产领域模型
// ==========================================
// 红线: 产能约束优先于需求满足，未满足部分结转为积压
// 用途: 逐日机台/人员/积压计算结果
// ==========================================

use crate::domain::error::{PlanningError, PlanningResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MachineConfig - 产线配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub machines: u32,               // 可用机台数
    pub throughput_per_machine: u32, // 单机台单班产出
    pub labor_per_shift: u32,        // 单机台单班操作工人数
}

impl MachineConfig {
    /// 构造并校验产线配置
    ///
    /// # 校验
    /// - throughput_per_machine 必须 > 0（机台需求数计算中作除数）
    pub fn new(machines: u32, throughput_per_machine: u32, labor_per_shift: u32) -> PlanningResult<Self> {
        if throughput_per_machine == 0 {
            return Err(PlanningError::InputFormat(
                "throughput_per_machine 必须大于 0".to_string(),
            ));
        }
        Ok(Self {
            machines,
            throughput_per_machine,
            labor_per_shift,
        })
    }

    /// 全部机台开动时的单日产能
    pub fn full_capacity(&self) -> u64 {
        u64::from(self.machines) * u64::from(self.throughput_per_machine)
    }
}

// ==========================================
// ScheduleDay - 单日排产结果（生成后不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub demand: f64,             // 当日原始需求（不含积压）
    pub effective_required: f64, // 当日需求 + 前日积压
    pub machines_running: u32,   // 开动机台数 (0..=machines)
    pub capacity_today: u64,     // 开动机台 × 单机产出
    pub fulfilled_today: f64,    // 当日完成量
    pub backlog_end: f64,        // 日末积压
    pub operators_required: u64, // 开动机台 × 单班人数
}

impl ScheduleDay {
    /// 当日消耗物料（与完成量一致）
    pub fn materials_required(&self) -> f64 {
        self.fulfilled_today
    }

    /// 日初积压
    pub fn backlog_start(&self) -> f64 {
        self.effective_required - self.demand
    }
}

// ==========================================
// ScheduleSummary - 排产汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_demand: f64,    // 原始需求合计（不含结转积压）
    pub total_fulfilled: f64, // 完成量合计
    pub peak_machines: u32,   // 峰值开动机台
    pub avg_operators: f64,   // 日均操作工
}

impl ScheduleSummary {
    /// 由逐日结果计算汇总（空序列各项为 0）
    pub fn from_days(days: &[ScheduleDay]) -> Self {
        let total_demand = days.iter().map(|d| d.demand).sum();
        let total_fulfilled = days.iter().map(|d| d.fulfilled_today).sum();
        let peak_machines = days.iter().map(|d| d.machines_running).max().unwrap_or(0);
        let avg_operators = if days.is_empty() {
            0.0
        } else {
            days.iter().map(|d| d.operators_required as f64).sum::<f64>() / days.len() as f64
        };

        Self {
            start_date: days.first().map(|d| d.date),
            end_date: days.last().map(|d| d.date),
            total_demand,
            total_fulfilled,
            peak_machines,
            avg_operators,
        }
    }
}

// ==========================================
// ScheduleRun - 单次排产运行
// ==========================================
// 生命周期: 在一次排产调用内整体构造，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub config: MachineConfig,
    pub initial_backlog: f64,
    pub days: Vec<ScheduleDay>,
    pub summary: ScheduleSummary,
}

impl ScheduleRun {
    pub fn new(config: MachineConfig, initial_backlog: f64, days: Vec<ScheduleDay>) -> Self {
        let summary = ScheduleSummary::from_days(&days);
        Self {
            config,
            initial_backlog,
            days,
            summary,
        }
    }

    /// 运行结束时的积压（空运行返回初始积压）
    pub fn final_backlog(&self) -> f64 {
        self.days
            .last()
            .map(|d| d.backlog_end)
            .unwrap_or(self.initial_backlog)
    }
}
