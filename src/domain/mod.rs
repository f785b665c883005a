// ==========================================
// 需求预测与产能排产系统 - 领域模型层
// ==========================================
// 职责: 定义值类型、错误分类
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod demand;
pub mod error;
pub mod forecast;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use demand::{DemandInput, DemandPoint, DemandRecord, DemandSeries, ObservedDemand};
pub use error::{PlanningError, PlanningResult};
pub use forecast::{ForecastOutcome, ForecastTarget, PeriodValue};
pub use schedule::{MachineConfig, ScheduleDay, ScheduleRun, ScheduleSummary};
pub use types::{Granularity, Period};
