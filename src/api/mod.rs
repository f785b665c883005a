// ==========================================
// 需求预测与产能排产系统 - API 层
// ==========================================
// 职责: 提供对外规划接口,供 CLI 或宿主程序调用
// ==========================================

pub mod error;
pub mod planning_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use planning_api::{
    ForecastResult, LineOverrides, PlanningApi, PlanningResponse, RangeSummary,
    ScheduleDayResult, ScheduleRangeResult, SingleDaySummary,
};
