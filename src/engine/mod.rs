// ==========================================
// 需求预测与产能排产系统 - 引擎层
// ==========================================
// 职责: 实现预测与排产规则,不做 I/O
// 红线: 引擎不读文件、不写库
// ==========================================

pub mod aggregator;
pub mod arima;
pub mod capacity_scheduler;
pub mod forecast_dispatcher;
pub mod horizon_resolver;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use arima::{ArimaOracle, DEFAULT_ARIMA_ORDER};
pub use capacity_scheduler::CapacityScheduler;
pub use forecast_dispatcher::{ForecastDispatcher, ForecastOracle};
pub use horizon_resolver::HorizonResolver;
