// ==========================================
// 需求预测与产能排产系统 - 数据仓储层
// ==========================================
// 职责: 排产结果的 SQLite 持久化
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod schedule_run_repo;

// 重导出
pub use error::{RepositoryError, RepositoryResult};
pub use schedule_run_repo::{ScheduleRunRepository, StoredScheduleRun};
