// ==========================================
// 需求预测与产能排产系统 - 排产产物输出层
// ==========================================
// 职责: 将 ScheduleRun 写出为行式表格（CSV / SQLite）
// 说明: 输出位置由调用方显式传入，核心不触碰进程级目录状态
// ==========================================

pub mod csv_sink;
pub mod sqlite_sink;

use crate::domain::schedule::ScheduleRun;
use crate::repository::error::RepositoryError;
use thiserror::Error;

pub use csv_sink::{CsvArtifactSink, SCHEDULE_COLUMNS};
pub use sqlite_sink::SqliteArtifactSink;

/// 单日排产产物前缀
pub const PREFIX_SINGLE: &str = "schedule_single";

/// 多日排产产物前缀
pub const PREFIX_MULTI: &str = "schedule_multi";

/// 产物输出错误
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("产物目录创建失败: {0}")]
    DirectoryError(String),

    #[error("产物写入失败: {0}")]
    WriteError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        ArtifactError::WriteError(err.to_string())
    }
}

impl From<csv::Error> for ArtifactError {
    fn from(err: csv::Error) -> Self {
        ArtifactError::WriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ArtifactResult<T> = Result<T, ArtifactError>;

// ==========================================
// Trait: ArtifactSink
// ==========================================
pub trait ArtifactSink: Send + Sync {
    /// 持久化一次排产运行
    ///
    /// # 返回
    /// 产物定位符（文件路径 / sqlite://run_id）
    fn persist(&self, prefix: &str, run: &ScheduleRun) -> ArtifactResult<String>;
}
