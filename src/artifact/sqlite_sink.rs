// ==========================================
// 需求预测与产能排产系统 - SQLite 产物输出
// ==========================================

use crate::artifact::{ArtifactResult, ArtifactSink};
use crate::domain::schedule::ScheduleRun;
use crate::repository::schedule_run_repo::ScheduleRunRepository;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 定位符前缀
pub const SQLITE_LOCATOR_SCHEME: &str = "sqlite://";

pub struct SqliteArtifactSink {
    repo: Arc<ScheduleRunRepository>,
}

impl SqliteArtifactSink {
    pub fn new(repo: Arc<ScheduleRunRepository>) -> Self {
        Self { repo }
    }

    /// 从定位符取回 run_id
    pub fn run_id_of(locator: &str) -> Option<&str> {
        locator.strip_prefix(SQLITE_LOCATOR_SCHEME)
    }
}

impl ArtifactSink for SqliteArtifactSink {
    fn persist(&self, prefix: &str, run: &ScheduleRun) -> ArtifactResult<String> {
        let run_id = Uuid::new_v4().simple().to_string();
        self.repo.insert_run(&run_id, prefix, run)?;

        let locator = format!("{}{}", SQLITE_LOCATOR_SCHEME, run_id);
        info!(artifact = %locator, rows = run.days.len(), "排产结果已落库");
        Ok(locator)
    }
}
