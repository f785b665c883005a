// ==========================================
// 需求预测与产能排产系统 - 配置层
// ==========================================
// 职责: 系统配置管理,缺省值 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader_trait;
pub mod error;
pub mod planner_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader_trait::PlannerConfigReader;
pub use error::{ConfigError, ConfigResult};
pub use planner_config::{
    get_default_artifact_dir, get_default_db_path, ForecastSettings, PlannerConfig,
    SchedulerDefaults,
};
