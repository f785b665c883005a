// ==========================================
// 需求预测与产能排产系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (预测 + 产能排产)
// 数据流: 需求输入 → 归一化 → {聚合 → 预测} / {逐日排产 → 产物输出}
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型与错误分类
pub mod domain;

// 导入层 - 外部需求数据
pub mod importer;

// 引擎层 - 预测与排产规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 数据仓储层 - 排产结果落库
pub mod repository;

// 产物输出层 - CSV / SQLite
pub mod artifact;

// 配置层 - 系统配置
pub mod config;

// API 层 - 对外接口
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DemandInput, DemandRecord, DemandSeries, ForecastTarget, Granularity, MachineConfig,
    Period, PlanningError, PlanningResult, ScheduleDay, ScheduleRun, ScheduleSummary,
};

// 引擎
pub use engine::{
    Aggregator, ArimaOracle, CapacityScheduler, ForecastDispatcher, ForecastOracle,
    HorizonResolver,
};

// 导入
pub use importer::{DemandNormalizer, TabularReader};

// 产物输出
pub use artifact::{ArtifactSink, CsvArtifactSink, SqliteArtifactSink};

// 配置
pub use config::{ConfigManager, PlannerConfig, PlannerConfigReader};

// API
pub use api::{ApiError, LineOverrides, PlanningApi, PlanningResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "需求预测与产能排产系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
