// ==========================================
// 需求预测与产能排产系统 - 规划配置项
// ==========================================
// 职责: 配置项结构、默认值、默认路径
// ==========================================

use crate::domain::error::PlanningResult;
use crate::domain::schedule::MachineConfig;
use crate::engine::arima::DEFAULT_ARIMA_ORDER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量: 显式指定配置库路径
pub const ENV_DB_PATH: &str = "DEMAND_PLANNER_DB_PATH";

/// 环境变量: 显式指定产物目录
pub const ENV_ARTIFACT_DIR: &str = "DEMAND_PLANNER_ARTIFACT_DIR";

/// 默认预测超时（毫秒）
pub const DEFAULT_FORECAST_TIMEOUT_MS: u64 = 30_000;

// ==========================================
// SchedulerDefaults - 排产默认产线参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerDefaults {
    pub machines: u32,
    pub throughput_per_machine: u32,
    pub labor_per_shift: u32,
}

impl Default for SchedulerDefaults {
    fn default() -> Self {
        Self {
            machines: 5,
            throughput_per_machine: 100,
            labor_per_shift: 5,
        }
    }
}

impl SchedulerDefaults {
    pub fn to_machine_config(&self) -> PlanningResult<MachineConfig> {
        MachineConfig::new(self.machines, self.throughput_per_machine, self.labor_per_shift)
    }
}

// ==========================================
// ForecastSettings - 预测参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSettings {
    pub arima_order: (usize, usize, usize),
    pub timeout_ms: u64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            arima_order: DEFAULT_ARIMA_ORDER,
            timeout_ms: DEFAULT_FORECAST_TIMEOUT_MS,
        }
    }
}

impl ForecastSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ==========================================
// PlannerConfig - 全量配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub scheduler: SchedulerDefaults,
    pub forecast: ForecastSettings,
    pub artifact_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerDefaults::default(),
            forecast: ForecastSettings::default(),
            artifact_dir: get_default_artifact_dir(),
        }
    }
}

/// 获取默认配置库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./demand_planner.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("demand-planner");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("demand_planner.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 获取默认产物目录（不在此处创建目录）
///
/// 优先级: 环境变量 → 用户数据目录 → 系统临时目录
pub fn get_default_artifact_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_ARTIFACT_DIR) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("demand-planner").join("artifacts"),
        None => std::env::temp_dir().join("dynamic_scheduling"),
    }
}
