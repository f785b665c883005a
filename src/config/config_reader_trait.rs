// ==========================================
// 需求预测与产能排产系统 - 配置读取 Trait
// ==========================================
// 职责: 定义规划所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::planner_config::{ForecastSettings, PlannerConfig, SchedulerDefaults};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait PlannerConfigReader: Send + Sync {
    /// 获取排产默认产线参数
    ///
    /// # 默认值
    /// - machines=5, throughput_per_machine=100, labor_per_shift=5
    async fn get_scheduler_defaults(&self) -> ConfigResult<SchedulerDefaults>;

    /// 获取预测参数
    ///
    /// # 默认值
    /// - arima_order=(2,1,2), timeout_ms=30000
    async fn get_forecast_settings(&self) -> ConfigResult<ForecastSettings>;

    /// 获取产物目录
    async fn get_artifact_dir(&self) -> ConfigResult<PathBuf>;

    /// 一次读取全部配置
    async fn load_planner_config(&self) -> ConfigResult<PlannerConfig> {
        Ok(PlannerConfig {
            scheduler: self.get_scheduler_defaults().await?,
            forecast: self.get_forecast_settings().await?,
            artifact_dir: self.get_artifact_dir().await?,
        })
    }
}
