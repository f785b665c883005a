// ==========================================
// 需求预测与产能排产系统 - 规划 API
// ==========================================
// 职责: 对外三项操作
//   - resolve_and_forecast: 目标周期解析 + 聚合 + 预测
//   - schedule_single_day: 单日产能排产
//   - schedule_range: 区间逐日排产（积压结转）
// 响应: { status: "success", ... } / { status: "error", code, message }
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::artifact::{ArtifactSink, CsvArtifactSink, PREFIX_MULTI, PREFIX_SINGLE};
use crate::config::config_reader_trait::PlannerConfigReader;
use crate::config::planner_config::{PlannerConfig, SchedulerDefaults, DEFAULT_FORECAST_TIMEOUT_MS};
use crate::domain::demand::DemandInput;
use crate::domain::error::PlanningError;
use crate::domain::forecast::{ForecastOutcome, ForecastTarget};
use crate::domain::schedule::{MachineConfig, ScheduleDay, ScheduleRun};
use crate::domain::types::Granularity;
use crate::engine::aggregator::Aggregator;
use crate::engine::arima::ArimaOracle;
use crate::engine::capacity_scheduler::CapacityScheduler;
use crate::engine::forecast_dispatcher::ForecastDispatcher;
use crate::engine::horizon_resolver::HorizonResolver;
use crate::importer::demand_normalizer::DemandNormalizer;
use crate::importer::field_parser::parse_flexible_date;

// ==========================================
// 响应包装
// ==========================================

/// 统一响应结构（按 status 字段区分成功/失败）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlanningResponse<T> {
    Success(T),
    Error { code: String, message: String },
}

impl<T> PlanningResponse<T> {
    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(value) => PlanningResponse::Success(value),
            Err(err) => {
                warn!(code = err.code(), error = %err, "规划请求失败");
                PlanningResponse::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PlanningResponse::Success(_))
    }

    /// 成功时取出结果
    pub fn success(self) -> Option<T> {
        match self {
            PlanningResponse::Success(value) => Some(value),
            PlanningResponse::Error { .. } => None,
        }
    }

    /// 失败时的错误代码
    pub fn error_code(&self) -> Option<&str> {
        match self {
            PlanningResponse::Success(_) => None,
            PlanningResponse::Error { code, .. } => Some(code),
        }
    }
}

// ==========================================
// DTO 定义
// ==========================================

/// 预测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub target: String,
    pub granularity: Granularity,
    pub horizon: u32,
    pub is_historical_lookup: bool,
    pub prediction: f64,
    pub model_used: String,
}

impl From<ForecastOutcome> for ForecastResult {
    fn from(outcome: ForecastOutcome) -> Self {
        Self {
            target: outcome.target.label,
            granularity: outcome.target.granularity,
            horizon: outcome.target.horizon,
            is_historical_lookup: outcome.target.is_historical_lookup,
            prediction: outcome.prediction,
            model_used: outcome.model_used,
        }
    }
}

/// 产线参数覆写（未给出的项取默认配置）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOverrides {
    pub machines: Option<u32>,
    pub throughput_per_machine: Option<u32>,
    pub labor_per_shift: Option<u32>,
}

impl LineOverrides {
    pub fn new(machines: u32, throughput_per_machine: u32, labor_per_shift: u32) -> Self {
        Self {
            machines: Some(machines),
            throughput_per_machine: Some(throughput_per_machine),
            labor_per_shift: Some(labor_per_shift),
        }
    }

    fn resolve(&self, defaults: &SchedulerDefaults) -> ApiResult<MachineConfig> {
        Ok(MachineConfig::new(
            self.machines.unwrap_or(defaults.machines),
            self.throughput_per_machine
                .unwrap_or(defaults.throughput_per_machine),
            self.labor_per_shift.unwrap_or(defaults.labor_per_shift),
        )?)
    }
}

/// 单日排产汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleDaySummary {
    pub date: NaiveDate,
    pub demand: f64,
    pub machines_running: u32,
    pub fulfilled: f64,
    pub backlog_end: f64,
    pub operators_required: u64,
    pub artifact: Option<String>,
}

/// 单日排产响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDayResult {
    pub schedule_artifact: Option<String>,
    pub summary: SingleDaySummary,
}

/// 区间排产汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_demand: f64,
    pub total_planned_output: f64,
    pub peak_machines: u32,
    pub avg_operators_per_day: f64,
    pub artifact: Option<String>,
}

/// 区间排产响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRangeResult {
    pub schedule_artifact: Option<String>,
    pub summary: RangeSummary,
    pub schedule: Vec<ScheduleDay>,
}

/// 预测前置阶段的结果
enum ForecastStage {
    /// 历史查询已直接得出结果
    Resolved(ForecastOutcome),
    /// 待调用模型
    Pending {
        target: ForecastTarget,
        values: Vec<f64>,
    },
}

// ==========================================
// PlanningApi
// ==========================================

/// 规划 API
///
/// 职责：
/// 1. 解析目标周期并预测（含历史查询）
/// 2. 单日 / 区间排产
/// 3. 通过显式注入的 ArtifactSink 持久化排产结果（未注入则不写出）
pub struct PlanningApi {
    normalizer: DemandNormalizer,
    resolver: HorizonResolver,
    dispatcher: ForecastDispatcher,
    scheduler_defaults: SchedulerDefaults,
    sink: Option<Arc<dyn ArtifactSink>>,
    forecast_timeout: Duration,
}

impl Default for PlanningApi {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningApi {
    /// 默认组件，不写出产物
    pub fn new() -> Self {
        Self {
            normalizer: DemandNormalizer::new(),
            resolver: HorizonResolver::new(),
            dispatcher: ForecastDispatcher::default(),
            scheduler_defaults: SchedulerDefaults::default(),
            sink: None,
            forecast_timeout: Duration::from_millis(DEFAULT_FORECAST_TIMEOUT_MS),
        }
    }

    /// 按全量配置构建（CSV 产物写入配置目录）
    pub fn from_config(config: &PlannerConfig) -> ApiResult<Self> {
        let (p, d, q) = config.forecast.arima_order;
        let oracle = ArimaOracle::new(p, d, q)?;

        Ok(Self::new()
            .with_dispatcher(ForecastDispatcher::new(Arc::new(oracle)))
            .with_scheduler_defaults(config.scheduler)
            .with_forecast_timeout(config.forecast.timeout())
            .with_sink(Arc::new(CsvArtifactSink::new(&config.artifact_dir))))
    }

    /// 从配置读取器构建
    pub async fn from_config_reader(reader: &dyn PlannerConfigReader) -> ApiResult<Self> {
        let config = reader.load_planner_config().await?;
        Self::from_config(&config)
    }

    pub fn with_normalizer(mut self, normalizer: DemandNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: ForecastDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_scheduler_defaults(mut self, defaults: SchedulerDefaults) -> Self {
        self.scheduler_defaults = defaults;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_forecast_timeout(mut self, timeout: Duration) -> Self {
        self.forecast_timeout = timeout;
        self
    }

    pub fn scheduler_defaults(&self) -> &SchedulerDefaults {
        &self.scheduler_defaults
    }

    // ==========================================
    // 预测
    // ==========================================

    /// 解析目标周期并预测（同步调用模型）
    ///
    /// # 参数
    /// - `source`: 需求数据源
    /// - `target`: YYYY-MM-DD / YYYY-MM / YYYY
    #[instrument(skip(self, source))]
    pub fn resolve_and_forecast(
        &self,
        source: &DemandInput,
        target: &str,
    ) -> PlanningResponse<ForecastResult> {
        PlanningResponse::from_result(self.try_resolve_and_forecast(source, target))
    }

    pub fn try_resolve_and_forecast(
        &self,
        source: &DemandInput,
        target: &str,
    ) -> ApiResult<ForecastResult> {
        let outcome = match self.prepare_forecast(source, target)? {
            ForecastStage::Resolved(outcome) => outcome,
            ForecastStage::Pending { target, values } => {
                let prediction = self.dispatcher.forecast(&values, target.horizon)?;
                self.outcome(target, prediction)
            }
        };
        Ok(self.log_outcome(outcome))
    }

    /// 解析目标周期并预测（模型在阻塞线程池运行，受超时约束）
    #[instrument(skip(self, source))]
    pub async fn resolve_and_forecast_async(
        &self,
        source: &DemandInput,
        target: &str,
    ) -> PlanningResponse<ForecastResult> {
        PlanningResponse::from_result(self.try_resolve_and_forecast_async(source, target).await)
    }

    pub async fn try_resolve_and_forecast_async(
        &self,
        source: &DemandInput,
        target: &str,
    ) -> ApiResult<ForecastResult> {
        let outcome = match self.prepare_forecast(source, target)? {
            ForecastStage::Resolved(outcome) => outcome,
            ForecastStage::Pending { target, values } => {
                let prediction = self
                    .dispatcher
                    .forecast_with_timeout(values, target.horizon, self.forecast_timeout)
                    .await?;
                self.outcome(target, prediction)
            }
        };
        Ok(self.log_outcome(outcome))
    }

    /// 归一化 → 解析目标 → 历史查询或聚合
    fn prepare_forecast(&self, source: &DemandInput, target: &str) -> ApiResult<ForecastStage> {
        let observed = self.normalizer.collect(source)?;
        let (first, last) = match (observed.first_date(), observed.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(PlanningError::InsufficientData {
                    required: 1,
                    actual: 0,
                }
                .into())
            }
        };

        let resolved = self.resolver.resolve(target, last)?;
        if resolved.is_historical_lookup {
            let value = self.resolver.lookup_historical(&resolved, &observed)?;
            return Ok(ForecastStage::Resolved(self.outcome(resolved, value)));
        }

        let series = observed.reindex(first, last)?;
        let values = Aggregator::aggregate_values(&series, resolved.granularity);
        Ok(ForecastStage::Pending {
            target: resolved,
            values,
        })
    }

    fn outcome(&self, target: ForecastTarget, prediction: f64) -> ForecastOutcome {
        ForecastOutcome {
            target,
            prediction,
            model_used: self.dispatcher.model_name().to_string(),
        }
    }

    fn log_outcome(&self, outcome: ForecastOutcome) -> ForecastResult {
        info!(
            target = %outcome.target.label,
            granularity = %outcome.target.granularity,
            horizon = outcome.target.horizon,
            historical = outcome.target.is_historical_lookup,
            prediction = outcome.prediction,
            "预测完成"
        );
        ForecastResult::from(outcome)
    }

    // ==========================================
    // 排产
    // ==========================================

    /// 单日排产（初始积压为 0）
    #[instrument(skip(self))]
    pub fn schedule_single_day(
        &self,
        date: &str,
        demand: f64,
        overrides: LineOverrides,
    ) -> PlanningResponse<ScheduleDayResult> {
        PlanningResponse::from_result(self.try_schedule_single_day(date, demand, overrides))
    }

    pub fn try_schedule_single_day(
        &self,
        date: &str,
        demand: f64,
        overrides: LineOverrides,
    ) -> ApiResult<ScheduleDayResult> {
        let date = parse_request_date(date)?;
        if !demand.is_finite() {
            return Err(ApiError::InvalidInput(format!("需求量必须为有限数值: {}", demand)));
        }
        let config = overrides.resolve(&self.scheduler_defaults)?;

        let run = CapacityScheduler::new(config).schedule_single_day(date, demand);
        let artifact = self.persist(PREFIX_SINGLE, &run)?;

        let day = run
            .days
            .first()
            .ok_or_else(|| ApiError::InternalError("单日排产未产生结果行".to_string()))?;

        Ok(ScheduleDayResult {
            schedule_artifact: artifact.clone(),
            summary: SingleDaySummary {
                date: day.date,
                demand: day.demand,
                machines_running: day.machines_running,
                fulfilled: day.fulfilled_today,
                backlog_end: day.backlog_end,
                operators_required: day.operators_required,
                artifact,
            },
        })
    }

    /// 区间排产（逐日结转积压）
    #[instrument(skip(self, source))]
    pub fn schedule_range(
        &self,
        source: &DemandInput,
        start_date: &str,
        end_date: &str,
        overrides: LineOverrides,
    ) -> PlanningResponse<ScheduleRangeResult> {
        PlanningResponse::from_result(self.try_schedule_range(source, start_date, end_date, overrides))
    }

    pub fn try_schedule_range(
        &self,
        source: &DemandInput,
        start_date: &str,
        end_date: &str,
        overrides: LineOverrides,
    ) -> ApiResult<ScheduleRangeResult> {
        let start = parse_request_date(start_date)?;
        let end = parse_request_date(end_date)?;
        let config = overrides.resolve(&self.scheduler_defaults)?;

        let series = self.normalizer.normalize(source, start, end)?;
        let run = CapacityScheduler::new(config).schedule(&series);
        let artifact = self.persist(PREFIX_MULTI, &run)?;

        Ok(ScheduleRangeResult {
            schedule_artifact: artifact.clone(),
            summary: RangeSummary {
                start_date: start,
                end_date: end,
                total_demand: run.summary.total_demand,
                total_planned_output: run.summary.total_fulfilled,
                peak_machines: run.summary.peak_machines,
                avg_operators_per_day: run.summary.avg_operators,
                artifact,
            },
            schedule: run.days,
        })
    }

    fn persist(&self, prefix: &str, run: &ScheduleRun) -> ApiResult<Option<String>> {
        match &self.sink {
            Some(sink) => Ok(Some(sink.persist(prefix, run)?)),
            None => Ok(None),
        }
    }
}

/// 请求日期解析（接受导入层支持的全部日期形态）
fn parse_request_date(value: &str) -> ApiResult<NaiveDate> {
    parse_flexible_date(value)
        .ok_or_else(|| ApiError::InputFormat(format!("无法解析日期: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn mapping(entries: &[(&str, f64)]) -> DemandInput {
        let map: BTreeMap<String, f64> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        DemandInput::Mapping(map)
    }

    #[test]
    fn test_single_day_without_sink() {
        let api = PlanningApi::new();
        let result = api
            .try_schedule_single_day("2025-01-01", 450.0, LineOverrides::new(5, 100, 5))
            .unwrap();

        assert!(result.schedule_artifact.is_none());
        assert_eq!(result.summary.machines_running, 5);
        assert_eq!(result.summary.fulfilled, 450.0);
        assert_eq!(result.summary.backlog_end, 0.0);
        assert_eq!(result.summary.operators_required, 25);
    }

    #[test]
    fn test_overrides_fall_back_to_defaults() {
        let api = PlanningApi::new().with_scheduler_defaults(SchedulerDefaults {
            machines: 2,
            throughput_per_machine: 10,
            labor_per_shift: 3,
        });
        let overrides = LineOverrides {
            machines: Some(4),
            ..LineOverrides::default()
        };
        let result = api.try_schedule_single_day("2025-01-01", 35.0, overrides).unwrap();
        assert_eq!(result.summary.machines_running, 4);
        assert_eq!(result.summary.operators_required, 12);
    }

    #[test]
    fn test_zero_throughput_rejected() {
        let api = PlanningApi::new();
        let response =
            api.schedule_single_day("2025-01-01", 10.0, LineOverrides::new(5, 0, 5));
        assert_eq!(response.error_code(), Some("INPUT_FORMAT_ERROR"));
    }

    #[test]
    fn test_historical_lookup_at_last_day() {
        let api = PlanningApi::new();
        let source = mapping(&[("2025-01-01", 10.0), ("2025-01-02", 20.0)]);
        let result = api.try_resolve_and_forecast(&source, "2025-01-02").unwrap();
        assert!(result.is_historical_lookup);
        assert_eq!(result.horizon, 0);
        assert_eq!(result.prediction, 20.0);
        assert_eq!(result.model_used, "ARIMA");
    }

    #[test]
    fn test_empty_source_is_insufficient() {
        let api = PlanningApi::new();
        let response = api.resolve_and_forecast(&mapping(&[]), "2025-01-02");
        assert_eq!(response.error_code(), Some("INSUFFICIENT_DATA_ERROR"));
    }

    #[test]
    fn test_response_serializes_status() {
        let ok: PlanningResponse<ForecastResult> = PlanningResponse::Success(ForecastResult {
            target: "2025".to_string(),
            granularity: Granularity::Year,
            horizon: 1,
            is_historical_lookup: false,
            prediction: 1.5,
            model_used: "ARIMA".to_string(),
        });
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["granularity"], "year");

        let err: PlanningResponse<ForecastResult> = PlanningResponse::Error {
            code: "TARGET_FORMAT_ERROR".to_string(),
            message: "bad".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "TARGET_FORMAT_ERROR");
    }
}
