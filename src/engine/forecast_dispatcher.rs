// ==========================================
// 需求预测与产能排产系统 - 预测调度引擎
// ==========================================
// 职责: 校验聚合序列 → 调用预测模型 → 取最远一步的点估计
// 红线: 不做模型阶数重试；超时/取消整体失败，不返回部分步长
// ==========================================

use crate::domain::error::{PlanningError, PlanningResult};
use crate::engine::arima::ArimaOracle;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

// ==========================================
// Trait: ForecastOracle
// ==========================================
// 用途: 外部统计预测模型接口
// 实现者: ArimaOracle
pub trait ForecastOracle: Send + Sync {
    /// 模型名称（写入响应 model_used）
    fn name(&self) -> &str;

    /// 拟合所需的最少观测数
    fn min_observations(&self) -> usize;

    /// 拟合并预测
    ///
    /// # 返回
    /// 长度恰为 horizon 的预测序列
    fn fit_and_forecast(&self, series: &[f64], horizon: usize) -> PlanningResult<Vec<f64>>;
}

// ==========================================
// ForecastDispatcher - 预测调度器
// ==========================================
#[derive(Clone)]
pub struct ForecastDispatcher {
    oracle: Arc<dyn ForecastOracle>,
}

impl Default for ForecastDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(ArimaOracle::default()))
    }
}

impl ForecastDispatcher {
    pub fn new(oracle: Arc<dyn ForecastOracle>) -> Self {
        Self { oracle }
    }

    pub fn model_name(&self) -> &str {
        self.oracle.name()
    }

    /// 同步预测
    ///
    /// # 参数
    /// - `series`: 已聚合的有序数值序列
    /// - `horizon`: 预测步长（≥ 1）
    ///
    /// # 返回
    /// 最远一步的预测值；模型 panic 与异步路径一致折算为 PlanningError::Forecast
    #[instrument(skip(self, series), fields(len = series.len(), model = self.oracle.name()))]
    pub fn forecast(&self, series: &[f64], horizon: u32) -> PlanningResult<f64> {
        self.precheck(series, horizon)?;
        let predictions = catch_unwind(AssertUnwindSafe(|| {
            self.oracle.fit_and_forecast(series, horizon as usize)
        }))
        .map_err(|panic| {
            warn!("预测模型异常终止");
            PlanningError::Forecast(format!("预测模型异常终止: {}", panic_message(&*panic)))
        })??;
        take_last(predictions, horizon)
    }

    /// 带超时的预测（在阻塞线程池中运行模型）
    ///
    /// 超时或任务异常终止 → PlanningError::Forecast
    #[instrument(skip(self, series), fields(len = series.len(), model = self.oracle.name()))]
    pub async fn forecast_with_timeout(
        &self,
        series: Vec<f64>,
        horizon: u32,
        timeout: Duration,
    ) -> PlanningResult<f64> {
        self.precheck(&series, horizon)?;

        let oracle = Arc::clone(&self.oracle);
        let task = tokio::task::spawn_blocking(move || {
            oracle.fit_and_forecast(&series, horizon as usize)
        });

        let predictions = match tokio::time::timeout(timeout, task).await {
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "预测超时，结果作废");
                return Err(PlanningError::Forecast(format!(
                    "预测超时 ({} ms)",
                    timeout.as_millis()
                )));
            }
            Ok(Err(join_err)) => {
                return Err(PlanningError::Forecast(format!(
                    "预测任务被取消或异常终止: {}",
                    join_err
                )));
            }
            Ok(Ok(result)) => result?,
        };

        take_last(predictions, horizon)
    }

    fn precheck(&self, series: &[f64], horizon: u32) -> PlanningResult<()> {
        if horizon == 0 {
            return Err(PlanningError::Forecast("预测步长必须 ≥ 1".to_string()));
        }
        let required = self.oracle.min_observations();
        if series.len() < required {
            return Err(PlanningError::InsufficientData {
                required,
                actual: series.len(),
            });
        }
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("未知原因")
}

/// 校验长度并取最后一步
fn take_last(predictions: Vec<f64>, horizon: u32) -> PlanningResult<f64> {
    if predictions.len() != horizon as usize {
        return Err(PlanningError::Forecast(format!(
            "模型返回 {} 个预测值，期望 {}",
            predictions.len(),
            horizon
        )));
    }
    let last = predictions
        .last()
        .copied()
        .ok_or_else(|| PlanningError::Forecast("模型未返回预测值".to_string()))?;
    debug!(horizon, prediction = last, "预测完成");
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 返回 1..=horizon 的固定模型
    struct CountingOracle;

    impl ForecastOracle for CountingOracle {
        fn name(&self) -> &str {
            "COUNTING"
        }
        fn min_observations(&self) -> usize {
            3
        }
        fn fit_and_forecast(&self, _series: &[f64], horizon: usize) -> PlanningResult<Vec<f64>> {
            Ok((1..=horizon).map(|i| i as f64).collect())
        }
    }

    /// 返回长度错误的模型
    struct ShortOracle;

    impl ForecastOracle for ShortOracle {
        fn name(&self) -> &str {
            "SHORT"
        }
        fn min_observations(&self) -> usize {
            1
        }
        fn fit_and_forecast(&self, _series: &[f64], _horizon: usize) -> PlanningResult<Vec<f64>> {
            Ok(vec![1.0])
        }
    }

    #[test]
    fn test_returns_last_step() {
        let dispatcher = ForecastDispatcher::new(Arc::new(CountingOracle));
        assert_eq!(dispatcher.forecast(&[1.0, 2.0, 3.0], 4).unwrap(), 4.0);
    }

    #[test]
    fn test_insufficient_data_not_padded() {
        let dispatcher = ForecastDispatcher::new(Arc::new(CountingOracle));
        assert_eq!(
            dispatcher.forecast(&[1.0, 2.0], 1),
            Err(PlanningError::InsufficientData {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let dispatcher = ForecastDispatcher::new(Arc::new(CountingOracle));
        assert!(matches!(
            dispatcher.forecast(&[1.0, 2.0, 3.0], 0),
            Err(PlanningError::Forecast(_))
        ));
    }

    #[test]
    fn test_wrong_length_is_forecast_error() {
        let dispatcher = ForecastDispatcher::new(Arc::new(ShortOracle));
        assert!(matches!(
            dispatcher.forecast(&[1.0], 3),
            Err(PlanningError::Forecast(_))
        ));
    }

    #[test]
    fn test_default_is_arima() {
        assert_eq!(ForecastDispatcher::default().model_name(), "ARIMA");
    }
}
