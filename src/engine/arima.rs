// ==========================================
// 需求预测与产能排产系统 - ARIMA 预测模型
// ==========================================
// 职责: 数值序列 + 步长 → 逐步预测值
// 方法:
//   I  : d 阶差分
//   AR : Yule-Walker 方程（Levinson-Durbin 递推）
//   MA : 残差自相关估计
// 说明: 每次调用独立拟合，无内部可变状态
// ==========================================

use crate::domain::error::{PlanningError, PlanningResult};
use crate::engine::forecast_dispatcher::ForecastOracle;
use serde::{Deserialize, Serialize};

/// 默认模型阶数 (p, d, q)
pub const DEFAULT_ARIMA_ORDER: (usize, usize, usize) = (2, 1, 2);

const EPSILON: f64 = 1e-12;

// ==========================================
// ArimaOracle - ARIMA(p, d, q)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOracle {
    p: usize, // AR 阶数
    d: usize, // 差分阶数
    q: usize, // MA 阶数
}

impl Default for ArimaOracle {
    fn default() -> Self {
        let (p, d, q) = DEFAULT_ARIMA_ORDER;
        Self { p, d, q }
    }
}

impl ArimaOracle {
    /// 创建指定阶数的模型
    ///
    /// # 校验
    /// - p ≤ 10, d ≤ 2, q ≤ 10
    pub fn new(p: usize, d: usize, q: usize) -> PlanningResult<Self> {
        if p > 10 {
            return Err(PlanningError::Forecast("AR 阶数 p 不能超过 10".to_string()));
        }
        if d > 2 {
            return Err(PlanningError::Forecast("差分阶数 d 不能超过 2".to_string()));
        }
        if q > 10 {
            return Err(PlanningError::Forecast("MA 阶数 q 不能超过 10".to_string()));
        }
        Ok(Self { p, d, q })
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// d 阶差分，同时记录每一层差分前的最后一个值（用于还原）
    fn difference(&self, data: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut tails = Vec::with_capacity(self.d);
        let mut current = data.to_vec();
        for _ in 0..self.d {
            tails.push(current.last().copied().unwrap_or(0.0));
            current = current.windows(2).map(|w| w[1] - w[0]).collect();
        }
        (current, tails)
    }

    /// 逐层累加还原到原始量纲
    fn integrate(forecasts: Vec<f64>, tails: &[f64]) -> Vec<f64> {
        let mut result = forecasts;
        for last in tails.iter().rev() {
            let mut level = *last;
            result = result
                .into_iter()
                .map(|delta| {
                    level += delta;
                    level
                })
                .collect();
        }
        result
    }

    /// Yule-Walker 估计 AR 系数（Levinson-Durbin）
    fn estimate_ar(&self, centered: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; self.p];
        if self.p == 0 {
            return phi;
        }

        let n = centered.len() as f64;
        let autocov: Vec<f64> = (0..=self.p)
            .map(|k| {
                centered
                    .iter()
                    .skip(k)
                    .zip(centered.iter())
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / n
            })
            .collect();

        // 常数序列：无自相关结构
        if autocov[0].abs() < EPSILON {
            return phi;
        }

        let mut err = autocov[0];
        for k in 0..self.p {
            let mut acc = autocov[k + 1];
            for j in 0..k {
                acc -= phi[j] * autocov[k - j];
            }
            let kappa = acc / err;
            let prev = phi.clone();
            phi[k] = kappa;
            for j in 0..k {
                phi[j] = prev[j] - kappa * prev[k - 1 - j];
            }
            err *= 1.0 - kappa * kappa;
            if err.abs() < EPSILON {
                break;
            }
        }

        phi
    }

    /// 残差自相关估计 MA 系数（限制在 ±0.99 内保证可逆）
    fn estimate_ma(&self, residuals: &[f64]) -> Vec<f64> {
        let mut theta = vec![0.0; self.q];
        if self.q == 0 || residuals.is_empty() {
            return theta;
        }

        let n = residuals.len() as f64;
        let mean = residuals.iter().sum::<f64>() / n;
        let centered: Vec<f64> = residuals.iter().map(|r| r - mean).collect();
        let var = centered.iter().map(|x| x * x).sum::<f64>() / n;
        if var.abs() < EPSILON {
            return theta;
        }

        for (k, coeff) in theta.iter_mut().enumerate() {
            let lag = k + 1;
            let cov = centered
                .iter()
                .skip(lag)
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n;
            *coeff = (cov / var).clamp(-0.99, 0.99);
        }

        theta
    }
}

impl ForecastOracle for ArimaOracle {
    fn name(&self) -> &str {
        "ARIMA"
    }

    fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }

    fn fit_and_forecast(&self, series: &[f64], horizon: usize) -> PlanningResult<Vec<f64>> {
        let required = self.min_observations();
        if series.len() < required {
            return Err(PlanningError::InsufficientData {
                required,
                actual: series.len(),
            });
        }
        if series.iter().any(|x| !x.is_finite()) {
            return Err(PlanningError::Forecast("序列包含 NaN 或无穷值".to_string()));
        }
        if horizon == 0 {
            return Ok(Vec::new());
        }

        // 1. 差分
        let (differenced, tails) = self.difference(series);
        let n = differenced.len();
        let mean = differenced.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = differenced.iter().map(|x| x - mean).collect();

        // 2. AR 系数与拟合残差
        let phi = self.estimate_ar(&centered);
        let mut residuals = vec![0.0; n];
        for i in self.p..n {
            let fitted: f64 = (0..self.p).map(|j| phi[j] * centered[i - j - 1]).sum();
            residuals[i] = centered[i] - fitted;
        }

        // 3. MA 系数
        let theta = self.estimate_ma(&residuals);

        // 4. 差分尺度上递推预测（未来残差取 0）
        let mut extended = centered;
        let mut extended_residuals = residuals;
        let mut forecasts = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let len = extended.len();
            let ar_part: f64 = (0..self.p).map(|j| phi[j] * extended[len - j - 1]).sum();
            let ma_part: f64 = (0..self.q)
                .map(|j| theta[j] * extended_residuals[len - j - 1])
                .sum();
            let next = ar_part + ma_part;
            extended.push(next);
            extended_residuals.push(0.0);
            forecasts.push(next + mean);
        }

        // 5. 还原
        let predictions = Self::integrate(forecasts, &tails);
        if predictions.iter().any(|x| !x.is_finite()) {
            return Err(PlanningError::Forecast("模型不收敛：预测值非有限数".to_string()));
        }
        Ok(predictions)
    }
}
