// ==========================================
// 需求预测与产能排产系统 - 规划错误类型
// ==========================================
// 工具: thiserror 派生宏
// 原则: 快速失败，不返回部分结果
// ==========================================

use thiserror::Error;

/// 规划核心错误类型（预测与排产共用）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// 输入形态不支持 / 缺少必需字段 / 日期或数值无法解析
    #[error("输入格式错误: {0}")]
    InputFormat(String),

    /// 目标周期字符串不匹配 YYYY / YYYY-MM / YYYY-MM-DD，或在形态内解析失败
    #[error("目标周期格式错误: {0}")]
    TargetFormat(String),

    /// 结束日期早于开始日期 / 历史查询日期不在数据中
    #[error("日期范围错误: {0}")]
    DateRange(String),

    /// 序列长度不足以拟合模型
    #[error("数据不足: 至少需要 {required} 个点，实际 {actual} 个")]
    InsufficientData { required: usize, actual: usize },

    /// 模型拟合失败 / 不收敛 / 超时取消
    #[error("预测失败: {0}")]
    Forecast(String),
}

impl PlanningError {
    /// 稳定的错误代码（供响应与日志使用）
    pub fn code(&self) -> &'static str {
        match self {
            PlanningError::InputFormat(_) => "INPUT_FORMAT_ERROR",
            PlanningError::TargetFormat(_) => "TARGET_FORMAT_ERROR",
            PlanningError::DateRange(_) => "DATE_RANGE_ERROR",
            PlanningError::InsufficientData { .. } => "INSUFFICIENT_DATA_ERROR",
            PlanningError::Forecast(_) => "FORECAST_ERROR",
        }
    }
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
