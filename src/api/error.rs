// ==========================================
// 需求预测与产能排产系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，映射为稳定的错误代码与可读消息
// ==========================================

use crate::artifact::ArtifactError;
use crate::config::error::ConfigError;
use crate::domain::error::PlanningError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因，不做静默兜底
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 规划错误（与 PlanningError 一一对应）
    // ==========================================
    #[error("输入格式错误: {0}")]
    InputFormat(String),

    #[error("目标周期格式错误: {0}")]
    TargetFormat(String),

    #[error("日期范围错误: {0}")]
    DateRange(String),

    #[error("数据不足: 至少需要 {required} 个点，实际 {actual} 个")]
    InsufficientData { required: usize, actual: usize },

    #[error("预测失败: {0}")]
    Forecast(String),

    // ==========================================
    // 外围错误
    // ==========================================
    #[error("产物写入失败: {0}")]
    Artifact(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 稳定的机器可读错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InputFormat(_) => "INPUT_FORMAT_ERROR",
            ApiError::TargetFormat(_) => "TARGET_FORMAT_ERROR",
            ApiError::DateRange(_) => "DATE_RANGE_ERROR",
            ApiError::InsufficientData { .. } => "INSUFFICIENT_DATA_ERROR",
            ApiError::Forecast(_) => "FORECAST_ERROR",
            ApiError::Artifact(_) => "ARTIFACT_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 PlanningError 转换
// ==========================================
impl From<PlanningError> for ApiError {
    fn from(err: PlanningError) -> Self {
        match err {
            PlanningError::InputFormat(msg) => ApiError::InputFormat(msg),
            PlanningError::TargetFormat(msg) => ApiError::TargetFormat(msg),
            PlanningError::DateRange(msg) => ApiError::DateRange(msg),
            PlanningError::InsufficientData { required, actual } => {
                ApiError::InsufficientData { required, actual }
            }
            PlanningError::Forecast(msg) => ApiError::Forecast(msg),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::from(PlanningError::from(err))
    }
}

// ==========================================
// 持久化 / 配置错误
// ==========================================
impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        ApiError::Artifact(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Artifact(format!("排产结果落库失败: {}", err))
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
