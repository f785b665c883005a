// ==========================================
// 需求预测与产能排产系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 导入错误对外统一折算为 PlanningError::InputFormat
// ==========================================

use crate::domain::error::PlanningError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("没有可处理该定位符的读取器: {0}")]
    UnsupportedLocator(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 列映射错误 =====
    #[error("缺少{kind}列 (现有列: {headers})")]
    MissingColumn { kind: String, headers: String },

    // ===== 数据转换错误 =====
    #[error("日期格式错误 (行 {row}, 字段 {field}): 无法解析 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 远程数据源错误 =====
    #[error("远程数据源请求失败 ({url}): {message}")]
    RemoteFetchError { url: String, message: String },

    // ===== 载荷错误 =====
    #[error("载荷解码失败: {0}")]
    PayloadDecodeError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 导入层错误一律视为输入格式问题
impl From<ImportError> for PlanningError {
    fn from(err: ImportError) -> Self {
        PlanningError::InputFormat(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
