// ==========================================
// 需求预测与产能排产系统 - 字段解析
// ==========================================
// 职责: 日期 / 需求数值的宽松解析
// 说明: 时间部分丢弃，只保留自然日
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 可接受的纯日期格式
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 可接受的日期时间格式
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// 解析日期（多格式尝试，返回所在自然日）
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339（带时区），取其本地日期
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// 解析日期，失败时带行号与字段名
pub fn parse_date_field(value: &str, row: usize, field: &str) -> ImportResult<NaiveDate> {
    parse_flexible_date(value).ok_or_else(|| ImportError::DateFormatError {
        row,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// 解析需求数值
///
/// # 返回
/// - Ok(None): 空单元格（不计入）
/// - Ok(Some(v)): 数值
/// - Err: 非数值内容
pub fn parse_demand_field(value: &str, row: usize, field: &str) -> ImportResult<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // 兼容千分位分隔符
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let parsed = cleaned
        .parse::<f64>()
        .map_err(|_| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("无法解析为数值: {}", value),
        })?;

    // f64 解析接受 nan / inf，需求量必须是有限数
    if !parsed.is_finite() {
        return Err(ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("需求量必须为有限数值: {}", value),
        });
    }
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_flexible_date("2025-01-20"), Some(d(2025, 1, 20)));
        assert_eq!(parse_flexible_date("2025/01/20"), Some(d(2025, 1, 20)));
        assert_eq!(parse_flexible_date("20250120"), Some(d(2025, 1, 20)));
        assert_eq!(parse_flexible_date("2025-01-20 13:45:00"), Some(d(2025, 1, 20)));
        assert_eq!(parse_flexible_date("2025-01-20T08:00:00"), Some(d(2025, 1, 20)));
        assert_eq!(
            parse_flexible_date("2025-01-20T08:00:00+08:00"),
            Some(d(2025, 1, 20))
        );
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_flexible_date("not-a-date"), None);
        assert_eq!(parse_flexible_date(""), None);
        assert!(matches!(
            parse_date_field("2025-13-01", 3, "date"),
            Err(ImportError::DateFormatError { row: 3, .. })
        ));
    }

    #[test]
    fn test_parse_demand_values() {
        assert_eq!(parse_demand_field(" 12.5 ", 1, "demand").unwrap(), Some(12.5));
        assert_eq!(parse_demand_field("1,200", 1, "demand").unwrap(), Some(1200.0));
        assert_eq!(parse_demand_field("-3", 1, "demand").unwrap(), Some(-3.0));
        assert_eq!(parse_demand_field("", 1, "demand").unwrap(), None);
        assert!(parse_demand_field("abc", 1, "demand").is_err());
    }

    #[test]
    fn test_parse_demand_rejects_non_finite() {
        for raw in ["nan", "NaN", "inf", "-inf", "infinity"] {
            assert!(
                matches!(
                    parse_demand_field(raw, 4, "demand"),
                    Err(ImportError::TypeConversionError { row: 4, .. })
                ),
                "{} 应被拒绝",
                raw
            );
        }
    }
}
