// ==========================================
// 需求预测与产能排产系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV（.csv 及其他扩展名）
// 说明: 仅做文件 → 表格的转换，不做列匹配与类型转换
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::tabular_reader_trait::{TabularData, TabularReader};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    pub fn parse(&self, path: &Path) -> ImportResult<TabularData> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// 从任意字节流解析 CSV（本地文件与 HTTP 响应体共用）
    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<TabularData> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(csv::Trim::All)
            .from_reader(source);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // 跳过完全空白的行
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(TabularData { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    pub fn parse(&self, path: &Path) -> ImportResult<TabularData> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let row: Vec<String> = data_row.iter().map(cell_to_string).collect();

            // 跳过完全空白的行
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(TabularData { headers, rows })
    }
}

/// 单元格转字符串；日期单元格转为 YYYY-MM-DD
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Excel 序列日期 → 自然日（1900 日期系统，基准 1899-12-30）
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

// ==========================================
// 本地文件表格读取器（根据扩展名自动选择）
// ==========================================
// Excel 扩展名走 calamine，其余一律按 CSV 解析
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTabularReader;

impl TabularReader for FileTabularReader {
    fn read(&self, locator: &str) -> ImportResult<TabularData> {
        if is_remote_locator(locator) {
            return Err(ImportError::UnsupportedLocator(locator.to_string()));
        }

        let path = Path::new(locator.trim());
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" => ExcelParser.parse(path),
            _ => CsvParser.parse(path),
        }
    }
}

/// http(s) 定位符判定
pub fn is_remote_locator(locator: &str) -> bool {
    let lower = locator.trim().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
