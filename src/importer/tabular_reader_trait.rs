// ==========================================
// 需求预测与产能排产系统 - 表格读取 Trait
// ==========================================
// 职责: 定义表格数据源的读取接口（不包含实现）
// 实现者: FileTabularReader（本地 CSV / Excel）
//         HttpTabularReader（http(s) CSV）
//         SourceTabularReader（按定位符分派，默认）
// ==========================================

use crate::importer::error::ImportResult;

// ==========================================
// TabularData - 带列名的行数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularData {
    /// 按谓词查找第一个匹配列的下标
    pub fn find_column<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers.iter().position(|h| predicate(h))
    }

    /// 取某行某列的单元格（越界返回空串）
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

// ==========================================
// TabularReader Trait
// ==========================================
pub trait TabularReader: Send + Sync {
    /// 读取定位符指向的表格
    ///
    /// # 参数
    /// - locator: 文件路径或 URL
    ///
    /// # 返回
    /// - Ok(TabularData): 表头 + 数据行（已跳过全空行）
    /// - Err: 定位符不支持 / 文件不存在 / 解析失败
    fn read(&self, locator: &str) -> ImportResult<TabularData>;
}
