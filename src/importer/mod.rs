// ==========================================
// 需求预测与产能排产系统 - 导入层
// ==========================================
// 职责: 外部需求数据导入,生成逐日需求序列
// 支持: 映射 / 记录列表 / CSV（本地或 http(s)）/ Excel / JSON 载荷
// ==========================================

// 模块声明
pub mod demand_normalizer;
pub mod error;
pub mod field_parser;
pub mod file_parser;
pub mod http_reader;
pub mod tabular_reader_trait;

// 重导出核心类型
pub use demand_normalizer::DemandNormalizer;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileTabularReader};
pub use http_reader::{HttpTabularReader, SourceTabularReader};

// 重导出 Trait 接口
pub use tabular_reader_trait::{TabularData, TabularReader};
