// ==========================================
// 温室气体排放计算 - 导入层
// ==========================================
// 职责: 外部排放因子数据导入,生成因子库
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use catalog_importer::{CatalogImporter, WorkbookSheets};
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    CatalogColumnLayout, FactorFieldMapper, FACTOR_COLUMN_PER_KG, FACTOR_COLUMN_PER_UNIT,
};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
