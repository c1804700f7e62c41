// ==========================================
// 温室气体排放计算 - 引擎层
// ==========================================
// 数据流单向: 原始因子表 → 因子库 → 明细行计算器 → 方案汇总器 → 调用方
// 红线: 引擎不格式化展示文本,所有失败以类型化结果返回
// ==========================================

pub mod calculator;
pub mod catalog;
pub mod density;
pub mod scenario;
pub mod threshold;
pub mod unit_converter;

// 重导出核心引擎
pub use calculator::{BatchCalculation, LineItemCalculator};
pub use catalog::{
    CatalogBuildOptions, CatalogBuildReport, CatalogSource, EmissionFactorCatalog, NotFound,
    ICE_SAMPLE_FACTORS,
};
pub use density::{DensityTable, DEFAULT_DENSITIES};
pub use scenario::{ScenarioAggregator, ScenarioError, SeriesPoint};
pub use threshold::{ThresholdEvaluator, DEFAULT_THRESHOLD_KG};
pub use unit_converter::UnitConverter;
