// ==========================================
// 温室气体排放计算 - 配置读取 Trait
// ==========================================
// 职责: 定义计算核心所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{CatalogMode, DuplicatePolicy};
use std::collections::BTreeMap;
use std::error::Error;

// ==========================================
// CalculatorConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait CalculatorConfigReader: Send + Sync {
    /// 排放阈值 (kg CO₂-eq)
    ///
    /// # 默认值
    /// - 1000.0
    fn get_emission_threshold_kg(&self) -> Result<f64, Box<dyn Error>>;

    /// 密度表: 材料类别 → kg/m³
    ///
    /// # 默认值
    /// - 内置密度表
    fn get_density_map(&self) -> Result<BTreeMap<String, f64>, Box<dyn Error>>;

    /// 废弃物键后缀
    ///
    /// # 默认值
    /// - "_waste"
    fn get_waste_suffix(&self) -> Result<String, Box<dyn Error>>;

    fn get_catalog_mode(&self) -> Result<CatalogMode, Box<dyn Error>>;

    fn get_duplicate_policy(&self) -> Result<DuplicatePolicy, Box<dyn Error>>;

    /// 基线方案名
    ///
    /// # 默认值
    /// - "Current"
    fn get_baseline_name(&self) -> Result<String, Box<dyn Error>>;

    /// 单次计算最大输入行数
    ///
    /// # 默认值
    /// - 50
    fn get_max_input_rows(&self) -> Result<usize, Box<dyn Error>>;
}
