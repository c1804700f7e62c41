// ==========================================
// 温室气体排放计算 - 计算配置快照
// ==========================================
// 职责: 计算核心所需全部配置的内存快照
// 来源: ConfigManager（config_kv）或 Default（无数据库时）
// ==========================================

use crate::config::config_reader_trait::CalculatorConfigReader;
use crate::domain::emission_factor::DEFAULT_WASTE_SUFFIX;
use crate::domain::scenario::BASELINE_SCENARIO;
use crate::domain::types::{CatalogMode, DuplicatePolicy};
use crate::engine::catalog::CatalogBuildOptions;
use crate::engine::density::{DensityTable, DEFAULT_DENSITIES};
use crate::engine::threshold::{ThresholdEvaluator, DEFAULT_THRESHOLD_KG};
use crate::engine::unit_converter::UnitConverter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

/// 单次计算允许的最大输入行数
pub const DEFAULT_MAX_INPUT_ROWS: usize = 50;

// ==========================================
// CalculatorConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub emission_threshold_kg: f64,
    /// 材料类别 → 密度 (kg/m³)
    pub densities: BTreeMap<String, f64>,
    pub waste_suffix: String,
    pub catalog_mode: CatalogMode,
    pub duplicate_policy: DuplicatePolicy,
    pub baseline_name: String,
    pub max_input_rows: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            emission_threshold_kg: DEFAULT_THRESHOLD_KG,
            densities: DEFAULT_DENSITIES
                .iter()
                .map(|(class, density)| (class.to_string(), *density))
                .collect(),
            waste_suffix: DEFAULT_WASTE_SUFFIX.to_string(),
            catalog_mode: CatalogMode::default(),
            duplicate_policy: DuplicatePolicy::default(),
            baseline_name: BASELINE_SCENARIO.to_string(),
            max_input_rows: DEFAULT_MAX_INPUT_ROWS,
        }
    }
}

impl CalculatorConfig {
    /// 通过配置读取接口加载完整快照
    pub fn from_reader<R: CalculatorConfigReader + ?Sized>(
        reader: &R,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            emission_threshold_kg: reader.get_emission_threshold_kg()?,
            densities: reader.get_density_map()?,
            waste_suffix: reader.get_waste_suffix()?,
            catalog_mode: reader.get_catalog_mode()?,
            duplicate_policy: reader.get_duplicate_policy()?,
            baseline_name: reader.get_baseline_name()?,
            max_input_rows: reader.get_max_input_rows()?,
        })
    }

    pub fn build_options(&self) -> CatalogBuildOptions {
        CatalogBuildOptions {
            mode: self.catalog_mode,
            policy: self.duplicate_policy,
            waste_suffix: self.waste_suffix.clone(),
        }
    }

    /// 密度表（无效条目在构建时跳过）
    pub fn density_table(&self) -> DensityTable {
        DensityTable::from_pairs(self.densities.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(self.density_table(), &self.waste_suffix)
    }

    pub fn threshold(&self) -> ThresholdEvaluator {
        ThresholdEvaluator::new(self.emission_threshold_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CalculatorConfig::default();
        assert_eq!(config.emission_threshold_kg, 1000.0);
        assert_eq!(config.waste_suffix, "_waste");
        assert_eq!(config.baseline_name, "Current");
        assert_eq!(config.max_input_rows, 50);
        assert_eq!(config.densities.get("reinforced concrete"), Some(&2400.0));
        assert_eq!(config.build_options(), CatalogBuildOptions::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CalculatorConfig =
            serde_json::from_str(r#"{"catalog_mode":"PER_KILOGRAM","max_input_rows":10}"#)
                .unwrap();
        assert_eq!(config.catalog_mode, CatalogMode::PerKilogram);
        assert_eq!(config.max_input_rows, 10);
        assert_eq!(config.waste_suffix, "_waste");
    }

    #[test]
    fn test_density_table_skips_invalid() {
        let mut config = CalculatorConfig::default();
        config.densities.clear();
        config.densities.insert("Glass".to_string(), 2500.0);
        config.densities.insert("foam".to_string(), -1.0);

        let table = config.density_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("glass"), Some(2500.0));
        assert_eq!(config.converter().waste_suffix(), "_waste");
    }
}
