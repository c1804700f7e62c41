// ==========================================
// 温室气体排放计算 - 排放计算 API
// ==========================================
// 职责: 会话级门面,供界面调用方使用
// 1. 因子库加载（工作簿 / 内置样例）
// 2. 输入校验 + 批量计算 + 阈值判定
// 3. 方案维护（当前设计 / 备选方案 / what-if）与对比
// 红线: 不返回展示文案,只返回结构化结果
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{InputRow, InputValidator};
use crate::config::calculator_config::CalculatorConfig;
use crate::config::config_manager::ConfigManager;
use crate::domain::scenario::{ComparisonOutcome, ScenarioTotal};
use crate::domain::types::ThresholdStatus;
use crate::engine::calculator::{BatchCalculation, LineItemCalculator};
use crate::engine::catalog::EmissionFactorCatalog;
use crate::engine::scenario::{ScenarioAggregator, SeriesPoint};
use crate::engine::threshold::ThresholdEvaluator;
use crate::engine::unit_converter::UnitConverter;
use crate::importer::catalog_importer::CatalogImporter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// CalculationReport - 计算报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    /// 对应方案名（临时计算为 None）
    pub scenario: Option<String>,
    pub batch: BatchCalculation,
    pub threshold_kg: f64,
    /// 合计无效时为 None
    pub threshold_status: Option<ThresholdStatus>,
}

impl CalculationReport {
    pub fn total(&self) -> &ScenarioTotal {
        &self.batch.total
    }
}

// ==========================================
// EmissionApi - 排放计算 API
// ==========================================
pub struct EmissionApi {
    config: CalculatorConfig,
    validator: InputValidator,
    threshold: ThresholdEvaluator,
    aggregator: ScenarioAggregator,
}

impl EmissionApi {
    /// 以给定因子库与配置创建会话
    ///
    /// 换算器使用因子库建库时的废弃物后缀,与配置不一致时告警
    pub fn new(catalog: Arc<EmissionFactorCatalog>, config: CalculatorConfig) -> Self {
        if catalog.waste_suffix() != config.waste_suffix {
            warn!(
                catalog_suffix = catalog.waste_suffix(),
                config_suffix = %config.waste_suffix,
                "因子库废弃物后缀与配置不一致,以因子库为准"
            );
        }
        let converter = UnitConverter::new(config.density_table(), catalog.waste_suffix());
        let calculator = Arc::new(LineItemCalculator::new(catalog, converter));
        Self {
            validator: InputValidator::new(config.max_input_rows),
            threshold: config.threshold(),
            aggregator: ScenarioAggregator::with_baseline(calculator, &config.baseline_name),
            config,
        }
    }

    /// 从 config_kv 读取配置创建会话
    pub fn from_config_manager(
        catalog: Arc<EmissionFactorCatalog>,
        config_manager: &ConfigManager,
    ) -> ApiResult<Self> {
        let config = config_manager.load_calculator_config()?;
        Ok(Self::new(catalog, config))
    }

    /// 按配置导入因子库工作簿
    #[instrument(skip(config))]
    pub fn load_catalog(
        path: &Path,
        config: &CalculatorConfig,
    ) -> ApiResult<Arc<EmissionFactorCatalog>> {
        let importer = CatalogImporter::new(config.build_options());
        let catalog = importer.import_workbook(path)?;
        info!(
            indexed = catalog.len(),
            dropped = catalog.report().dropped_total(),
            "因子库已加载"
        );
        Ok(Arc::new(catalog))
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EmissionFactorCatalog {
        self.aggregator.calculator().catalog()
    }

    /// 下拉选项: 材料名录 + 废弃物变体
    pub fn allowed_materials(&self) -> Vec<String> {
        self.catalog().allowed_materials().to_vec()
    }

    pub fn scenario_names(&self) -> Vec<String> {
        self.aggregator.names().into_iter().map(String::from).collect()
    }

    // ==========================================
    // 计算
    // ==========================================

    /// 临时计算（不写入任何方案）
    pub fn calculate(&self, rows: &[InputRow]) -> ApiResult<CalculationReport> {
        self.validator.validate_rows(rows)?;
        let batch = self
            .aggregator
            .calculator()
            .compute_batch(rows.iter().map(|r| (r.material.as_str(), r.quantity)));
        Ok(self.report(None, batch))
    }

    /// 仅返回有效合计,合计无效时返回 CalculationFailed
    pub fn calculate_total(&self, rows: &[InputRow]) -> ApiResult<f64> {
        let report = self.calculate(rows)?;
        match report.batch.total {
            ScenarioTotal::Valid { total_kg_co2e } => Ok(total_kg_co2e),
            ScenarioTotal::Invalid { ref failures } => Err(ApiError::calculation_failed(failures)),
        }
    }

    /// 方案计算报告
    pub fn scenario_report(&self, scenario: &str) -> ApiResult<CalculationReport> {
        let name = self.validator.validate_scenario_name(scenario)?;
        let batch = self.aggregator.breakdown(&name)?;
        Ok(self.report(Some(name), batch))
    }

    fn report(&self, scenario: Option<String>, batch: BatchCalculation) -> CalculationReport {
        CalculationReport {
            scenario,
            threshold_kg: self.threshold.threshold_kg(),
            threshold_status: self.threshold.evaluate_total(&batch.total),
            batch,
        }
    }

    // ==========================================
    // 方案维护
    // ==========================================

    /// 以输入行整体替换当前设计（基线）
    pub fn set_current_design(&mut self, rows: &[InputRow]) -> ApiResult<CalculationReport> {
        let baseline = self.aggregator.baseline_name().to_string();
        self.save_design(&baseline, rows)
    }

    /// 保存备选方案（同名覆盖）
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn save_design(&mut self, name: &str, rows: &[InputRow]) -> ApiResult<CalculationReport> {
        let name = self.validator.validate_scenario_name(name)?;
        self.validator.validate_rows(rows)?;

        self.aggregator.set_items(
            &name,
            rows.iter().map(|r| (r.material.as_str(), r.quantity)),
        )?;
        self.scenario_report(&name)
    }

    /// 向方案累加一行（方案不存在则创建）
    ///
    /// # 返回
    /// - Ok(false): 材料为空白,未累加
    pub fn add_item(&mut self, scenario: &str, material: &str, quantity: f64) -> ApiResult<bool> {
        let name = self.validator.validate_scenario_name(scenario)?;
        self.validator.validate_quantity(material, quantity)?;
        Ok(self.aggregator.add(&name, material, quantity)?)
    }

    /// what-if: 复制 base,替换调整项后存为 target,并与 base 对比
    pub fn what_if(
        &mut self,
        base: &str,
        target: &str,
        adjustments: &[InputRow],
    ) -> ApiResult<ComparisonOutcome> {
        let base = self.validator.validate_scenario_name(base)?;
        let target = self.validator.validate_scenario_name(target)?;
        self.validator.validate_rows(adjustments)?;

        Ok(self.aggregator.what_if(
            &base,
            &target,
            adjustments.iter().map(|r| (r.material.as_str(), r.quantity)),
        )?)
    }

    pub fn remove_design(&mut self, name: &str) -> ApiResult<()> {
        self.aggregator.remove(name)?;
        Ok(())
    }

    /// 清空全部方案
    pub fn reset(&mut self) {
        self.aggregator.reset();
    }

    // ==========================================
    // 对比
    // ==========================================

    pub fn compare(&self, baseline: &str, candidate: &str) -> ApiResult<ComparisonOutcome> {
        Ok(self.aggregator.compare(baseline, candidate)?)
    }

    pub fn compare_to_current(&self, candidate: &str) -> ApiResult<ComparisonOutcome> {
        Ok(self.aggregator.compare_to_baseline(candidate)?)
    }

    /// 对比图数据
    pub fn comparison_series(&self) -> Vec<SeriesPoint> {
        self.aggregator.comparison_series()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> EmissionApi {
        EmissionApi::new(
            Arc::new(EmissionFactorCatalog::ice_sample()),
            CalculatorConfig::default(),
        )
    }

    #[test]
    fn test_calculate_threshold_status() {
        let api = api();
        let report = api.calculate(&[InputRow::new("Copper", 10.0)]).unwrap();
        assert!(report.total().is_valid());
        assert_eq!(report.threshold_status, Some(ThresholdStatus::Below));
    }

    #[test]
    fn test_calculate_total_fails_on_unknown_material() {
        let api = api();
        let result = api.calculate_total(&[InputRow::new("Unobtainium", 1.0)]);
        match result {
            Err(ApiError::CalculationFailed { missing_factor, .. }) => {
                assert_eq!(missing_factor, vec!["unobtainium".to_string()]);
            }
            other => panic!("expected CalculationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_save_design_rejects_blank_name() {
        let mut api = api();
        let result = api.save_design("  ", &[InputRow::new("Copper", 1.0)]);
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(api.scenario_names(), vec!["Current"]);
    }

    #[test]
    fn test_remove_current_is_rejected() {
        let mut api = api();
        assert!(matches!(
            api.remove_design("Current"),
            Err(ApiError::BusinessRuleViolation(_))
        ));
    }
    #[test]
    fn test_what_if_onto_base_is_rejected() {
        let mut api = api();
        api.set_current_design(&[InputRow::new("Copper", 10.0)]).unwrap();

        let result = api.what_if("Current", "Current", &[InputRow::new("Copper", 2.0)]);
        assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));
        let report = api.scenario_report("Current").unwrap();
        assert_eq!(report.batch.line_for("copper").unwrap().quantity, 10.0);
    }

    #[test]
    fn test_converter_follows_catalog_waste_suffix() {
        use crate::domain::emission_factor::RawFactorRow;
        use crate::engine::catalog::{CatalogBuildOptions, CatalogSource};

        let source = CatalogSource {
            waste_rows: vec![RawFactorRow::new("Reinforced concrete", "m3", 0.01)],
            ..CatalogSource::default()
        };
        let options = CatalogBuildOptions {
            waste_suffix: "_eol".to_string(),
            ..CatalogBuildOptions::default()
        };
        let catalog = Arc::new(EmissionFactorCatalog::build(source, &options));

        // 配置仍为默认后缀 "_waste"
        let api = EmissionApi::new(catalog, CalculatorConfig::default());
        let report = api
            .calculate(&[InputRow::new("Reinforced concrete_eol", 2.0)])
            .unwrap();
        let value = report.total().value().unwrap();
        assert!((value - 2.0 * 2400.0 * 0.01).abs() < 1e-9);
    }
}
