// ==========================================
// 温室气体排放计算 - 明细行计算器
// ==========================================
// 职责: 因子库查询 + 单位换算 → 单行排放
// 输入: (材料, 数量) 列表
// 输出: LineItem 列表 + 汇总失败清单 + 合计
// 红线: 批量计算收集全部 缺因子/无法换算 诊断后再判定失败,不在首个坏行中止
// ==========================================

use crate::domain::emission_factor::normalize_material_key;
use crate::domain::line_item::{LineItem, LineStatus, UnresolvedReason};
use crate::domain::scenario::{ScenarioTotal, TotalFailures, UnconvertibleMaterial};
use crate::engine::catalog::EmissionFactorCatalog;
use crate::engine::unit_converter::UnitConverter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// BatchCalculation - 批量计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCalculation {
    /// 逐行结果（含空行跳过项,保持输入顺序）
    pub lines: Vec<LineItem>,
    pub failures: TotalFailures,
    pub total: ScenarioTotal,
}

impl BatchCalculation {
    /// 从逐行结果汇总
    pub fn from_lines(lines: Vec<LineItem>) -> Self {
        let failures = collect_failures(&lines);
        let total = if failures.is_empty() {
            ScenarioTotal::Valid {
                total_kg_co2e: lines.iter().filter_map(|l| l.emission).sum(),
            }
        } else {
            ScenarioTotal::Invalid {
                failures: failures.clone(),
            }
        };

        Self {
            lines,
            failures,
            total,
        }
    }

    /// 已解析行（失败时仍可查看有效行的排放）
    pub fn resolved_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter().filter(|l| l.is_resolved())
    }

    /// 按材料查找首个非空行
    pub fn line_for(&self, material: &str) -> Option<&LineItem> {
        let key = normalize_material_key(material);
        self.lines
            .iter()
            .find(|l| !l.is_skipped() && l.material == key)
    }
}

/// 汇总失败清单（去重,保持出现顺序）
fn collect_failures(lines: &[LineItem]) -> TotalFailures {
    let mut failures = TotalFailures::default();
    for line in lines {
        match line.status {
            LineStatus::MissingFactor => {
                if !failures.missing_factor.contains(&line.material) {
                    failures.missing_factor.push(line.material.clone());
                }
            }
            LineStatus::Unconvertible(reason) => {
                if !failures
                    .unconvertible
                    .iter()
                    .any(|u| u.material == line.material)
                {
                    failures.unconvertible.push(UnconvertibleMaterial {
                        material: line.material.clone(),
                        reason,
                    });
                }
            }
            LineStatus::Ok | LineStatus::Skipped => {}
        }
    }
    failures
}

// ==========================================
// LineItemCalculator - 明细行计算器
// ==========================================
#[derive(Debug, Clone)]
pub struct LineItemCalculator {
    catalog: Arc<EmissionFactorCatalog>,
    converter: UnitConverter,
}

impl LineItemCalculator {
    pub fn new(catalog: Arc<EmissionFactorCatalog>, converter: UnitConverter) -> Self {
        Self { catalog, converter }
    }

    pub fn catalog(&self) -> &EmissionFactorCatalog {
        &self.catalog
    }

    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    /// 计算单行
    ///
    /// 1. 材料标准化,空白 → Skipped
    /// 2. 因子库未命中 → MissingFactor
    /// 3. 单位换算失败 → Unconvertible(原因)
    /// 4. emission = quantity_mass_kg × factor
    pub fn compute(&self, material: &str, quantity: f64) -> LineItem {
        let key = normalize_material_key(material);
        if key.is_empty() {
            return LineItem::skipped(quantity);
        }

        let entry = match self.catalog.lookup(&key) {
            Ok(entry) => entry,
            Err(_) => {
                debug!(material = %key, "未匹配到排放因子");
                return LineItem::missing_factor(key, quantity);
            }
        };

        let converted = if self.catalog.mode().requires_conversion() {
            self.converter.to_mass_kg(&key, &entry.unit, quantity)
        } else if quantity.is_finite() {
            Ok(quantity)
        } else {
            Err(UnresolvedReason::InvalidQuantity)
        };

        match converted {
            Ok(quantity_mass_kg) => LineItem::resolved(
                key,
                quantity,
                entry.unit.clone(),
                quantity_mass_kg,
                entry.factor,
            ),
            Err(reason) => {
                debug!(material = %key, unit = %entry.unit, reason = %reason, "数量无法换算为 kg");
                LineItem::unconvertible(key, quantity, entry.unit.clone(), entry.factor, reason)
            }
        }
    }

    /// 批量计算（收集全部诊断）
    #[instrument(skip(self, rows))]
    pub fn compute_batch<I, S>(&self, rows: I) -> BatchCalculation
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let lines: Vec<LineItem> = rows
            .into_iter()
            .map(|(material, quantity)| self.compute(material.as_ref(), quantity))
            .collect();

        let batch = BatchCalculation::from_lines(lines);
        if !batch.failures.is_empty() {
            warn!(
                missing_factor = ?batch.failures.missing_factor,
                unconvertible = batch.failures.unconvertible.len(),
                "批量计算存在未解析行,合计无效"
            );
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::emission_factor::{RawFactorRow, DEFAULT_WASTE_SUFFIX};
    use crate::domain::types::CatalogMode;
    use crate::engine::catalog::{CatalogBuildOptions, CatalogSource};
    use crate::engine::density::DensityTable;

    fn calculator(mode: CatalogMode) -> LineItemCalculator {
        let source = CatalogSource {
            input_rows: vec![
                RawFactorRow::new("Concrete", "m3", 0.122),
                RawFactorRow::new("Steel", "kg", 1.86),
                RawFactorRow::new("Glass", "m3", 1.2),
                RawFactorRow::new("Electricity", "kWh", 0.4),
            ],
            waste_rows: vec![RawFactorRow::new("Concrete", "m3", 0.01)],
            material_names: Vec::new(),
        };
        let options = CatalogBuildOptions {
            mode,
            ..CatalogBuildOptions::default()
        };
        let catalog = Arc::new(EmissionFactorCatalog::build(source, &options));
        let converter = UnitConverter::new(
            DensityTable::from_pairs(vec![("concrete", 2400.0)]),
            DEFAULT_WASTE_SUFFIX,
        );
        LineItemCalculator::new(catalog, converter)
    }

    #[test]
    fn test_compute_volume_line() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        let line = calc.compute(" Concrete ", 10.0);
        assert_eq!(line.status, LineStatus::Ok);
        assert_eq!(line.material, "concrete");
        assert_eq!(line.quantity_mass_kg, Some(24_000.0));
        let emission = line.emission.unwrap();
        assert!((emission - 2928.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_waste_line_uses_base_density() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        let line = calc.compute("concrete_waste", 1.0);
        assert_eq!(line.quantity_mass_kg, Some(2400.0));
        assert_eq!(line.emission_factor, Some(0.01));
    }

    #[test]
    fn test_compute_blank_is_skipped() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        for blank in ["", "   ", "\t"] {
            let line = calc.compute(blank, 99.0);
            assert!(line.is_skipped());
            assert_eq!(line.emission, None);
        }
    }

    #[test]
    fn test_compute_failure_kinds() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        assert_eq!(calc.compute("wood", 1.0).status, LineStatus::MissingFactor);
        assert_eq!(
            calc.compute("glass", 1.0).status,
            LineStatus::Unconvertible(UnresolvedReason::NoDensity)
        );
        assert_eq!(
            calc.compute("electricity", 1.0).status,
            LineStatus::Unconvertible(UnresolvedReason::UnsupportedUnit)
        );
    }

    #[test]
    fn test_per_kilogram_mode_skips_conversion() {
        let calc = calculator(CatalogMode::PerKilogram);
        let line = calc.compute("glass", 3.0);
        assert_eq!(line.status, LineStatus::Ok);
        assert_eq!(line.quantity_mass_kg, Some(3.0));
        assert_eq!(line.emission, Some(3.0 * 1.2));
    }

    #[test]
    fn test_batch_collects_all_failures() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        let batch = calc.compute_batch(vec![
            ("steel", 2.0),
            ("wood", 1.0),
            ("", 0.0),
            ("glass", 1.0),
            ("Wood", 4.0),
            ("electricity", 2.0),
        ]);

        assert_eq!(batch.lines.len(), 6);
        assert_eq!(batch.failures.missing_factor, vec!["wood".to_string()]);
        assert_eq!(batch.failures.unconvertible.len(), 2);
        assert_eq!(batch.failures.unconvertible[0].material, "glass");
        assert_eq!(
            batch.failures.unconvertible[1].reason,
            UnresolvedReason::UnsupportedUnit
        );
        assert!(!batch.total.is_valid());
        // 有效行仍可查看
        assert_eq!(batch.line_for("steel").unwrap().emission, Some(2.0 * 1.86));
        assert_eq!(batch.resolved_lines().count(), 1);
    }

    #[test]
    fn test_batch_valid_total() {
        let calc = calculator(CatalogMode::PerDeclaredUnit);
        let batch = calc.compute_batch(vec![("steel", 2.0), ("", 5.0), ("concrete", 1.0)]);
        assert!(batch.failures.is_empty());
        let total = batch.total.value().unwrap();
        assert!((total - (2.0 * 1.86 + 2400.0 * 0.122)).abs() < 1e-9);
    }
}
