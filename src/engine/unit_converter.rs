// ==========================================
// 温室气体排放计算 - 单位换算器
// ==========================================
// 职责: (材料键, 声明单位, 数量) → kg 当量数量
// 规则:
// - 质量单位: 原样返回
// - 体积单位: 去废弃物后缀查密度,数量 × 密度;无密度 → no_density
// - 长度 / 运输功: 原样返回（因子库已按该单位表达）
// - 未知单位: unsupported_unit
// ==========================================

use crate::domain::emission_factor::{material_class, DEFAULT_WASTE_SUFFIX};
use crate::domain::line_item::UnresolvedReason;
use crate::domain::types::UnitKind;
use crate::engine::density::DensityTable;
use tracing::debug;

// ==========================================
// UnitConverter - 单位换算器
// ==========================================
// 无副作用: 构建后只读
#[derive(Debug, Clone)]
pub struct UnitConverter {
    densities: DensityTable,
    waste_suffix: String,
}

impl UnitConverter {
    pub fn new(densities: DensityTable, waste_suffix: &str) -> Self {
        Self {
            densities,
            waste_suffix: waste_suffix.to_string(),
        }
    }

    pub fn densities(&self) -> &DensityTable {
        &self.densities
    }

    pub fn waste_suffix(&self) -> &str {
        &self.waste_suffix
    }

    /// 将数量换算为 kg 当量
    ///
    /// # 参数
    /// - material_key: 标准化材料键（可带废弃物后缀）
    /// - declared_unit: 因子库声明单位
    /// - quantity: 按声明单位录入的数量
    ///
    /// # 返回
    /// - Ok(f64): kg 当量（长度/运输功单位为原值）
    /// - Err(UnresolvedReason): 无密度 / 不支持的单位 / 非法数量
    pub fn to_mass_kg(
        &self,
        material_key: &str,
        declared_unit: &str,
        quantity: f64,
    ) -> Result<f64, UnresolvedReason> {
        if !quantity.is_finite() {
            return Err(UnresolvedReason::InvalidQuantity);
        }

        let kind = UnitKind::parse(declared_unit).ok_or_else(|| {
            debug!(material = material_key, unit = declared_unit, "不支持的声明单位");
            UnresolvedReason::UnsupportedUnit
        })?;

        match kind {
            UnitKind::Mass | UnitKind::Length | UnitKind::TransportWork => Ok(quantity),
            UnitKind::Volume => {
                let class = material_class(material_key, &self.waste_suffix);
                match self.densities.get(&class) {
                    Some(density) => Ok(quantity * density),
                    None => {
                        debug!(material_class = %class, "未登记密度,无法 m³ → kg");
                        Err(UnresolvedReason::NoDensity)
                    }
                }
            }
        }
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(DensityTable::default(), DEFAULT_WASTE_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> UnitConverter {
        UnitConverter::new(
            DensityTable::from_pairs(vec![("concrete", 2400.0), ("pvc", 1380.0)]),
            DEFAULT_WASTE_SUFFIX,
        )
    }

    #[test]
    fn test_mass_is_identity() {
        let c = converter();
        for q in [0.0, 1.0, 12.5, 1_000_000.0] {
            assert_eq!(c.to_mass_kg("anything", "kg", q), Ok(q));
        }
    }

    #[test]
    fn test_volume_uses_density() {
        let c = converter();
        assert_eq!(c.to_mass_kg("concrete", "m3", 10.0), Ok(24_000.0));
        assert_eq!(c.to_mass_kg("concrete", "m3", 0.0), Ok(0.0));
    }

    #[test]
    fn test_waste_variant_shares_density() {
        let c = converter();
        assert_eq!(c.to_mass_kg("pvc_waste", "m3", 2.0), Ok(2760.0));
        assert_eq!(
            c.to_mass_kg("pvc", "m3", 2.0),
            c.to_mass_kg("pvc_waste", "m3", 2.0)
        );
    }

    #[test]
    fn test_volume_without_density() {
        let c = converter();
        assert_eq!(
            c.to_mass_kg("glass", "m3", 1.0),
            Err(UnresolvedReason::NoDensity)
        );
    }

    #[test]
    fn test_length_and_transport_pass_through() {
        let c = converter();
        assert_eq!(c.to_mass_kg("network cable", "m", 30.0), Ok(30.0));
        assert_eq!(c.to_mass_kg("truck transport", "tkm", 120.0), Ok(120.0));
    }

    #[test]
    fn test_unknown_unit_is_unsupported() {
        let c = converter();
        assert_eq!(
            c.to_mass_kg("electricity", "kWh", 5.0),
            Err(UnresolvedReason::UnsupportedUnit)
        );
    }

    #[test]
    fn test_non_finite_quantity() {
        let c = converter();
        assert_eq!(
            c.to_mass_kg("concrete", "kg", f64::NAN),
            Err(UnresolvedReason::InvalidQuantity)
        );
        assert_eq!(
            c.to_mass_kg("concrete", "m3", f64::INFINITY),
            Err(UnresolvedReason::InvalidQuantity)
        );
    }
}
