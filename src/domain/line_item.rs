// ==========================================
// 温室气体排放计算 - 明细行领域模型
// ==========================================
// 红线: emission 仅在 数量换算 与 因子 均已解析时存在,失败行绝不按 0 计
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 换算失败原因 (Unresolved Reason)
// ==========================================
// 补救方式不同: no_density → 补密度; unsupported_unit → 修正因子库单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    NoDensity,
    UnsupportedUnit,
    InvalidQuantity,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoDensity => write!(f, "no_density"),
            UnresolvedReason::UnsupportedUnit => write!(f, "unsupported_unit"),
            UnresolvedReason::InvalidQuantity => write!(f, "invalid_quantity"),
        }
    }
}

// ==========================================
// 明细行状态 (Line Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LineStatus {
    Ok,
    /// 空白材料行（固定行数输入表中的空行）,不计入失败
    Skipped,
    MissingFactor,
    Unconvertible(UnresolvedReason),
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineStatus::Ok => write!(f, "ok"),
            LineStatus::Skipped => write!(f, "skipped"),
            LineStatus::MissingFactor => write!(f, "missing_factor"),
            LineStatus::Unconvertible(reason) => write!(f, "unconvertible({})", reason),
        }
    }
}

// ==========================================
// LineItem - 单行计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 标准化后的材料键
    pub material: String,
    /// 调用方录入的数量（按声明单位）
    pub quantity: f64,
    /// 因子库声明单位（未命中因子库时为 None）
    pub unit: Option<String>,
    pub quantity_mass_kg: Option<f64>,
    pub emission_factor: Option<f64>,
    pub emission: Option<f64>,
    pub status: LineStatus,
}

impl LineItem {
    pub fn skipped(quantity: f64) -> Self {
        Self {
            material: String::new(),
            quantity,
            unit: None,
            quantity_mass_kg: None,
            emission_factor: None,
            emission: None,
            status: LineStatus::Skipped,
        }
    }

    pub fn missing_factor(material: String, quantity: f64) -> Self {
        Self {
            material,
            quantity,
            unit: None,
            quantity_mass_kg: None,
            emission_factor: None,
            emission: None,
            status: LineStatus::MissingFactor,
        }
    }

    pub fn unconvertible(
        material: String,
        quantity: f64,
        unit: String,
        emission_factor: f64,
        reason: UnresolvedReason,
    ) -> Self {
        Self {
            material,
            quantity,
            unit: Some(unit),
            quantity_mass_kg: None,
            emission_factor: Some(emission_factor),
            emission: None,
            status: LineStatus::Unconvertible(reason),
        }
    }

    pub fn resolved(
        material: String,
        quantity: f64,
        unit: String,
        quantity_mass_kg: f64,
        emission_factor: f64,
    ) -> Self {
        Self {
            material,
            quantity,
            unit: Some(unit),
            quantity_mass_kg: Some(quantity_mass_kg),
            emission_factor: Some(emission_factor),
            emission: Some(quantity_mass_kg * emission_factor),
            status: LineStatus::Ok,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == LineStatus::Ok
    }

    pub fn is_skipped(&self) -> bool {
        self.status == LineStatus::Skipped
    }

    /// 失败行: 缺因子 或 无法换算
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            LineStatus::MissingFactor | LineStatus::Unconvertible(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_line_computes_emission() {
        let line = LineItem::resolved("copper".to_string(), 2.0, "kg".to_string(), 2.0, 3.81);
        assert!(line.is_resolved());
        assert!(!line.is_failure());
        assert_eq!(line.emission, Some(2.0 * 3.81));
    }

    #[test]
    fn test_failed_lines_never_carry_emission() {
        let missing = LineItem::missing_factor("unobtainium".to_string(), 1.0);
        assert!(missing.is_failure());
        assert_eq!(missing.emission, None);

        let unconvertible = LineItem::unconvertible(
            "pur".to_string(),
            1.0,
            "m3".to_string(),
            4.2,
            UnresolvedReason::NoDensity,
        );
        assert!(unconvertible.is_failure());
        assert_eq!(unconvertible.emission, None);
        assert_eq!(unconvertible.emission_factor, Some(4.2));
    }

    #[test]
    fn test_skipped_line_is_not_failure() {
        let line = LineItem::skipped(0.0);
        assert!(line.is_skipped());
        assert!(!line.is_failure());
        assert_eq!(line.emission, None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&LineStatus::Unconvertible(UnresolvedReason::NoDensity))
            .unwrap();
        assert_eq!(json, r#"{"status":"unconvertible","reason":"no_density"}"#);
        let json = serde_json::to_string(&LineStatus::MissingFactor).unwrap();
        assert_eq!(json, r#"{"status":"missing_factor"}"#);
    }
}
