// ==========================================
// 温室气体排放计算 - 排放因子领域模型
// ==========================================
// 职责: 原始因子行 / 因子库条目 / 密度条目 / 材料键标准化
// ==========================================

use serde::{Deserialize, Serialize};

/// 废弃物变体默认后缀
pub const DEFAULT_WASTE_SUFFIX: &str = "_waste";

/// 质量单位（PerKilogram 模式下所有条目的声明单位）
pub const KILOGRAM_UNIT: &str = "kg";

// ==========================================
// RawFactorRow - 原始因子行
// ==========================================
// 来自外部数据源（Excel/CSV/静态表）,字段均可能缺失
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFactorRow {
    pub material: Option<String>,
    pub unit: Option<String>,
    pub factor: Option<f64>,
}

impl RawFactorRow {
    pub fn new(material: &str, unit: &str, factor: f64) -> Self {
        Self {
            material: Some(material.to_string()),
            unit: Some(unit.to_string()),
            factor: Some(factor),
        }
    }
}

// ==========================================
// CatalogEntry - 因子库条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 标准化材料键（trim + 小写;废弃物变体带后缀）
    pub key: String,
    /// 声明单位（数量按此单位录入）
    pub unit: String,
    /// 排放因子（kg CO₂-eq / kg 换算后数量）
    pub factor: f64,
}

// ==========================================
// DensityEntry - 密度条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityEntry {
    /// 基础材料类别（已去掉废弃物后缀）
    pub material_class: String,
    /// 密度 kg/m³
    pub density_kg_per_m3: f64,
}

/// 标准化材料键: trim + 小写
///
/// 建库与查询使用同一函数,保证大小写/空白不敏感
pub fn normalize_material_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 生成废弃物变体键
pub fn waste_key(base: &str, suffix: &str) -> String {
    format!("{}{}", normalize_material_key(base), suffix.trim().to_lowercase())
}

/// 去掉废弃物后缀,得到密度查询用的基础材料类别
pub fn material_class(key: &str, suffix: &str) -> String {
    let normalized = normalize_material_key(key);
    let suffix = suffix.trim().to_lowercase();
    if suffix.is_empty() {
        return normalized;
    }
    match normalized.strip_suffix(suffix.as_str()) {
        Some(base) => base.trim().to_string(),
        None => normalized,
    }
}
