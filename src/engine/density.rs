// ==========================================
// 温室气体排放计算 - 密度表
// ==========================================
// 职责: 材料类别 → 密度 (kg/m³),用于 m³ → kg 换算
// 红线: 密度只能来自配置,缺失即缺失,绝不猜测默认值
// ==========================================

use crate::domain::emission_factor::{normalize_material_key, DensityEntry};
use std::collections::HashMap;
use tracing::warn;

/// 内置密度表 (kg/m³)
pub const DEFAULT_DENSITIES: &[(&str, f64)] = &[
    ("reinforced concrete", 2400.0),
    ("stainless steel", 8000.0),
    ("aluminum", 2700.0),
    ("pvc", 1380.0),
    ("polyethylene", 950.0),
    ("pur", 30.0),
    ("rubber", 1100.0),
    ("copper", 8940.0),
];

// ==========================================
// DensityTable - 密度表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct DensityTable {
    densities: HashMap<String, f64>,
}

impl DensityTable {
    /// 空密度表（所有 m³ 条目都会换算失败）
    pub fn empty() -> Self {
        Self {
            densities: HashMap::new(),
        }
    }

    /// 从 (类别, 密度) 列表构建
    ///
    /// 非有限值或负值会被跳过并告警
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Self::empty();
        for (class, density) in pairs {
            table.insert(class.as_ref(), density);
        }
        table
    }

    /// 登记密度,返回是否生效
    pub fn insert(&mut self, material_class: &str, density_kg_per_m3: f64) -> bool {
        let key = normalize_material_key(material_class);
        if key.is_empty() {
            warn!("密度条目材料类别为空,已跳过");
            return false;
        }
        if !density_kg_per_m3.is_finite() || density_kg_per_m3 < 0.0 {
            warn!(material_class = %key, density = density_kg_per_m3, "密度值非法,已跳过");
            return false;
        }
        self.densities.insert(key, density_kg_per_m3);
        true
    }

    pub fn get(&self, material_class: &str) -> Option<f64> {
        self.densities
            .get(&normalize_material_key(material_class))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.densities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.densities.is_empty()
    }

    /// 按类别排序的条目列表
    pub fn entries(&self) -> Vec<DensityEntry> {
        let mut entries: Vec<DensityEntry> = self
            .densities
            .iter()
            .map(|(class, density)| DensityEntry {
                material_class: class.clone(),
                density_kg_per_m3: *density,
            })
            .collect();
        entries.sort_by(|a, b| a.material_class.cmp(&b.material_class));
        entries
    }

    /// 导出为 类别 → 密度 映射（用于配置持久化）
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.densities.clone()
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_DENSITIES.iter().copied())
    }
}
