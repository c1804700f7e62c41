// ==========================================
// 温室气体排放计算 - 排放因子库
// ==========================================
// 职责: 原始因子表 → 标准化、可查询的 材料键 → {因子, 声明单位} 索引
// 输入: 投入材料因子表 + 废弃物因子表 + 材料名录
// 红线: 缺材料/缺因子/缺单位的行在建库时剔除,绝不默认为 0
// ==========================================

use crate::domain::emission_factor::{
    normalize_material_key, waste_key, CatalogEntry, RawFactorRow, DEFAULT_WASTE_SUFFIX,
    KILOGRAM_UNIT,
};
use crate::domain::types::{CatalogMode, DuplicatePolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 因子库查询未命中
#[derive(Error, Debug, Clone, PartialEq)]
#[error("排放因子未找到: {key}")]
pub struct NotFound {
    pub key: String,
}

// ==========================================
// CatalogSource - 建库输入（三张逻辑表）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub input_rows: Vec<RawFactorRow>,
    pub waste_rows: Vec<RawFactorRow>,
    /// 材料名录（下拉选项来源,可含空值）
    pub material_names: Vec<Option<String>>,
}

// ==========================================
// CatalogBuildOptions - 建库参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogBuildOptions {
    pub mode: CatalogMode,
    pub policy: DuplicatePolicy,
    pub waste_suffix: String,
}

impl Default for CatalogBuildOptions {
    fn default() -> Self {
        Self {
            mode: CatalogMode::PerDeclaredUnit,
            policy: DuplicatePolicy::Concatenate,
            waste_suffix: DEFAULT_WASTE_SUFFIX.to_string(),
        }
    }
}

// ==========================================
// CatalogBuildReport - 建库报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogBuildReport {
    pub load_id: String,
    pub built_at: DateTime<Utc>,
    pub mode: CatalogMode,
    pub policy: DuplicatePolicy,
    pub input_rows: usize,
    pub waste_rows: usize,
    pub indexed: usize,
    pub dropped_missing_material: usize,
    pub dropped_missing_factor: usize,
    pub dropped_missing_unit: usize,
    /// 出现多次的键（Concatenate 保留首行;Average 中单位冲突的行）
    pub duplicate_keys: Vec<String>,
}

impl CatalogBuildReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped_missing_material + self.dropped_missing_factor + self.dropped_missing_unit
    }
}

// ==========================================
// EmissionFactorCatalog - 排放因子库
// ==========================================
// 建库后不可变,可在多个会话间共享（Arc）
#[derive(Debug, Clone)]
pub struct EmissionFactorCatalog {
    entries: BTreeMap<String, CatalogEntry>,
    allowed_materials: Vec<String>,
    mode: CatalogMode,
    waste_suffix: String,
    report: CatalogBuildReport,
}

impl EmissionFactorCatalog {
    /// 建库
    ///
    /// # 流程
    /// 1. 材料名标准化（trim + 小写）,废弃物表追加后缀
    /// 2. 投入表与废弃物表合并为同一索引
    /// 3. 剔除缺材料/缺因子/缺单位的行（PerKilogram 模式单位固定为 kg）
    /// 4. 重复键按 DuplicatePolicy 处理
    #[instrument(skip(source), fields(
        input_rows = source.input_rows.len(),
        waste_rows = source.waste_rows.len(),
        mode = %options.mode,
    ))]
    pub fn build(source: CatalogSource, options: &CatalogBuildOptions) -> Self {
        let mut report = CatalogBuildReport {
            load_id: Uuid::new_v4().to_string(),
            built_at: Utc::now(),
            mode: options.mode,
            policy: options.policy,
            input_rows: source.input_rows.len(),
            waste_rows: source.waste_rows.len(),
            indexed: 0,
            dropped_missing_material: 0,
            dropped_missing_factor: 0,
            dropped_missing_unit: 0,
            duplicate_keys: Vec::new(),
        };

        let mut entries: BTreeMap<String, CatalogEntry> = BTreeMap::new();
        // 平均策略累加器: key → (因子和, 行数)
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        let mut duplicates: BTreeSet<String> = BTreeSet::new();

        let tagged_rows = source
            .input_rows
            .iter()
            .map(|row| (row, false))
            .chain(source.waste_rows.iter().map(|row| (row, true)));

        for (row, is_waste) in tagged_rows {
            let base = match row
                .material
                .as_deref()
                .map(normalize_material_key)
                .filter(|m| !m.is_empty())
            {
                Some(m) => m,
                None => {
                    report.dropped_missing_material += 1;
                    continue;
                }
            };

            let factor = match row.factor.filter(|f| f.is_finite()) {
                Some(f) => f,
                None => {
                    warn!(material = %base, waste = is_waste, "因子缺失,行已剔除");
                    report.dropped_missing_factor += 1;
                    continue;
                }
            };

            let unit = match options.mode {
                CatalogMode::PerKilogram => KILOGRAM_UNIT.to_string(),
                CatalogMode::PerDeclaredUnit => match row
                    .unit
                    .as_deref()
                    .map(|u| u.trim().to_lowercase())
                    .filter(|u| !u.is_empty())
                {
                    Some(u) => u,
                    None => {
                        warn!(material = %base, waste = is_waste, "声明单位缺失,行已剔除");
                        report.dropped_missing_unit += 1;
                        continue;
                    }
                },
            };

            let key = if is_waste {
                waste_key(&base, &options.waste_suffix)
            } else {
                base
            };

            match entries.get(&key) {
                None => {
                    sums.insert(key.clone(), (factor, 1));
                    entries.insert(key.clone(), CatalogEntry { key, unit, factor });
                }
                Some(existing) => match options.policy {
                    DuplicatePolicy::Average if existing.unit == unit => {
                        if let Some(acc) = sums.get_mut(&key) {
                            acc.0 += factor;
                            acc.1 += 1;
                        }
                    }
                    _ => {
                        warn!(key = %key, policy = %options.policy, "重复材料键,后续行未入库");
                        duplicates.insert(key);
                    }
                },
            }
        }

        if options.policy == DuplicatePolicy::Average {
            for (key, entry) in entries.iter_mut() {
                if let Some((sum, count)) = sums.get(key) {
                    if *count > 1 {
                        entry.factor = sum / *count as f64;
                    }
                }
            }
        }

        report.indexed = entries.len();
        report.duplicate_keys = duplicates.into_iter().collect();

        let allowed_materials =
            Self::derive_allowed_materials(&source.material_names, &options.waste_suffix);

        info!(
            load_id = %report.load_id,
            indexed = report.indexed,
            dropped = report.dropped_total(),
            duplicates = report.duplicate_keys.len(),
            allowed = allowed_materials.len(),
            "排放因子库构建完成"
        );

        Self {
            entries,
            allowed_materials,
            mode: options.mode,
            waste_suffix: options.waste_suffix.clone(),
            report,
        }
    }

    /// 材料名录 → 可选材料列表（基础名 + 废弃物变体,排序去重）
    fn derive_allowed_materials(names: &[Option<String>], waste_suffix: &str) -> Vec<String> {
        let bases: BTreeSet<String> = names
            .iter()
            .filter_map(|n| n.as_deref())
            .map(normalize_material_key)
            .filter(|n| !n.is_empty())
            .collect();

        let mut allowed: BTreeSet<String> = BTreeSet::new();
        for base in bases {
            allowed.insert(waste_key(&base, waste_suffix));
            allowed.insert(base);
        }
        allowed.into_iter().collect()
    }

    /// 查询排放因子（大小写/空白不敏感）
    pub fn lookup(&self, material: &str) -> Result<&CatalogEntry, NotFound> {
        let key = normalize_material_key(material);
        self.entries.get(&key).ok_or(NotFound { key })
    }

    pub fn contains(&self, material: &str) -> bool {
        self.entries.contains_key(&normalize_material_key(material))
    }

    /// 全部有效键（有序）
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// 下拉可选材料（来自材料名录,与是否有因子无关）
    pub fn allowed_materials(&self) -> &[String] {
        &self.allowed_materials
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    pub fn waste_suffix(&self) -> &str {
        &self.waste_suffix
    }

    pub fn report(&self) -> &CatalogBuildReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ==========================================
    // 内置样例库（ICE 2024）
    // ==========================================

    /// 内置静态因子表,用于演示与测试
    pub fn ice_sample() -> Self {
        let rows: Vec<RawFactorRow> = ICE_SAMPLE_FACTORS
            .iter()
            .map(|(material, unit, factor)| RawFactorRow::new(material, unit, *factor))
            .collect();
        let material_names = ICE_SAMPLE_FACTORS
            .iter()
            .map(|(material, _, _)| Some(material.to_string()))
            .collect();

        Self::build(
            CatalogSource {
                input_rows: rows,
                waste_rows: Vec::new(),
                material_names,
            },
            &CatalogBuildOptions::default(),
        )
    }
}

/// ICE Advanced Database 2024 v4 样例因子 (材料, 声明单位, kg CO₂-eq / 单位)
pub const ICE_SAMPLE_FACTORS: &[(&str, &str, f64)] = &[
    ("Concrete 35MPa", "kg", 0.122),
    ("Stainless steel", "kg", 4.81),
    ("Low-alloyed steel", "kg", 2.04),
    ("Unalloyed steel", "kg", 1.86),
    ("Iron-nickel-chromium alloy", "kg", 7.04),
    ("Cast iron", "kg", 2.03),
    ("Aluminum alloy", "kg", 8.66),
    ("Copper", "kg", 3.81),
    ("Cable", "kg", 6.08),
    ("Network cable", "m", 0.546),
    ("Steel pipe, welded", "kg", 2.51),
    ("Rubber seal", "kg", 2.55),
];
