// ==========================================
// 温室气体排放计算 - 字段映射器
// ==========================================
// 职责: 原始行记录 → RawFactorRow / 材料名
// 列名匹配: trim 后大小写不敏感,支持别名
// ==========================================

use crate::domain::emission_factor::RawFactorRow;
use crate::domain::types::CatalogMode;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use serde::{Deserialize, Serialize};

/// 每声明单位因子列（IPCC 2021, 20 年）
pub const FACTOR_COLUMN_PER_UNIT: &str = "GWP IPCC 2021, 20 years per unit";
/// 每 kg 因子列
pub const FACTOR_COLUMN_PER_KG: &str = "GWP IPCC 2021, 20 years per kg";

// ==========================================
// CatalogColumnLayout - 因子表列布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogColumnLayout {
    pub material_columns: Vec<String>,
    /// PerKilogram 模式下为空
    pub unit_columns: Vec<String>,
    pub factor_columns: Vec<String>,
}

impl CatalogColumnLayout {
    /// 按因子库模式给出默认列布局
    pub fn for_mode(mode: CatalogMode) -> Self {
        match mode {
            CatalogMode::PerDeclaredUnit => Self {
                material_columns: vec!["Material".to_string()],
                unit_columns: vec!["Unit".to_string()],
                factor_columns: vec![FACTOR_COLUMN_PER_UNIT.to_string(), "EF".to_string()],
            },
            CatalogMode::PerKilogram => Self {
                material_columns: vec!["Material".to_string()],
                unit_columns: Vec::new(),
                factor_columns: vec![FACTOR_COLUMN_PER_KG.to_string(), "EF".to_string()],
            },
        }
    }
}

// ==========================================
// FactorFieldMapper - 字段映射器
// ==========================================
pub struct FactorFieldMapper {
    layout: CatalogColumnLayout,
    cleaner: DataCleaner,
}

impl FactorFieldMapper {
    pub fn new(layout: CatalogColumnLayout) -> Self {
        Self {
            layout,
            cleaner: DataCleaner,
        }
    }

    pub fn layout(&self) -> &CatalogColumnLayout {
        &self.layout
    }

    /// 校验表头包含必需列（空表不校验）
    pub fn check_factor_columns(&self, table: &str, records: &[RawRecord]) -> ImportResult<()> {
        let first = match records.first() {
            Some(first) => first,
            None => return Ok(()),
        };

        let mut required = vec![&self.layout.material_columns, &self.layout.factor_columns];
        if !self.layout.unit_columns.is_empty() {
            required.push(&self.layout.unit_columns);
        }

        for aliases in required {
            if find_column(first, aliases).is_none() {
                return Err(ImportError::MissingColumn {
                    table: table.to_string(),
                    column: aliases.first().cloned().unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    /// 校验材料名录表头
    pub fn check_material_column(&self, table: &str, records: &[RawRecord]) -> ImportResult<()> {
        match records.first() {
            Some(first) if find_column(first, &self.layout.material_columns).is_none() => {
                Err(ImportError::MissingColumn {
                    table: table.to_string(),
                    column: self
                        .layout
                        .material_columns
                        .first()
                        .cloned()
                        .unwrap_or_default(),
                })
            }
            _ => Ok(()),
        }
    }

    /// 映射一行因子记录
    pub fn map_factor_row(&self, row: &RawRecord) -> RawFactorRow {
        let unit = if self.layout.unit_columns.is_empty() {
            None
        } else {
            self.cleaner
                .normalize_null(find_column(row, &self.layout.unit_columns))
        };

        RawFactorRow {
            material: self.map_material_name(row),
            unit,
            factor: self
                .cleaner
                .parse_decimal(find_column(row, &self.layout.factor_columns)),
        }
    }

    /// 映射材料名
    pub fn map_material_name(&self, row: &RawRecord) -> Option<String> {
        self.cleaner
            .normalize_null(find_column(row, &self.layout.material_columns))
    }
}

/// 按别名顺序查找列值
fn find_column<'a>(row: &'a RawRecord, aliases: &[String]) -> Option<&'a str> {
    aliases.iter().find_map(|alias| {
        let alias = alias.trim();
        row.get(alias).map(|v| v.as_str()).or_else(|| {
            row.iter()
                .find(|(header, _)| header.trim().eq_ignore_ascii_case(alias))
                .map(|(_, v)| v.as_str())
        })
    })
}
