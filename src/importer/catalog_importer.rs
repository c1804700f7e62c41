// ==========================================
// 温室气体排放计算 - 排放因子库导入器
// ==========================================
// 职责: 外部数据源（Excel 工作簿 / 三个 CSV）→ EmissionFactorCatalog
// 流程:
// 1. 读取三张逻辑表: 投入材料因子 / 废弃物因子 / 材料名录
// 2. 表头校验
// 3. 字段映射 + 清洗 → RawFactorRow
// 4. 建库（标准化、剔除缺失、重复键策略）
// ==========================================

use crate::engine::catalog::{CatalogBuildOptions, CatalogSource, EmissionFactorCatalog};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{CatalogColumnLayout, FactorFieldMapper};
use crate::importer::file_parser::{CsvParser, ExcelParser, FileParser, RawRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

// ==========================================
// WorkbookSheets - 工作表名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSheets {
    pub input_factors: String,
    pub waste_factors: String,
    pub materials: String,
}

impl Default for WorkbookSheets {
    fn default() -> Self {
        Self {
            input_factors: "Input_EFs".to_string(),
            waste_factors: "Waste_EFs".to_string(),
            materials: "Materials".to_string(),
        }
    }
}

// ==========================================
// CatalogImporter - 因子库导入器
// ==========================================
pub struct CatalogImporter {
    options: CatalogBuildOptions,
    sheets: WorkbookSheets,
    mapper: FactorFieldMapper,
}

impl CatalogImporter {
    /// 按建库参数创建,列布局取该模式的默认布局
    pub fn new(options: CatalogBuildOptions) -> Self {
        let layout = CatalogColumnLayout::for_mode(options.mode);
        Self::with_layout(options, WorkbookSheets::default(), layout)
    }

    pub fn with_layout(
        options: CatalogBuildOptions,
        sheets: WorkbookSheets,
        layout: CatalogColumnLayout,
    ) -> Self {
        Self {
            options,
            sheets,
            mapper: FactorFieldMapper::new(layout),
        }
    }

    pub fn options(&self) -> &CatalogBuildOptions {
        &self.options
    }

    /// 从 Excel 工作簿导入（三个工作表）
    #[instrument(skip_all)]
    pub fn import_workbook<P: AsRef<Path>>(&self, path: P) -> ImportResult<EmissionFactorCatalog> {
        let path = path.as_ref();
        let input = ExcelParser::for_sheet(&self.sheets.input_factors).parse_to_raw_records(path)?;
        let waste = ExcelParser::for_sheet(&self.sheets.waste_factors).parse_to_raw_records(path)?;
        let materials = ExcelParser::for_sheet(&self.sheets.materials).parse_to_raw_records(path)?;

        self.build_from_records(input, waste, materials)
    }

    /// 从三个 CSV 文件导入
    #[instrument(skip_all)]
    pub fn import_csv<P: AsRef<Path>>(
        &self,
        input_factors: P,
        waste_factors: P,
        materials: P,
    ) -> ImportResult<EmissionFactorCatalog> {
        let input = CsvParser.parse_to_raw_records(input_factors.as_ref())?;
        let waste = CsvParser.parse_to_raw_records(waste_factors.as_ref())?;
        let materials = CsvParser.parse_to_raw_records(materials.as_ref())?;

        self.build_from_records(input, waste, materials)
    }

    /// 原始记录 → 因子库
    pub fn build_from_records(
        &self,
        input: Vec<RawRecord>,
        waste: Vec<RawRecord>,
        materials: Vec<RawRecord>,
    ) -> ImportResult<EmissionFactorCatalog> {
        self.mapper
            .check_factor_columns(&self.sheets.input_factors, &input)?;
        self.mapper
            .check_factor_columns(&self.sheets.waste_factors, &waste)?;
        self.mapper
            .check_material_column(&self.sheets.materials, &materials)?;

        let source = CatalogSource {
            input_rows: input.iter().map(|r| self.mapper.map_factor_row(r)).collect(),
            waste_rows: waste.iter().map(|r| self.mapper.map_factor_row(r)).collect(),
            material_names: materials
                .iter()
                .map(|r| self.mapper.map_material_name(r))
                .collect(),
        };

        let catalog = EmissionFactorCatalog::build(source, &self.options);
        info!(
            load_id = %catalog.report().load_id,
            indexed = catalog.len(),
            "排放因子导入完成"
        );
        Ok(catalog)
    }
}
