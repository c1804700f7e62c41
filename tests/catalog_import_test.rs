// ==========================================
// 排放因子库导入集成测试
// ==========================================
// 测试目标: CSV 三表导入 → 因子库 / 材料名录 / 建库报告
// ==========================================


use ghg_emissions_calc::domain::{CatalogMode, DuplicatePolicy};
use ghg_emissions_calc::engine::CatalogBuildOptions;
use ghg_emissions_calc::importer::{
    CatalogImporter, ImportError, FACTOR_COLUMN_PER_KG, FACTOR_COLUMN_PER_UNIT,
};
use test_helpers::{assert_close, write_temp_csv};

// 因子列名含逗号,需加引号
fn per_unit_header() -> String {
    format!("Material,Unit,\"{}\"", FACTOR_COLUMN_PER_UNIT)
}

#[test]
fn test_import_csv_triple() {
    ghg_emissions_calc::logging::init_test();
    let header = per_unit_header();
    let input = write_temp_csv(&[
        header.as_str(),
        "Reinforced concrete,m3,0.122",
        " Unalloyed Steel ,kg,1.86",
        "PUR,m3,",
        ",kg,2.0",
        "Electricity,,0.4",
    ])
    .unwrap();
    let waste = write_temp_csv(&[header.as_str(), "Reinforced concrete,m3,0.01"]).unwrap();
    let materials = write_temp_csv(&[
        "Material",
        "Reinforced concrete",
        "Unalloyed steel",
        "PUR",
        "unalloyed steel",
    ])
    .unwrap();

    let importer = CatalogImporter::new(CatalogBuildOptions::default());
    let catalog = importer
        .import_csv(input.path(), waste.path(), materials.path())
        .expect("import should succeed");

    assert_eq!(
        catalog.keys(),
        vec![
            "reinforced concrete",
            "reinforced concrete_waste",
            "unalloyed steel"
        ]
    );
    assert_close(catalog.lookup("UNALLOYED STEEL").unwrap().factor, 1.86);

    let report = catalog.report();
    assert_eq!(report.input_rows, 5);
    assert_eq!(report.waste_rows, 1);
    assert_eq!(report.indexed, 3);
    assert_eq!(report.dropped_missing_factor, 1);
    assert_eq!(report.dropped_missing_material, 1);
    assert_eq!(report.dropped_missing_unit, 1);
    assert!(!report.load_id.is_empty());

    // 名录与因子无关: PUR 无因子也可选
    assert_eq!(
        catalog.allowed_materials(),
        &[
            "pur".to_string(),
            "pur_waste".to_string(),
            "reinforced concrete".to_string(),
            "reinforced concrete_waste".to_string(),
            "unalloyed steel".to_string(),
            "unalloyed steel_waste".to_string(),
        ]
    );
}

#[test]
fn test_concatenate_keeps_first_and_reports_duplicate() {
    let header = per_unit_header();
    let input = write_temp_csv(&[header.as_str(), "Copper,kg,3.81", "copper,kg,4.00"]).unwrap();
    let waste = write_temp_csv(&[header.as_str()]).unwrap();
    let materials = write_temp_csv(&["Material", "Copper"]).unwrap();

    let catalog = CatalogImporter::new(CatalogBuildOptions::default())
        .import_csv(input.path(), waste.path(), materials.path())
        .unwrap();

    assert_close(catalog.lookup("copper").unwrap().factor, 3.81);
    assert_eq!(catalog.report().duplicate_keys, vec!["copper"]);
}

#[test]
fn test_average_policy_means_duplicate_rows() {
    let header = per_unit_header();
    let input = write_temp_csv(&[header.as_str(), "Copper,kg,3.0", "copper,kg,4.0"]).unwrap();
    let waste = write_temp_csv(&[
        header.as_str(),
        "Copper,kg,0.1",
        "Copper,kg,0.3",
        "Copper,m3,9.9",
    ])
    .unwrap();
    let materials = write_temp_csv(&["Material", "Copper"]).unwrap();

    let options = CatalogBuildOptions {
        policy: DuplicatePolicy::Average,
        ..CatalogBuildOptions::default()
    };
    let catalog = CatalogImporter::new(options)
        .import_csv(input.path(), waste.path(), materials.path())
        .unwrap();

    assert_close(catalog.lookup("copper").unwrap().factor, 3.5);
    let waste_entry = catalog.lookup("copper_waste").unwrap();
    assert_eq!(waste_entry.unit, "kg");
    assert_close(waste_entry.factor, 0.2);
    assert_eq!(catalog.report().duplicate_keys, vec!["copper_waste"]);
}

#[test]
fn test_per_kilogram_mode_forces_kg() {
    let quoted_header = format!("Material,\"{}\"", FACTOR_COLUMN_PER_KG);
    let quoted_header = quoted_header.as_str();
    let input = write_temp_csv(&[quoted_header, "Glass,1.2"]).unwrap();
    let waste = write_temp_csv(&[quoted_header]).unwrap();
    let materials = write_temp_csv(&["Material", "Glass"]).unwrap();

    let options = CatalogBuildOptions {
        mode: CatalogMode::PerKilogram,
        ..CatalogBuildOptions::default()
    };
    let catalog = CatalogImporter::new(options)
        .import_csv(input.path(), waste.path(), materials.path())
        .unwrap();

    assert_eq!(catalog.mode(), CatalogMode::PerKilogram);
    assert_eq!(catalog.lookup("glass").unwrap().unit, "kg");
}

#[test]
fn test_missing_factor_column_is_rejected() {
    let input = write_temp_csv(&["Material,Unit,Value", "Copper,kg,3.81"]).unwrap();
    let waste = write_temp_csv(&[per_unit_header().as_str()]).unwrap();
    let materials = write_temp_csv(&["Material", "Copper"]).unwrap();

    let result = CatalogImporter::new(CatalogBuildOptions::default()).import_csv(
        input.path(),
        waste.path(),
        materials.path(),
    );
    assert!(matches!(result, Err(ImportError::MissingColumn { .. })));
}
