// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证计算配置读取、保存、快照恢复的正确性
// ==========================================


use ghg_emissions_calc::config::{
    config_keys, CalculatorConfig, CalculatorConfigReader, ConfigManager,
};
use ghg_emissions_calc::domain::{CatalogMode, DuplicatePolicy};
use test_helpers::{create_test_db, insert_config, insert_test_config, open_test_connection};

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[test]
fn test_config_manager_creates_schema_on_empty_db() {
    let temp_file = tempfile::NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let config = config_manager
        .load_calculator_config()
        .expect("Should load defaults from empty db");
    assert_eq!(config, CalculatorConfig::default());
}

#[test]
fn test_load_calculator_config() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn).expect("Failed to insert test config");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let config = config_manager.load_calculator_config().unwrap();

    assert_eq!(config.emission_threshold_kg, 500.0);
    assert_eq!(config.duplicate_policy, DuplicatePolicy::Average);
    assert_eq!(config.catalog_mode, CatalogMode::PerDeclaredUnit);
    assert_eq!(config.baseline_name, "Baseline");
    assert_eq!(config.max_input_rows, 20);
    assert_eq!(config.densities.len(), 2);

    // 密度键在构建密度表时标准化
    let table = config.density_table();
    assert_eq!(table.get("glass"), Some(2500.0));
    assert_eq!(table.get("reinforced concrete"), Some(2400.0));
}

#[test]
fn test_bad_density_json_falls_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::DENSITY_MAP, "{not json").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let densities = config_manager.get_density_map().unwrap();
    assert_eq!(densities, CalculatorConfig::default().densities);
}

#[test]
fn test_blank_waste_suffix_uses_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::WASTE_SUFFIX, "   ").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    assert_eq!(config_manager.get_waste_suffix().unwrap(), "_waste");
}

#[test]
fn test_save_then_load_round_trip() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let mut config = CalculatorConfig::default();
    config.emission_threshold_kg = 750.5;
    config.catalog_mode = CatalogMode::PerKilogram;
    config.baseline_name = "Design 0".to_string();
    config.densities.insert("glass".to_string(), 2500.0);

    config_manager.save_calculator_config(&config).unwrap();
    let loaded = config_manager.load_calculator_config().unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_snapshot_and_restore() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::EMISSION_THRESHOLD_KG, "1200")
        .unwrap();
    let snapshot = config_manager.get_config_snapshot().unwrap();

    config_manager
        .set_global_config_value(config_keys::EMISSION_THRESHOLD_KG, "10")
        .unwrap();
    assert_eq!(config_manager.get_emission_threshold_kg().unwrap(), 10.0);

    let restored = config_manager
        .restore_config_from_snapshot(&snapshot)
        .unwrap();
    assert_eq!(restored, 1);
    assert_eq!(config_manager.get_emission_threshold_kg().unwrap(), 1200.0);
}

#[test]
fn test_restore_skips_meta_keys() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let restored = config_manager
        .restore_config_from_snapshot(r#"{"__meta_label":"v1","waste_suffix":"_eol"}"#)
        .unwrap();
    assert_eq!(restored, 1);
    assert_eq!(
        config_manager
            .get_global_config_value("__meta_label")
            .unwrap(),
        None
    );
    assert_eq!(config_manager.get_waste_suffix().unwrap(), "_eol");
}
