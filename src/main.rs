// ==========================================
// 温室气体排放计算 - 演示入口
// ==========================================
// 环境变量:
// - GHG_EF_FILE: 因子库工作簿路径（缺省使用内置 ICE 样例库）
// - GHG_EMISSIONS_DB_PATH: 配置数据库路径
// - GHG_LOG_FORMAT=json: JSON 日志
// ==========================================

use ghg_emissions_calc::api::{EmissionApi, InputRow};
use ghg_emissions_calc::config::{CalculatorConfig, ConfigManager};
use ghg_emissions_calc::db::get_default_db_path;
use ghg_emissions_calc::domain::LineStatus;
use ghg_emissions_calc::engine::EmissionFactorCatalog;
use ghg_emissions_calc::logging;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    match std::env::var("GHG_LOG_FORMAT") {
        Ok(format) if format.eq_ignore_ascii_case("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{} - 版本 {}", ghg_emissions_calc::APP_NAME, ghg_emissions_calc::VERSION);
    tracing::info!("==================================================");

    // 配置: 数据库不可用时使用默认配置
    let db_path = get_default_db_path();
    let config = match ConfigManager::new(&db_path).and_then(|m| m.load_calculator_config()) {
        Ok(config) => {
            tracing::info!("使用数据库配置: {}", db_path);
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "配置加载失败，使用默认配置");
            CalculatorConfig::default()
        }
    };

    // 因子库
    let catalog = match std::env::var("GHG_EF_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            EmissionApi::load_catalog(Path::new(path.trim()), &config)?
        }
        _ => {
            tracing::info!("未指定 GHG_EF_FILE，使用内置 ICE 样例库");
            Arc::new(EmissionFactorCatalog::ice_sample())
        }
    };

    let mut api = EmissionApi::new(catalog, config);

    // 演示: 当前设计 + 一个备选方案
    let current = vec![
        InputRow::new("Concrete 35MPa", 4000.0),
        InputRow::new("Unalloyed steel", 250.0),
        InputRow::new("Copper", 12.5),
        InputRow::new("Network cable", 80.0),
    ];
    let report = api.set_current_design(&current)?;

    println!("{:<32} {:>12} {:>8} {:>16}", "Material", "Quantity", "Unit", "kg CO2-eq");
    for line in &report.batch.lines {
        match (&line.status, line.emission) {
            (LineStatus::Ok, Some(emission)) => println!(
                "{:<32} {:>12.2} {:>8} {:>16.2}",
                line.material,
                line.quantity,
                line.unit.as_deref().unwrap_or("-"),
                emission
            ),
            (status, _) => println!(
                "{:<32} {:>12.2} {:>8} {:>16}",
                line.material, line.quantity, "-", status
            ),
        }
    }
    match report.total().value() {
        Some(total) => println!(
            "Total: {:.2} kg CO2-eq ({} threshold {:.0})",
            total,
            report
                .threshold_status
                .map(|s| s.to_string())
                .unwrap_or_default(),
            report.threshold_kg
        ),
        None => println!("Total: invalid"),
    }

    let baseline = api.config().baseline_name.clone();
    let outcome = api.what_if(
        &baseline,
        "Lighter steel",
        &[InputRow::new("Unalloyed steel", 180.0)],
    )?;
    if let Some(comparison) = outcome.comparison() {
        println!(
            "{} vs {}: delta {:.2} kg CO2-eq ({:.1}%, {})",
            comparison.candidate,
            comparison.baseline,
            comparison.delta,
            comparison.percent_change,
            comparison.direction
        );
    }

    Ok(())
}
