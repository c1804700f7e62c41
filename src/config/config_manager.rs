// ==========================================
// 温室气体排放计算 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::calculator_config::{CalculatorConfig, DEFAULT_MAX_INPUT_ROWS};
use crate::config::config_reader_trait::CalculatorConfigReader;
use crate::db::{ensure_config_schema, open_sqlite_connection};
use crate::domain::emission_factor::DEFAULT_WASTE_SUFFIX;
use crate::domain::scenario::BASELINE_SCENARIO;
use crate::domain::types::{CatalogMode, DuplicatePolicy};
use crate::engine::threshold::DEFAULT_THRESHOLD_KG;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（不存在的配置表会被创建）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并补齐配置表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_config_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导出当前计算配置
    /// - 与 restore_config_from_snapshot 配合做配置回滚
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    /// - 以 "__meta_" 开头的键不回写
    pub fn restore_config_from_snapshot(
        &self,
        snapshot_json: &str,
    ) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            if key.starts_with("__meta_") {
                continue;
            }
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value, updated_at)
                 VALUES ('global', ?1, ?2, datetime('now'))
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }

        tx.commit()?;
        info!(restored = count, "配置快照已恢复");
        Ok(count)
    }

    // ===== 计算配置快照 =====

    /// 读取完整计算配置（缺失项取默认值）
    pub fn load_calculator_config(&self) -> Result<CalculatorConfig, Box<dyn Error>> {
        CalculatorConfig::from_reader(self)
    }

    /// 写回完整计算配置
    pub fn save_calculator_config(&self, config: &CalculatorConfig) -> Result<(), Box<dyn Error>> {
        let densities = serde_json::to_string(&config.densities)?;
        let entries = [
            (
                config_keys::EMISSION_THRESHOLD_KG,
                config.emission_threshold_kg.to_string(),
            ),
            (config_keys::DENSITY_MAP, densities),
            (config_keys::WASTE_SUFFIX, config.waste_suffix.clone()),
            (config_keys::CATALOG_MODE, config.catalog_mode.to_string()),
            (
                config_keys::DUPLICATE_POLICY,
                config.duplicate_policy.to_string(),
            ),
            (config_keys::BASELINE_NAME, config.baseline_name.clone()),
            (
                config_keys::MAX_INPUT_ROWS,
                config.max_input_rows.to_string(),
            ),
        ];

        for (key, value) in entries.iter() {
            self.set_global_config_value(key, value)?;
        }
        info!(keys = entries.len(), "计算配置已保存");
        Ok(())
    }
}

// ==========================================
// CalculatorConfigReader Trait 实现
// ==========================================
impl CalculatorConfigReader for ConfigManager {
    fn get_emission_threshold_kg(&self) -> Result<f64, Box<dyn Error>> {
        let default = DEFAULT_THRESHOLD_KG.to_string();
        let value = self.get_config_or_default(config_keys::EMISSION_THRESHOLD_KG, &default)?;
        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => {
                warn!(
                    config_key = config_keys::EMISSION_THRESHOLD_KG,
                    raw_value = %value,
                    "阈值配置非法，使用默认值"
                );
                Ok(DEFAULT_THRESHOLD_KG)
            }
        }
    }

    /// 配置格式为 JSON: {"reinforced concrete": 2400, "pvc": 1380}
    /// 格式错误时回退到内置密度表
    fn get_density_map(&self) -> Result<BTreeMap<String, f64>, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::DENSITY_MAP)? {
            Some(raw) => raw,
            None => return Ok(CalculatorConfig::default().densities),
        };

        let densities: BTreeMap<String, f64> = serde_json::from_str(&raw).unwrap_or_else(|_| {
            warn!(
                config_key = config_keys::DENSITY_MAP,
                raw_value = %raw,
                "密度配置格式错误，使用内置密度表"
            );
            CalculatorConfig::default().densities
        });
        Ok(densities)
    }

    fn get_waste_suffix(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::WASTE_SUFFIX, DEFAULT_WASTE_SUFFIX)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_WASTE_SUFFIX.to_string())
        } else {
            Ok(trimmed.to_lowercase())
        }
    }

    fn get_catalog_mode(&self) -> Result<CatalogMode, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::CATALOG_MODE, "PER_DECLARED_UNIT")?;
        Ok(CatalogMode::parse(&value).unwrap_or_default())
    }

    fn get_duplicate_policy(&self) -> Result<DuplicatePolicy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DUPLICATE_POLICY, "CONCATENATE")?;
        Ok(DuplicatePolicy::parse(&value).unwrap_or_default())
    }

    fn get_baseline_name(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::BASELINE_NAME, BASELINE_SCENARIO)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(BASELINE_SCENARIO.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn get_max_input_rows(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MAX_INPUT_ROWS, "50")?;
        match value.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Ok(DEFAULT_MAX_INPUT_ROWS),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 阈值
    pub const EMISSION_THRESHOLD_KG: &str = "emission_threshold_kg";

    // 单位换算
    pub const DENSITY_MAP: &str = "density_map"; // 材料类别 → 密度 (JSON)
    pub const WASTE_SUFFIX: &str = "waste_suffix";

    // 因子库
    pub const CATALOG_MODE: &str = "catalog_mode";
    pub const DUPLICATE_POLICY: &str = "duplicate_policy";

    // 方案
    pub const BASELINE_NAME: &str = "baseline_name";
    pub const MAX_INPUT_ROWS: &str = "max_input_rows";
}
