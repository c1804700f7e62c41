// ==========================================
// 温室气体排放计算 - 配置层
// ==========================================
// 职责: 计算配置的持久化与加载
// 存储: config_kv 表
// ==========================================

pub mod calculator_config;
pub mod config_manager;
pub mod config_reader_trait;

// 重导出核心配置管理器
pub use calculator_config::{CalculatorConfig, DEFAULT_MAX_INPUT_ROWS};
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader_trait::CalculatorConfigReader;
