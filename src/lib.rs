// ==========================================
// 温室气体排放计算 - 核心库
// ==========================================
// 职责: 排放因子库 / 单位换算 / 明细计算 / 方案对比
// 技术栈: Rust + SQLite（配置）+ calamine/csv（因子导入）
// 系统定位: 计算核心,展示由调用方负责
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 计算规则
pub mod engine;

// 导入层 - 外部因子数据
pub mod importer;

// 配置层 - 计算配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/配置表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 会话接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CatalogMode, ChangeDirection, DuplicatePolicy, ThresholdStatus, UnitKind,
};

// 领域实体
pub use domain::{
    CatalogEntry, ComparisonOutcome, LineItem, LineStatus, Scenario, ScenarioComparison,
    ScenarioTotal, UnresolvedReason,
};

// 引擎
pub use engine::{
    BatchCalculation, EmissionFactorCatalog, LineItemCalculator, ScenarioAggregator,
    ThresholdEvaluator, UnitConverter,
};

// 配置
pub use config::{CalculatorConfig, ConfigManager};

// API
pub use api::{ApiError, EmissionApi, InputRow};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "温室气体排放计算";
