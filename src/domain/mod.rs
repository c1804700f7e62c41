// ==========================================
// 温室气体排放计算 - 领域层
// ==========================================
// 职责: 实体与值类型,不含计算逻辑
// ==========================================

pub mod emission_factor;
pub mod line_item;
pub mod scenario;
pub mod types;

// 重导出核心类型
pub use emission_factor::{
    material_class, normalize_material_key, waste_key, CatalogEntry, DensityEntry, RawFactorRow,
    DEFAULT_WASTE_SUFFIX, KILOGRAM_UNIT,
};
pub use line_item::{LineItem, LineStatus, UnresolvedReason};
pub use scenario::{
    ComparisonOutcome, InvalidScenario, Scenario, ScenarioComparison, ScenarioTotal,
    TotalFailures, UnconvertibleMaterial, BASELINE_SCENARIO,
};
pub use types::{ChangeDirection, CatalogMode, DuplicatePolicy, ThresholdStatus, UnitKind};
