// ==========================================
// 温室气体排放计算 - 领域类型定义
// ==========================================
// 职责: 单位族 / 因子库模式 / 重复行策略 / 阈值状态 / 变化方向
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单位族 (Unit Kind)
// ==========================================
// 换算器只桥接 体积→质量,其余单位族假定已与因子库声明单位一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    Mass,          // 质量 (kg / t)
    Volume,        // 体积 (m3)
    Length,        // 长度 (m / km)
    TransportWork, // 运输功 (tkm)
}

impl UnitKind {
    /// 解析声明单位字符串
    ///
    /// 大小写/空白不敏感; 无法识别的单位返回 None
    /// (调用方需上报 "unsupported_unit",不得猜测)
    pub fn parse(unit: &str) -> Option<Self> {
        let normalized: String = unit
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match normalized.as_str() {
            "kg" | "kilogram" | "kilograms" | "t" | "tonne" | "tonnes" | "ton" => {
                Some(UnitKind::Mass)
            }
            "m3" | "m³" | "m^3" | "cubicmeter" | "cubicmetre" => Some(UnitKind::Volume),
            "m" | "meter" | "metre" | "km" => Some(UnitKind::Length),
            "tkm" | "t-km" | "t*km" | "t·km" | "tonne-km" | "tonnekm" => {
                Some(UnitKind::TransportWork)
            }
            _ => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Mass => write!(f, "MASS"),
            UnitKind::Volume => write!(f, "VOLUME"),
            UnitKind::Length => write!(f, "LENGTH"),
            UnitKind::TransportWork => write!(f, "TRANSPORT_WORK"),
        }
    }
}

// ==========================================
// 因子库模式 (Catalog Mode)
// ==========================================
// PerDeclaredUnit: 数量按声明单位录入,下游换算到 kg
// PerKilogram:     因子已归一到每 kg,数量直接按 kg 录入,不做换算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogMode {
    PerDeclaredUnit,
    PerKilogram,
}

impl CatalogMode {
    /// 从配置值解析,未知值返回 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PER_DECLARED_UNIT" => Some(CatalogMode::PerDeclaredUnit),
            "PER_KILOGRAM" => Some(CatalogMode::PerKilogram),
            _ => None,
        }
    }

    /// 该模式下是否需要单位换算
    pub fn requires_conversion(&self) -> bool {
        matches!(self, CatalogMode::PerDeclaredUnit)
    }
}

impl Default for CatalogMode {
    fn default() -> Self {
        CatalogMode::PerDeclaredUnit
    }
}

impl fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogMode::PerDeclaredUnit => write!(f, "PER_DECLARED_UNIT"),
            CatalogMode::PerKilogram => write!(f, "PER_KILOGRAM"),
        }
    }
}

// ==========================================
// 重复行策略 (Duplicate Policy)
// ==========================================
// Concatenate: 首行入库,后续重复行记入报告
// Average:     同 key 同单位的因子取算术平均
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicatePolicy {
    Concatenate,
    Average,
}

impl DuplicatePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "CONCATENATE" => Some(DuplicatePolicy::Concatenate),
            "AVERAGE" => Some(DuplicatePolicy::Average),
            _ => None,
        }
    }
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Concatenate
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Concatenate => write!(f, "CONCATENATE"),
            DuplicatePolicy::Average => write!(f, "AVERAGE"),
        }
    }
}

// ==========================================
// 阈值状态 (Threshold Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdStatus {
    Below, // 低于阈值
    At,    // 等于阈值
    Above, // 高于阈值
}

impl fmt::Display for ThresholdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdStatus::Below => write!(f, "BELOW"),
            ThresholdStatus::At => write!(f, "AT"),
            ThresholdStatus::Above => write!(f, "ABOVE"),
        }
    }
}

// ==========================================
// 变化方向 (Change Direction)
// ==========================================
// delta == 0 为 NoChange,方向只由严格不等式决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeDirection {
    Decreased,
    NoChange,
    Increased,
}

impl ChangeDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta < 0.0 {
            ChangeDirection::Decreased
        } else if delta > 0.0 {
            ChangeDirection::Increased
        } else {
            ChangeDirection::NoChange
        }
    }
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeDirection::Decreased => write!(f, "DECREASED"),
            ChangeDirection::NoChange => write!(f, "NO_CHANGE"),
            ChangeDirection::Increased => write!(f, "INCREASED"),
        }
    }
}
