// ==========================================
// 温室气体排放计算 - 方案领域模型
// ==========================================
// 职责: 方案（材料→数量）/ 方案合计 / 方案对比结果
// 红线: 含未解析行的方案合计为 Invalid,绝不部分求和
// ==========================================

use crate::domain::line_item::UnresolvedReason;
use crate::domain::types::ChangeDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 内置基线方案名
pub const BASELINE_SCENARIO: &str = "Current";

// ==========================================
// Scenario - 设计方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// 标准化材料键 → 数量（按因子库声明单位）
    pub items: BTreeMap<String, f64>,
}

impl Scenario {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: BTreeMap::new(),
        }
    }

    /// 累加数量（重复添加同一材料为相加,不覆盖）
    pub fn accumulate(&mut self, material_key: String, quantity: f64) {
        *self.items.entry(material_key).or_insert(0.0) += quantity;
    }

    /// 整体替换明细
    pub fn replace_items(&mut self, items: BTreeMap<String, f64>) {
        self.items = items;
    }

    pub fn quantity_of(&self, material_key: &str) -> Option<f64> {
        self.items.get(material_key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ==========================================
// 合计失败明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconvertibleMaterial {
    pub material: String,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TotalFailures {
    /// 无排放因子的材料（去重,保持出现顺序）
    pub missing_factor: Vec<String>,
    /// 无法换算到 kg 的材料
    pub unconvertible: Vec<UnconvertibleMaterial>,
}

impl TotalFailures {
    pub fn is_empty(&self) -> bool {
        self.missing_factor.is_empty() && self.unconvertible.is_empty()
    }

    /// 所有失败材料（缺因子在前）
    pub fn materials(&self) -> Vec<&str> {
        self.missing_factor
            .iter()
            .map(|m| m.as_str())
            .chain(self.unconvertible.iter().map(|u| u.material.as_str()))
            .collect()
    }
}

// ==========================================
// ScenarioTotal - 方案合计（派生值,不存储）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioTotal {
    Valid { total_kg_co2e: f64 },
    Invalid { failures: TotalFailures },
}

impl ScenarioTotal {
    pub fn value(&self) -> Option<f64> {
        match self {
            ScenarioTotal::Valid { total_kg_co2e } => Some(*total_kg_co2e),
            ScenarioTotal::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ScenarioTotal::Valid { .. })
    }

    pub fn failures(&self) -> Option<&TotalFailures> {
        match self {
            ScenarioTotal::Valid { .. } => None,
            ScenarioTotal::Invalid { failures } => Some(failures),
        }
    }
}

// ==========================================
// 方案对比
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub baseline: String,
    pub candidate: String,
    pub baseline_total: f64,
    pub candidate_total: f64,
    /// candidate_total - baseline_total
    pub delta: f64,
    /// 基线 > 0 时为 delta / baseline * 100,否则为 0
    pub percent_change: f64,
    pub direction: ChangeDirection,
}

impl ScenarioComparison {
    pub fn between(
        baseline: &str,
        baseline_total: f64,
        candidate: &str,
        candidate_total: f64,
    ) -> Self {
        let delta = candidate_total - baseline_total;
        let percent_change = if baseline_total > 0.0 {
            delta / baseline_total * 100.0
        } else {
            0.0
        };

        Self {
            baseline: baseline.to_string(),
            candidate: candidate.to_string(),
            baseline_total,
            candidate_total,
            delta,
            percent_change,
            direction: ChangeDirection::from_delta(delta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidScenario {
    pub scenario: String,
    pub failures: TotalFailures,
}

/// 对比结果: 任一方合计 Invalid 则整体 Invalid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Compared(ScenarioComparison),
    Invalid { scenarios: Vec<InvalidScenario> },
}

impl ComparisonOutcome {
    pub fn comparison(&self) -> Option<&ScenarioComparison> {
        match self {
            ComparisonOutcome::Compared(c) => Some(c),
            ComparisonOutcome::Invalid { .. } => None,
        }
    }
}
