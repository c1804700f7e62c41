// ==========================================
// 温室气体排放计算 - 方案汇总器
// ==========================================
// 职责: 持有多个命名方案,计算方案合计,方案间对比 / what-if 调整
// 红线:
// - 会话级对象,由调用方持有,不存在进程级单例
// - 合计为纯函数: 无修改时重复计算结果一致
// - 任一方合计 Invalid,对比即 Invalid
// ==========================================

use crate::domain::emission_factor::normalize_material_key;
use crate::domain::scenario::{
    ComparisonOutcome, InvalidScenario, Scenario, ScenarioComparison, ScenarioTotal,
    BASELINE_SCENARIO,
};
use crate::engine::calculator::{BatchCalculation, LineItemCalculator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("方案不存在: {0}")]
    NotFound(String),

    #[error("方案名称不能为空")]
    BlankName,

    #[error("基线方案不可删除: {0}")]
    BaselineRemoval(String),

    #[error("what-if 目标方案不能与源方案同名: {0}")]
    WhatIfOverwritesBase(String),
}

/// 对比图数据点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub scenario: String,
    pub is_baseline: bool,
    pub total: ScenarioTotal,
}

// ==========================================
// ScenarioAggregator - 方案汇总器
// ==========================================
pub struct ScenarioAggregator {
    calculator: Arc<LineItemCalculator>,
    baseline: String,
    // 按创建顺序,基线恒在首位
    scenarios: Vec<Scenario>,
}

impl ScenarioAggregator {
    /// 创建会话,基线方案名为 "Current"
    pub fn new(calculator: Arc<LineItemCalculator>) -> Self {
        Self::with_baseline(calculator, BASELINE_SCENARIO)
    }

    /// 指定基线方案名（空白名回退为 "Current"）
    pub fn with_baseline(calculator: Arc<LineItemCalculator>, baseline: &str) -> Self {
        let baseline = match baseline.trim() {
            "" => BASELINE_SCENARIO.to_string(),
            name => name.to_string(),
        };
        Self {
            calculator,
            scenarios: vec![Scenario::new(&baseline)],
            baseline,
        }
    }

    pub fn calculator(&self) -> &LineItemCalculator {
        &self.calculator
    }

    pub fn baseline_name(&self) -> &str {
        &self.baseline
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        let name = name.trim();
        self.scenarios.iter().find(|s| s.name == name)
    }

    fn require(&self, name: &str) -> Result<&Scenario, ScenarioError> {
        self.get(name)
            .ok_or_else(|| ScenarioError::NotFound(name.trim().to_string()))
    }

    fn get_or_create(&mut self, name: &str) -> Result<&mut Scenario, ScenarioError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScenarioError::BlankName);
        }
        let idx = match self.scenarios.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                debug!(scenario = name, "创建方案");
                self.scenarios.push(Scenario::new(name));
                self.scenarios.len() - 1
            }
        };
        Ok(&mut self.scenarios[idx])
    }

    // ==========================================
    // 修改操作
    // ==========================================

    /// 累加材料数量（方案不存在则创建）
    ///
    /// # 返回
    /// - Ok(true): 已累加
    /// - Ok(false): 材料为空白,忽略
    pub fn add(
        &mut self,
        scenario: &str,
        material: &str,
        quantity: f64,
    ) -> Result<bool, ScenarioError> {
        let key = normalize_material_key(material);
        let target = self.get_or_create(scenario)?;
        if key.is_empty() {
            return Ok(false);
        }
        target.accumulate(key, quantity);
        Ok(true)
    }

    /// 整体替换方案明细（保存备选方案 / what-if 调整）
    ///
    /// 输入中同一材料出现多次时数量相加;空白材料忽略
    pub fn set_items<I, S>(&mut self, scenario: &str, items: I) -> Result<(), ScenarioError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut replacement: BTreeMap<String, f64> = BTreeMap::new();
        for (material, quantity) in items {
            let key = normalize_material_key(material.as_ref());
            if key.is_empty() {
                continue;
            }
            *replacement.entry(key).or_insert(0.0) += quantity;
        }

        let target = self.get_or_create(scenario)?;
        target.replace_items(replacement);
        info!(scenario = %target.name, items = target.items.len(), "方案明细已替换");
        Ok(())
    }

    /// 删除备选方案（基线只能清空,不能删除）
    pub fn remove(&mut self, scenario: &str) -> Result<Scenario, ScenarioError> {
        let name = scenario.trim();
        if name == self.baseline {
            return Err(ScenarioError::BaselineRemoval(name.to_string()));
        }
        let idx = self
            .scenarios
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ScenarioError::NotFound(name.to_string()))?;
        Ok(self.scenarios.remove(idx))
    }

    /// 清空全部方案,重建空基线
    pub fn reset(&mut self) {
        self.scenarios = vec![Scenario::new(&self.baseline)];
        info!(baseline = %self.baseline, "方案会话已重置");
    }

    // ==========================================
    // 计算
    // ==========================================

    /// 方案逐行明细
    pub fn breakdown(&self, scenario: &str) -> Result<BatchCalculation, ScenarioError> {
        let target = self.require(scenario)?;
        Ok(self
            .calculator
            .compute_batch(target.items.iter().map(|(m, q)| (m.as_str(), *q))))
    }

    /// 方案合计
    pub fn total(&self, scenario: &str) -> Result<ScenarioTotal, ScenarioError> {
        Ok(self.breakdown(scenario)?.total)
    }

    /// 对比两个方案: delta = total(b) - total(a)
    #[instrument(skip(self))]
    pub fn compare(
        &self,
        baseline: &str,
        candidate: &str,
    ) -> Result<ComparisonOutcome, ScenarioError> {
        let baseline_name = self.require(baseline)?.name.clone();
        let candidate_name = self.require(candidate)?.name.clone();
        let baseline_total = self.total(&baseline_name)?;
        let candidate_total = self.total(&candidate_name)?;

        let outcome = match (baseline_total.value(), candidate_total.value()) {
            (Some(a), Some(b)) => ComparisonOutcome::Compared(ScenarioComparison::between(
                &baseline_name,
                a,
                &candidate_name,
                b,
            )),
            _ => {
                // 自比较时同一方案只列一次
                let sides = if baseline_name == candidate_name {
                    vec![(baseline_name, baseline_total)]
                } else {
                    vec![
                        (baseline_name, baseline_total),
                        (candidate_name, candidate_total),
                    ]
                };
                let scenarios = sides
                    .into_iter()
                    .filter_map(|(scenario, total)| match total {
                        ScenarioTotal::Invalid { failures } => {
                            Some(InvalidScenario { scenario, failures })
                        }
                        ScenarioTotal::Valid { .. } => None,
                    })
                    .collect();
                ComparisonOutcome::Invalid { scenarios }
            }
        };
        Ok(outcome)
    }

    /// 与基线对比
    pub fn compare_to_baseline(
        &self,
        candidate: &str,
    ) -> Result<ComparisonOutcome, ScenarioError> {
        self.compare(&self.baseline, candidate)
    }

    /// what-if 调整: 复制 base 方案,替换调整项后存为 target,并与 base 对比
    pub fn what_if<I, S>(
        &mut self,
        base: &str,
        target: &str,
        adjustments: I,
    ) -> Result<ComparisonOutcome, ScenarioError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let base_name = self.require(base)?.name.clone();
        if target.trim() == base_name {
            return Err(ScenarioError::WhatIfOverwritesBase(base_name));
        }
        let mut items = self.require(&base_name)?.items.clone();
        for (material, quantity) in adjustments {
            let key = normalize_material_key(material.as_ref());
            if !key.is_empty() {
                items.insert(key, quantity);
            }
        }

        self.set_items(target, items)?;
        self.compare(&base_name, target)
    }

    /// 对比图数据: 基线在前,其余按创建顺序
    pub fn comparison_series(&self) -> Vec<SeriesPoint> {
        self.scenarios
            .iter()
            .map(|s| SeriesPoint {
                scenario: s.name.clone(),
                is_baseline: s.name == self.baseline,
                total: self
                    .calculator
                    .compute_batch(s.items.iter().map(|(m, q)| (m.as_str(), *q)))
                    .total,
            })
            .collect()
    }
}
