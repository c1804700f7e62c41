// ==========================================
// 温室气体排放计算 - 阈值判定
// ==========================================
// 职责: 合计排放 vs 阈值 → 低于 / 等于 / 高于
// ==========================================

use crate::domain::scenario::ScenarioTotal;
use crate::domain::types::ThresholdStatus;

/// 默认阈值 (kg CO₂-eq)
pub const DEFAULT_THRESHOLD_KG: f64 = 1000.0;

pub struct ThresholdEvaluator {
    threshold_kg: f64,
}

impl ThresholdEvaluator {
    /// 阈值非有限或为负时回退到默认阈值
    pub fn new(threshold_kg: f64) -> Self {
        let threshold_kg = if threshold_kg.is_finite() && threshold_kg >= 0.0 {
            threshold_kg
        } else {
            DEFAULT_THRESHOLD_KG
        };
        Self { threshold_kg }
    }

    pub fn threshold_kg(&self) -> f64 {
        self.threshold_kg
    }

    pub fn evaluate(&self, total_kg: f64) -> ThresholdStatus {
        if total_kg < self.threshold_kg {
            ThresholdStatus::Below
        } else if total_kg > self.threshold_kg {
            ThresholdStatus::Above
        } else {
            ThresholdStatus::At
        }
    }

    /// Invalid 合计没有阈值状态
    pub fn evaluate_total(&self, total: &ScenarioTotal) -> Option<ThresholdStatus> {
        total.value().map(|v| self.evaluate(v))
    }
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_KG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::TotalFailures;

    #[test]
    fn test_strict_comparison() {
        let evaluator = ThresholdEvaluator::default();
        assert_eq!(evaluator.evaluate(999.99), ThresholdStatus::Below);
        assert_eq!(evaluator.evaluate(1000.0), ThresholdStatus::At);
        assert_eq!(evaluator.evaluate(1000.01), ThresholdStatus::Above);
    }

    #[test]
    fn test_invalid_threshold_falls_back() {
        assert_eq!(ThresholdEvaluator::new(-5.0).threshold_kg(), DEFAULT_THRESHOLD_KG);
        assert_eq!(ThresholdEvaluator::new(f64::NAN).threshold_kg(), DEFAULT_THRESHOLD_KG);
        assert_eq!(ThresholdEvaluator::new(0.0).threshold_kg(), 0.0);
    }

    #[test]
    fn test_invalid_total_has_no_status() {
        let evaluator = ThresholdEvaluator::new(10.0);
        let invalid = ScenarioTotal::Invalid {
            failures: TotalFailures::default(),
        };
        assert_eq!(evaluator.evaluate_total(&invalid), None);
        let valid = ScenarioTotal::Valid { total_kg_co2e: 0.0 };
        assert_eq!(evaluator.evaluate_total(&valid), Some(ThresholdStatus::Below));
    }
}
