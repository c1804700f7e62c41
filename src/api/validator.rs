// ==========================================
// 温室气体排放计算 - 输入校验器
// ==========================================
// 职责: 调用方输入在进入计算核心前的校验
// 规则:
// - 行数不超过 max_input_rows
// - 数量必须有限且 >= 0
// - 方案名 trim 后不能为空
// ==========================================

use crate::api::error::{ApiError, ApiResult, InputViolation};
use serde::{Deserialize, Serialize};

// ==========================================
// InputRow - 输入行（材料 + 数量）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    pub material: String,
    pub quantity: f64,
}

impl InputRow {
    pub fn new(material: &str, quantity: f64) -> Self {
        Self {
            material: material.to_string(),
            quantity,
        }
    }
}

pub struct InputValidator {
    max_rows: usize,
}

impl InputValidator {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// 校验输入行（收集全部违规行后统一返回）
    pub fn validate_rows(&self, rows: &[InputRow]) -> ApiResult<()> {
        if rows.len() > self.max_rows {
            return Err(ApiError::InvalidInput(format!(
                "输入行数{}超过上限{}",
                rows.len(),
                self.max_rows
            )));
        }

        let violations: Vec<InputViolation> = rows
            .iter()
            .enumerate()
            .filter_map(|(row, input)| {
                quantity_violation(input.quantity).map(|violation_type| InputViolation {
                    row,
                    material: input.material.clone(),
                    violation_type: violation_type.to_string(),
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::InvalidRows { violations })
        }
    }

    pub fn validate_quantity(&self, material: &str, quantity: f64) -> ApiResult<()> {
        match quantity_violation(quantity) {
            None => Ok(()),
            Some(violation_type) => Err(ApiError::InvalidRows {
                violations: vec![InputViolation {
                    row: 0,
                    material: material.to_string(),
                    violation_type: violation_type.to_string(),
                }],
            }),
        }
    }

    /// 校验方案名,返回 trim 后的名称
    pub fn validate_scenario_name(&self, name: &str) -> ApiResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("方案名称不能为空".to_string()));
        }
        Ok(trimmed.to_string())
    }
}

fn quantity_violation(quantity: f64) -> Option<&'static str> {
    if !quantity.is_finite() {
        Some("NON_FINITE_QUANTITY")
    } else if quantity < 0.0 {
        Some("NEGATIVE_QUANTITY")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_over_limit() {
        let validator = InputValidator::new(2);
        let rows = vec![InputRow::new("a", 1.0); 3];
        assert!(matches!(
            validator.validate_rows(&rows),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_collects_all_bad_rows() {
        let validator = InputValidator::new(50);
        let rows = vec![
            InputRow::new("steel", -1.0),
            InputRow::new("copper", 2.0),
            InputRow::new("pvc", f64::NAN),
        ];
        match validator.validate_rows(&rows) {
            Err(ApiError::InvalidRows { violations }) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].row, 0);
                assert_eq!(violations[0].violation_type, "NEGATIVE_QUANTITY");
                assert_eq!(violations[1].row, 2);
                assert_eq!(violations[1].violation_type, "NON_FINITE_QUANTITY");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_quantity_and_blank_material_are_accepted() {
        let validator = InputValidator::new(50);
        let rows = vec![InputRow::new("", 0.0), InputRow::new("steel", 0.0)];
        assert!(validator.validate_rows(&rows).is_ok());
    }

    #[test]
    fn test_scenario_name() {
        let validator = InputValidator::new(50);
        assert_eq!(validator.validate_scenario_name("  Design A ").unwrap(), "Design A");
        assert!(validator.validate_scenario_name("   ").is_err());
    }
}
