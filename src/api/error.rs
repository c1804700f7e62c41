// ==========================================
// 温室气体排放计算 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/导入/配置错误
// 红线: 错误只携带结构化原因，不返回展示文案
// ==========================================

use crate::domain::scenario::TotalFailures;
use crate::engine::scenario::ScenarioError;
use crate::importer::error::ImportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 逐行校验失败（收集全部违规行）
    #[error("输入行校验失败: {} 行", .violations.len())]
    InvalidRows { violations: Vec<InputViolation> },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 计算错误
    // ==========================================
    #[error("合计无效: 缺因子={missing_factor:?}, 无法换算={unconvertible:?}")]
    CalculationFailed {
        missing_factor: Vec<String>,
        unconvertible: Vec<String>,
    },

    // ==========================================
    // 导入 / 配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 由无效合计的失败清单构造
    pub fn calculation_failed(failures: &TotalFailures) -> Self {
        ApiError::CalculationFailed {
            missing_factor: failures.missing_factor.clone(),
            unconvertible: failures
                .unconvertible
                .iter()
                .map(|u| u.material.clone())
                .collect(),
        }
    }
}

// ==========================================
// 从 ScenarioError 转换
// ==========================================
impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::NotFound(name) => ApiError::NotFound(format!("方案{}不存在", name)),
            ScenarioError::BlankName => {
                ApiError::InvalidInput("方案名称不能为空".to_string())
            }
            ScenarioError::BaselineRemoval(name) => {
                ApiError::BusinessRuleViolation(format!("基线方案{}只能清空，不能删除", name))
            }
            ScenarioError::WhatIfOverwritesBase(name) => ApiError::BusinessRuleViolation(
                format!("what-if 目标方案不能覆盖源方案{}", name),
            ),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// ConfigManager 返回 Box<dyn Error>
impl From<Box<dyn std::error::Error>> for ApiError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 输入违规详情
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputViolation {
    /// 行号（从 0 开始）
    pub row: usize,
    pub material: String,
    /// 违规类型（NEGATIVE_QUANTITY / NON_FINITE_QUANTITY）
    pub violation_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::line_item::UnresolvedReason;
    use crate::domain::scenario::UnconvertibleMaterial;

    #[test]
    fn test_from_scenario_error() {
        let err: ApiError = ScenarioError::BaselineRemoval("Current".to_string()).into();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        let err: ApiError = ScenarioError::BlankName.into();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_calculation_failed_lists_materials() {
        let failures = TotalFailures {
            missing_factor: vec!["unobtainium".to_string()],
            unconvertible: vec![UnconvertibleMaterial {
                material: "glass".to_string(),
                reason: UnresolvedReason::NoDensity,
            }],
        };
        match ApiError::calculation_failed(&failures) {
            ApiError::CalculationFailed {
                missing_factor,
                unconvertible,
            } => {
                assert_eq!(missing_factor, vec!["unobtainium"]);
                assert_eq!(unconvertible, vec!["glass"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_import_error() {
        let err: ApiError = ImportError::SheetNotFound("Input_EFs".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(msg) if msg.contains("Input_EFs")));
    }
}
