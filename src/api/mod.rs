// ==========================================
// 温室气体排放计算 - API 层
// ==========================================
// 职责: 提供会话级排放计算接口,供界面调用方使用
// ==========================================

pub mod emission_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use emission_api::{CalculationReport, EmissionApi};
pub use error::{ApiError, ApiResult, InputViolation};
pub use validator::{InputRow, InputValidator};
