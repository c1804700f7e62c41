// ==========================================
// 日志系统初始化
// ==========================================
// 文本输出供命令行演示,JSON 行输出供日志采集
// 过滤器统一读取 RUST_LOG,缺省 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

// 本 crate 的建库剔除告警、换算失败诊断均在 debug 级
const TEST_FILTER: &str = "ghg_emissions_calc=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化文本日志
///
/// # 环境变量
/// - RUST_LOG: 例如 RUST_LOG=ghg_emissions_calc::engine=trace
///
/// # 示例
/// ```no_run
/// use ghg_emissions_calc::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 以 JSON 行输出日志（GHG_LOG_FORMAT=json 时由 main 选用）
pub fn init_json() {
    fmt().json().with_env_filter(env_filter()).with_target(true).init();
}

/// 集成测试用: 输出本 crate 的 debug 日志,经测试捕获器打印
///
/// 每个测试都可调用,重复初始化被忽略
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_FILTER))
        .with_test_writer()
        .try_init();
}
