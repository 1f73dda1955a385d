// ==========================================
// 钙线喂线系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、监控接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod coil;
pub mod heat;
pub mod injection_log;
pub mod types;

// 重导出核心类型
pub use coil::{CoilBalanceMonitor, CoilConfig, CoilDefaults, CoilSpec};
pub use heat::{HeatParameters, HeatReference};
pub use injection_log::InjectionLog;
pub use types::{BalanceStatus, CorrectionRule};
