// ==========================================
// 钙线喂线系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod coil_balance;
pub mod error;
pub mod wire_length;

// 重导出核心引擎
pub use coil_balance::{CoilBalanceEngine, DEFAULT_LOW_BALANCE_PCT};
pub use error::{EngineError, EngineResult};
pub use wire_length::{RuleAdjustment, WireLengthEngine, WirePrediction};
