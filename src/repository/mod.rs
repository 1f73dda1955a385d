// ==========================================
// 钙线喂线系统 - 数据仓储层
// ==========================================
// 红线: Repository 不拼业务规则，只做数据映射与事务边界
// 约束: 所有查询使用参数化
// ==========================================

pub mod coil_repo;
pub mod error;
pub mod injection_log_repo;

// 重导出核心仓储
pub use coil_repo::{CoilConfigRepository, CoilSwitchResult};
pub use error::{RepositoryError, RepositoryResult};
pub use injection_log_repo::InjectionLogRepository;
