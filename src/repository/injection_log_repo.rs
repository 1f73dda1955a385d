// ==========================================
// 钙线喂线系统 - 喂线日志数据仓储
// ==========================================
// 对齐: injection_log 表
// 红线: 扣减余量与写日志在同一事务内完成
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::InjectionLogRepository;
