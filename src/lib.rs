// ==========================================
// 钙线喂线系统 - 核心库
// ==========================================
// 职责: LF 精炼钙线喂线长度预测 + 线卷台账
// 技术栈: Rust + SQLite
// 系统定位: 操作辅助（人工确认后才扣减线卷）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 命令耗时与慢 SQL 统计
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 命令行控制台
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BalanceStatus, CorrectionRule};

// 领域实体
pub use domain::{CoilConfig, CoilDefaults, CoilSpec, HeatParameters, HeatReference, InjectionLog};

// 引擎
pub use engine::{CoilBalanceEngine, EngineError, RuleAdjustment, WireLengthEngine, WirePrediction};

// API
pub use api::{ApiError, ConfigApi, LedgerApi, PredictResponse, PredictionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钙线喂线长度预测系统";

// 数据库版本
pub const DB_VERSION: &str = "v1";
