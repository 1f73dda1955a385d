// ==========================================
// 钙线喂线系统 - 应用层
// ==========================================
// 职责: 组装共享状态，提供命令行控制台
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{api_error_json, execute, map_api_error, Cli, Command, CommandOutcome, ErrorResponse};
pub use state::{get_default_db_path, AppState};
