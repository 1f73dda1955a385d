// ==========================================
// 钙线喂线系统 - 命令行主入口
// ==========================================
// 技术栈: Rust + SQLite
// 输出: stdout 为命令结果 JSON，stderr 为日志与错误 JSON
// ==========================================

use std::process::ExitCode;

use ca_wire_injection::api::ApiError;
use ca_wire_injection::app::{api_error_json, execute, get_default_db_path, AppState, Cli};
use clap::error::ErrorKind;
use clap::Parser;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", api_error_json(&ApiError::InvalidInput(e.to_string())));
            return ExitCode::from(2);
        }
    };

    ca_wire_injection::logging::init();

    tracing::debug!(
        "{} v{} (db schema {})",
        ca_wire_injection::APP_NAME,
        ca_wire_injection::VERSION,
        ca_wire_injection::DB_VERSION
    );

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            eprintln!("{}", api_error_json(&ApiError::DatabaseConnectionError(e)));
            return ExitCode::from(2);
        }
    };

    match execute(&state, &cli.command) {
        Ok(outcome) => {
            match serde_json::to_string_pretty(&outcome.output) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("{}", api_error_json(&ApiError::InternalError(e.to_string())));
                    return ExitCode::FAILURE;
                }
            }
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("{}", api_error_json(&e));
            ExitCode::FAILURE
        }
    }
}
