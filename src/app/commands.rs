// ==========================================
// 钙线喂线系统 - 命令行控制台命令
// ==========================================
// 职责: 解析控制台命令，调用 API，输出 JSON
// 约定: 成功 → stdout JSON；失败 → stderr {code, message, details}，退出码非 0
// ==========================================

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::{ApiError, ApiResult};
use crate::api::payload::{parse_coil_spec, parse_confirm_request, parse_heat_parameters};
use crate::app::state::AppState;

// ==========================================
// 命令行定义
// ==========================================

/// 钙线喂线长度预测与线卷台账
#[derive(Debug, Parser)]
#[command(name = "ca-wire", version, about = "钙线喂线长度预测与线卷台账")]
pub struct Cli {
    /// 数据库路径（默认: CA_WIRE_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// 激活线卷余量状态
    Status,

    /// 全部线卷
    Coils,

    /// 预测喂线长度，参数为 JSON（tonnage, freeboard, temp, al, s, si, p_before, p_initial, speed）
    Predict {
        json: String,
        /// 输出逐条规则修正明细与说明
        #[arg(long)]
        detail: bool,
    },

    /// 确认喂线，参数为 JSON（coil_number, length_used, heat_id?, lf_number? + 炉次参数）
    Confirm { json: String },

    /// 切换/新建线卷，参数为 JSON（coil_number, total_length, density, recovery_target, target_ppm）
    SwitchCoil { json: String },

    /// 最近的喂线日志
    Logs {
        limit: Option<usize>,
        /// 仅查询指定线卷
        #[arg(long)]
        coil: Option<String>,
    },

    /// 清空喂线日志
    ClearLogs,

    /// 生效配置
    Config,

    /// 更新配置
    ConfigSet { key: String, value: String },
}

// ==========================================
// 命令执行
// ==========================================

/// 命令执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub output: Value,
    /// false 时以非 0 退出码结束（输出仍写 stdout）
    pub success: bool,
}

impl CommandOutcome {
    fn ok(output: Value) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

/// 执行单条命令
pub fn execute(state: &AppState, command: &Command) -> ApiResult<CommandOutcome> {
    let _perf = crate::perf::PerfGuard::new(command_name(command));

    match command {
        Command::Status => {
            let summary = state.ledger_api.get_balance_summary()?;
            Ok(CommandOutcome::ok(to_value(&summary)?))
        }
        Command::Coils => {
            let coils = state.ledger_api.list_coils()?;
            Ok(CommandOutcome::ok(to_value(&coils)?))
        }
        Command::Predict { json, detail } => {
            let payload = parse_json_arg(json)?;
            if *detail {
                let params = parse_heat_parameters(&payload)?;
                let prediction = state.prediction_api.predict(&params)?;
                let mut output = to_value(&prediction)?;
                output["explanation"] = serde_json::from_str(&prediction.explain())
                    .map_err(|e| ApiError::InternalError(format!("修正说明解析失败: {}", e)))?;
                Ok(CommandOutcome::ok(output))
            } else {
                let response = state.prediction_api.predict_request(&payload);
                Ok(CommandOutcome {
                    success: response.success,
                    output: to_value(&response)?,
                })
            }
        }
        Command::Confirm { json } => {
            let request = parse_confirm_request(&parse_json_arg(json)?)?;
            let log = state.ledger_api.confirm_request(request)?;
            Ok(CommandOutcome::ok(to_value(&log)?))
        }
        Command::SwitchCoil { json } => {
            let spec = parse_coil_spec(&parse_json_arg(json)?)?;
            let result = state.ledger_api.switch_or_create_coil(spec)?;
            Ok(CommandOutcome::ok(to_value(&result)?))
        }
        Command::Logs { limit, coil } => {
            let logs = match coil {
                Some(coil_number) => state.ledger_api.list_logs_by_coil(coil_number, *limit)?,
                None => state.ledger_api.list_recent_logs(*limit)?,
            };
            Ok(CommandOutcome::ok(to_value(&logs)?))
        }
        Command::ClearLogs => {
            let deleted = state.ledger_api.clear_logs()?;
            Ok(CommandOutcome::ok(json!({ "deleted": deleted })))
        }
        Command::Config => {
            let config = state.config_api.get_effective_config()?;
            Ok(CommandOutcome::ok(config))
        }
        Command::ConfigSet { key, value } => {
            state.config_api.update_config(key, value)?;
            Ok(CommandOutcome::ok(json!({ "key": key, "value": value })))
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Status => "cli.status",
        Command::Coils => "cli.coils",
        Command::Predict { .. } => "cli.predict",
        Command::Confirm { .. } => "cli.confirm",
        Command::SwitchCoil { .. } => "cli.switch_coil",
        Command::Logs { .. } => "cli.logs",
        Command::ClearLogs => "cli.clear_logs",
        Command::Config => "cli.config",
        Command::ConfigSet { .. } => "cli.config_set",
    }
}

fn parse_json_arg(raw: &str) -> ApiResult<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::InvalidInput(format!("JSON格式错误: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::InvalidInput("参数必须为JSON对象".to_string()));
    }
    Ok(value)
}

fn to_value<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::InternalError(format!("序列化失败: {}", e)))
}

// ==========================================
// 错误输出
// ==========================================

/// 错误响应（写入 stderr）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 将ApiError转换为错误响应
pub fn map_api_error(err: &ApiError) -> ErrorResponse {
    ErrorResponse {
        code: match err {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
        .to_string(),
        message: err.to_string(),
        details: None,
    }
}

/// 将ApiError转换为JSON字符串
pub fn api_error_json(err: &ApiError) -> String {
    serde_json::to_string(&map_api_error(err)).unwrap_or_else(|_| err.to_string())
}
