// ==========================================
// 钙线喂线系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行控制台调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod ledger_api;
pub mod payload;
pub mod prediction_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use ledger_api::{BalanceSummary, CoilInfo, InjectionLogInfo, LedgerApi};
pub use payload::{
    parse_coil_spec, parse_confirm_request, parse_heat_parameters, parse_heat_reference,
    ConfirmInjectionRequest,
};
pub use prediction_api::{PredictResponse, PredictionApi};
