// ==========================================
// 钙线喂线系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 炉次参数缺失或不是有效数值
    #[error("无效输入 (field={field}): {message}")]
    InvalidInput { field: String, message: String },

    /// 线卷配置不可用于计算（密度/收得率为 0 等）
    #[error("线卷配置错误 (field={field}, value={value}): 请先修正线卷参数")]
    Configuration { field: String, value: f64 },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
