// ==========================================
// 钙线喂线系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、快照
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================

/// 配置管理API
///
/// 职责：
/// 1. 生效配置查询（已存储值 + 默认值）
/// 2. 配置更新（仅允许已知键，数值键必须为有效数值）
/// 3. 配置快照
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    /// 创建新的ConfigApi实例
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询生效配置
    pub fn get_effective_config(&self) -> ApiResult<serde_json::Value> {
        self.config_manager
            .get_effective_config()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 更新单个配置
    ///
    /// # 参数
    /// - key: 配置键（见 config_keys::ALL）
    /// - value: 配置值
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        let value = value.trim();

        if !config_keys::is_known(key) {
            return Err(ApiError::InvalidInput(format!("未知配置键: {}", key)));
        }
        if value.is_empty() {
            return Err(ApiError::InvalidInput("配置值不能为空".to_string()));
        }
        validate_value(key, value)?;

        self.config_manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}

fn validate_value(key: &str, value: &str) -> ApiResult<()> {
    match key {
        config_keys::DEFAULT_COIL_NUMBER => Ok(()),
        config_keys::HISTORY_LIMIT => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(ApiError::InvalidInput(format!(
                "{}必须为正整数: {}",
                key, value
            ))),
        },
        _ => match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(()),
            _ => Err(ApiError::InvalidInput(format!(
                "{}必须为有效数值: {}",
                key, value
            ))),
        },
    }
}
