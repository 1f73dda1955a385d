// ==========================================
// 钙线喂线系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id='global')
// 约定: 未配置或格式错误时回退默认值（格式错误记 warn）
// ==========================================

use crate::db::DATETIME_FORMAT;
use crate::domain::coil::CoilDefaults;
use crate::engine::DEFAULT_LOW_BALANCE_PCT;
use rusqlite::{params, Connection};
use serde_json::json;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 日志查询默认条数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    ///
    /// 调用方负责校验键与值的合法性
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let now = chrono::Local::now()
            .naive_local()
            .format(DATETIME_FORMAT)
            .to_string();

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取生效配置（已存储值 + 默认值）
    pub fn get_effective_config(&self) -> Result<serde_json::Value, Box<dyn Error>> {
        let defaults = self.get_coil_defaults()?;
        Ok(json!({
            (config_keys::DEFAULT_COIL_NUMBER): defaults.coil_number,
            (config_keys::DEFAULT_TOTAL_LENGTH_M): defaults.total_length_m,
            (config_keys::DEFAULT_DENSITY_G_PER_M): defaults.density_g_per_m,
            (config_keys::DEFAULT_TARGET_PPM): defaults.target_ppm,
            (config_keys::DEFAULT_RECOVERY_PCT): defaults.recovery_pct,
            (config_keys::LOW_BALANCE_PCT): self.get_low_balance_pct()?,
            (config_keys::HISTORY_LIMIT): self.get_history_limit()?,
        }))
    }

    // ===== 线卷默认值 =====

    /// 获取自举用默认线卷参数
    pub fn get_coil_defaults(&self) -> Result<CoilDefaults, Box<dyn Error>> {
        let fallback = CoilDefaults::default();

        let coil_number = self
            .get_config_value(config_keys::DEFAULT_COIL_NUMBER)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback.coil_number);

        Ok(CoilDefaults {
            coil_number,
            total_length_m: self
                .get_f64_or_default(config_keys::DEFAULT_TOTAL_LENGTH_M, fallback.total_length_m)?,
            density_g_per_m: self
                .get_f64_or_default(config_keys::DEFAULT_DENSITY_G_PER_M, fallback.density_g_per_m)?,
            target_ppm: self.get_f64_or_default(config_keys::DEFAULT_TARGET_PPM, fallback.target_ppm)?,
            recovery_pct: self
                .get_f64_or_default(config_keys::DEFAULT_RECOVERY_PCT, fallback.recovery_pct)?,
        })
    }

    // ===== 余量预警 =====

    /// 获取低余量预警比例 (%)
    pub fn get_low_balance_pct(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(config_keys::LOW_BALANCE_PCT, DEFAULT_LOW_BALANCE_PCT)
    }

    // ===== 日志 =====

    /// 获取日志查询默认条数
    pub fn get_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        let value = match self.get_config_value(config_keys::HISTORY_LIMIT)? {
            Some(v) => v,
            None => return Ok(DEFAULT_HISTORY_LIMIT),
        };

        match value.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => {
                tracing::warn!(
                    config_key = config_keys::HISTORY_LIMIT,
                    raw_value = %value,
                    "日志条数配置格式错误，使用默认值"
                );
                Ok(DEFAULT_HISTORY_LIMIT)
            }
        }
    }

    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 默认线卷（空库自举）
    pub const DEFAULT_COIL_NUMBER: &str = "default_coil_number";
    pub const DEFAULT_TOTAL_LENGTH_M: &str = "default_total_length_m";
    pub const DEFAULT_DENSITY_G_PER_M: &str = "default_density_g_per_m";
    pub const DEFAULT_TARGET_PPM: &str = "default_target_ppm";
    pub const DEFAULT_RECOVERY_PCT: &str = "default_recovery_pct";

    // 余量预警
    pub const LOW_BALANCE_PCT: &str = "low_balance_pct";

    // 日志
    pub const HISTORY_LIMIT: &str = "history_limit";

    /// 全部可配置键
    pub const ALL: [&str; 7] = [
        DEFAULT_COIL_NUMBER,
        DEFAULT_TOTAL_LENGTH_M,
        DEFAULT_DENSITY_G_PER_M,
        DEFAULT_TARGET_PPM,
        DEFAULT_RECOVERY_PCT,
        LOW_BALANCE_PCT,
        HISTORY_LIMIT,
    ];

    pub fn is_known(key: &str) -> bool {
        ALL.contains(&key)
    }
}
