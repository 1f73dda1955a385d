// ==========================================
// 钙线喂线系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, LedgerApi, PredictionApi};
use crate::config::config_manager::ConfigManager;
use crate::repository::{CoilConfigRepository, InjectionLogRepository};

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 线卷台账API
    pub ledger_api: Arc<LedgerApi>,

    /// 喂线长度预测API
    pub prediction_api: Arc<PredictionApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（`:memory:` 为内存库）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并确保表结构存在
    /// 2. 初始化Repository与配置管理器
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        let schema_version = crate::db::read_schema_version(&conn)
            .map_err(|e| format!("无法读取schema_version: {}", e))?;
        if let Some(version) = schema_version.filter(|v| *v > crate::db::CURRENT_SCHEMA_VERSION) {
            return Err(format!(
                "数据库schema_version={}，高于程序支持的版本{}",
                version,
                crate::db::CURRENT_SCHEMA_VERSION
            ));
        }
        tracing::debug!(schema_version = ?schema_version, "数据库表结构已就绪");

        crate::perf::install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let coil_repo = Arc::new(CoilConfigRepository::new(conn.clone()));
        let log_repo = Arc::new(InjectionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let ledger_api = Arc::new(LedgerApi::new(
            coil_repo,
            log_repo,
            config_manager.clone(),
        ));
        let prediction_api = Arc::new(PredictionApi::new(ledger_api.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            ledger_api,
            prediction_api,
            config_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 获取默认数据库路径
///
/// 优先级：
/// 1. 环境变量 CA_WIRE_DB_PATH
/// 2. 用户数据目录 /ca-wire/ca_wire.db
/// 3. 当前目录 ./ca_wire.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CA_WIRE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./ca_wire.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("ca-wire");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("ca_wire.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
