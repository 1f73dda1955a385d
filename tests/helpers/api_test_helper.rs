// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use ca_wire_injection::api::{ConfigApi, LedgerApi, PredictionApi};
use ca_wire_injection::config::config_manager::ConfigManager;
use ca_wire_injection::repository::{CoilConfigRepository, InjectionLogRepository};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub ledger_api: Arc<LedgerApi>,
    pub prediction_api: Arc<PredictionApi>,
    pub config_api: Arc<ConfigApi>,

    // Repository层（用于测试数据准备与校验）
    pub coil_repo: Arc<CoilConfigRepository>,
    pub log_repo: Arc<InjectionLogRepository>,
    pub config_manager: Arc<ConfigManager>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 初始化所有Repository和API
    pub fn new() -> Result<Self, String> {
        ca_wire_injection::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = ca_wire_injection::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
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
            coil_repo.clone(),
            log_repo.clone(),
            config_manager.clone(),
        ));
        let prediction_api = Arc::new(PredictionApi::new(ledger_api.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone()));

        Ok(Self {
            db_path,
            ledger_api,
            prediction_api,
            config_api,
            coil_repo,
            log_repo,
            config_manager,
            _temp_file: temp_file,
        })
    }

    /// 激活线卷中标记为激活的数量
    pub fn active_coil_count(&self) -> usize {
        self.coil_repo
            .list_all()
            .expect("查询线卷失败")
            .iter()
            .filter(|c| c.is_active)
            .count()
    }
}
