// ==========================================
// 钙线喂线系统 - 线卷台账 API
// ==========================================
// 职责: 激活线卷查询/自举、线卷切换、喂线确认、日志查询与清空
// 红线: 所有写操作在仓储事务内完成，失败不留部分状态
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::payload::ConfirmInjectionRequest;
use crate::config::ConfigManager;
use crate::domain::coil::{CoilBalanceMonitor, CoilConfig, CoilSpec};
use crate::domain::heat::{HeatParameters, HeatReference};
use crate::domain::injection_log::InjectionLog;
use crate::domain::types::BalanceStatus;
use crate::engine::CoilBalanceEngine;
use crate::repository::coil_repo::{CoilConfigRepository, CoilSwitchResult};
use crate::repository::injection_log_repo::InjectionLogRepository;

// ==========================================
// LedgerApi - 线卷台账 API
// ==========================================

/// 线卷台账API
///
/// 职责：
/// 1. 激活线卷查询（空库时按配置默认值自举）
/// 2. 线卷切换/新建
/// 3. 喂线确认（扣减余量 + 追加日志）
/// 4. 日志查询、计数与清空
/// 5. 余量状态汇总
pub struct LedgerApi {
    coil_repo: Arc<CoilConfigRepository>,
    log_repo: Arc<InjectionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl LedgerApi {
    /// 创建新的LedgerApi实例
    pub fn new(
        coil_repo: Arc<CoilConfigRepository>,
        log_repo: Arc<InjectionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            coil_repo,
            log_repo,
            config_manager,
        }
    }

    // ==========================================
    // 线卷
    // ==========================================

    /// 获取当前激活线卷
    ///
    /// 无激活线卷时：激活最早创建的线卷；空库则按配置默认值新建。幂等。
    pub fn get_active_coil(&self) -> ApiResult<CoilConfig> {
        let defaults = self
            .config_manager
            .get_coil_defaults()
            .map_err(|e| ApiError::InternalError(format!("读取默认线卷配置失败: {}", e)))?;

        Ok(self.coil_repo.ensure_active(&defaults)?)
    }

    /// 切换到指定线卷，不存在则新建
    ///
    /// # 参数
    /// - spec: 线卷编号（去首尾空白，不能为空）与工艺参数（必须为有效数值）
    ///
    /// # 返回
    /// - Ok(CoilSwitchResult): 激活后的线卷 + 是否新建 + 是否重置余量
    pub fn switch_or_create_coil(&self, spec: CoilSpec) -> ApiResult<CoilSwitchResult> {
        let coil_number = spec.coil_number.trim().to_string();
        if coil_number.is_empty() {
            return Err(ApiError::InvalidInput("线卷编号不能为空".to_string()));
        }

        for (field, value) in [
            ("total_length", spec.total_length_m),
            ("density", spec.density_g_per_m),
            ("recovery_target", spec.recovery_pct),
            ("target_ppm", spec.target_ppm),
        ] {
            if !value.is_finite() {
                return Err(ApiError::InvalidInput(format!(
                    "字段{}不是有效数值: {}",
                    field, value
                )));
            }
        }

        let spec = CoilSpec {
            coil_number,
            ..spec
        };
        let result = self.coil_repo.switch_or_create(&spec)?;

        tracing::info!(
            coil_number = %result.coil.coil_number,
            created = result.created,
            balance_reset = result.balance_reset,
            current_length_m = result.coil.current_length_m,
            "线卷已切换"
        );

        Ok(result)
    }

    /// 查询全部线卷
    pub fn list_coils(&self) -> ApiResult<Vec<CoilInfo>> {
        let coils = self.coil_repo.list_all()?;
        Ok(coils.into_iter().map(CoilInfo::from).collect())
    }

    /// 获取激活线卷的余量状态汇总
    pub fn get_balance_summary(&self) -> ApiResult<BalanceSummary> {
        let coil = self.get_active_coil()?;
        let engine = self.balance_engine()?;
        let low_balance_pct = engine.low_balance_pct();
        let (status, reason) = engine.check_balance_status(&coil);
        let log_count = self.log_repo.count()?;

        Ok(BalanceSummary {
            coil: CoilInfo::from(coil),
            status,
            reason,
            low_balance_pct,
            log_count,
        })
    }

    // ==========================================
    // 喂线确认
    // ==========================================

    /// 确认喂线
    ///
    /// # 参数
    /// - coil_number: 计算时使用的线卷编号（必须仍是激活线卷）
    /// - length_used_m: 实际喂线长度，必须 > 0
    /// - heat: 炉号/LF工位号（可选）
    /// - params: 炉次参数快照
    ///
    /// # 返回
    /// - Ok(InjectionLogInfo): 已写入的日志
    /// - Err(InvalidInput): 长度 ≤ 0 或参数无效
    /// - Err(BusinessRuleViolation): 线卷已不是激活线卷
    ///
    /// # 说明
    /// 余量不截断为 0，可为负（提示更换线卷）
    pub fn confirm_injection(
        &self,
        coil_number: &str,
        length_used_m: f64,
        heat: HeatReference,
        params: HeatParameters,
    ) -> ApiResult<InjectionLogInfo> {
        let coil_number = coil_number.trim();
        if coil_number.is_empty() {
            return Err(ApiError::InvalidInput("线卷编号不能为空".to_string()));
        }
        if !length_used_m.is_finite() || length_used_m <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "喂线长度必须大于0: {}",
                length_used_m
            )));
        }
        if let Some(field) = params.first_non_finite() {
            return Err(ApiError::InvalidInput(format!(
                "字段{}不是有效数值",
                field
            )));
        }

        // 空库时先完成自举，保证默认线卷可直接确认
        let active = self.get_active_coil()?;
        let projected = self
            .balance_engine()?
            .predict_status_after_injection(&active, length_used_m);

        let log = self
            .log_repo
            .record_injection(coil_number, length_used_m, &heat, &params)?;

        tracing::info!(
            log_id = %log.log_id,
            coil_number = %log.coil_number,
            length_used_m = log.length_used_m,
            balance_after_m = log.balance_after_m,
            "喂线已确认"
        );
        match projected {
            BalanceStatus::Depleted => tracing::warn!(
                coil_number = %log.coil_number,
                balance_after_m = log.balance_after_m,
                "线卷余量已耗尽，请更换线卷"
            ),
            BalanceStatus::Low => tracing::warn!(
                coil_number = %log.coil_number,
                balance_after_m = log.balance_after_m,
                "线卷余量偏低，请准备换卷"
            ),
            BalanceStatus::Normal => {}
        }

        Ok(InjectionLogInfo::from(log))
    }

    /// 按已解析的请求确认喂线
    pub fn confirm_request(&self, request: ConfirmInjectionRequest) -> ApiResult<InjectionLogInfo> {
        self.confirm_injection(
            &request.coil_number,
            request.length_used_m,
            request.heat,
            request.params,
        )
    }

    // ==========================================
    // 日志
    // ==========================================

    /// 查询最近的喂线日志（新 → 旧）
    ///
    /// # 参数
    /// - limit: 条数，None 时使用配置值（默认 50）
    pub fn list_recent_logs(&self, limit: Option<usize>) -> ApiResult<Vec<InjectionLogInfo>> {
        let limit = self.resolve_limit(limit)?;
        let logs = self.log_repo.find_recent(limit)?;
        Ok(logs.into_iter().map(InjectionLogInfo::from).collect())
    }

    /// 查询指定线卷的喂线日志（新 → 旧）
    pub fn list_logs_by_coil(
        &self,
        coil_number: &str,
        limit: Option<usize>,
    ) -> ApiResult<Vec<InjectionLogInfo>> {
        if coil_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("线卷编号不能为空".to_string()));
        }
        let limit = self.resolve_limit(limit)?;
        let logs = self
            .log_repo
            .find_by_coil_number(coil_number.trim(), limit)?;
        Ok(logs.into_iter().map(InjectionLogInfo::from).collect())
    }

    /// 按日志ID查询
    pub fn get_log(&self, log_id: &str) -> ApiResult<InjectionLogInfo> {
        self.log_repo
            .find_by_id(log_id)?
            .map(InjectionLogInfo::from)
            .ok_or_else(|| ApiError::NotFound(format!("喂线日志(id={})不存在", log_id)))
    }

    /// 日志总数
    pub fn count_logs(&self) -> ApiResult<i64> {
        Ok(self.log_repo.count()?)
    }

    /// 清空全部日志（线卷余量不变）
    ///
    /// # 返回
    /// - Ok(usize): 删除的条数
    pub fn clear_logs(&self) -> ApiResult<usize> {
        let deleted = self.log_repo.delete_all()?;
        tracing::info!(deleted = deleted, "喂线日志已清空");
        Ok(deleted)
    }

    fn balance_engine(&self) -> ApiResult<CoilBalanceEngine> {
        let low_balance_pct = self
            .config_manager
            .get_low_balance_pct()
            .map_err(|e| ApiError::InternalError(format!("读取预警比例失败: {}", e)))?;
        Ok(CoilBalanceEngine::new(low_balance_pct))
    }

    fn resolve_limit(&self, limit: Option<usize>) -> ApiResult<usize> {
        match limit {
            Some(0) => Err(ApiError::InvalidInput("查询条数必须大于0".to_string())),
            Some(n) => Ok(n),
            None => self
                .config_manager
                .get_history_limit()
                .map_err(|e| ApiError::InternalError(format!("读取日志条数配置失败: {}", e))),
        }
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 线卷信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoilInfo {
    /// 线卷编号
    pub coil_number: String,

    pub total_length_m: f64,
    pub current_length_m: f64,
    pub consumed_length_m: f64,

    /// 余量百分比
    pub balance_pct: f64,

    pub density_g_per_m: f64,
    pub target_ppm: f64,
    pub recovery_pct: f64,
    pub heats_treated: i64,
    pub is_active: bool,

    pub created_at: String,
    pub updated_at: String,
}

impl From<CoilConfig> for CoilInfo {
    fn from(coil: CoilConfig) -> Self {
        Self {
            balance_pct: coil.balance_pct(),
            consumed_length_m: coil.consumed_length_m(),
            coil_number: coil.coil_number,
            total_length_m: coil.total_length_m,
            current_length_m: coil.current_length_m,
            density_g_per_m: coil.density_g_per_m,
            target_ppm: coil.target_ppm,
            recovery_pct: coil.recovery_pct,
            heats_treated: coil.heats_treated,
            is_active: coil.is_active,
            created_at: coil.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: coil.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// 余量状态汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub coil: CoilInfo,
    pub status: BalanceStatus,
    /// 状态原因 (JSON)
    pub reason: String,
    pub low_balance_pct: f64,
    pub log_count: i64,
}

/// 喂线日志信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionLogInfo {
    pub log_id: String,
    pub display_id: String,
    pub injected_at: String,
    pub coil_number: String,
    pub length_used_m: f64,
    pub balance_after_m: f64,
    pub heat_id: Option<String>,
    pub lf_number: Option<String>,
    /// 参数快照
    pub params: HeatParameters,
}

impl From<InjectionLog> for InjectionLogInfo {
    fn from(log: InjectionLog) -> Self {
        Self {
            display_id: log.get_display_id(),
            injected_at: log.injected_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            log_id: log.log_id,
            coil_number: log.coil_number,
            length_used_m: log.length_used_m,
            balance_after_m: log.balance_after_m,
            heat_id: log.heat.heat_id,
            lf_number: log.heat.lf_number,
            params: log.params,
        }
    }
}
