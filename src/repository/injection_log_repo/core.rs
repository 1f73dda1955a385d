use crate::db::DATETIME_FORMAT;
use crate::domain::heat::{HeatParameters, HeatReference};
use crate::domain::injection_log::InjectionLog;
use crate::repository::coil_repo;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// InjectionLogRepository - 喂线日志仓储
// ==========================================
pub struct InjectionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InjectionLogRepository {
    /// 创建新的喂线日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 确认喂线：扣减激活线卷余量并追加日志
    ///
    /// # 参数
    /// - `coil_number`: 调用方认为的激活线卷（与库中不一致则拒绝）
    /// - `length_used_m`: 实际喂线长度（调用方已校验 > 0）
    ///
    /// # 返回
    /// - `Ok(log)`: 已写入的日志（含 log_seq 与喂线后余量）
    /// - `Err(BusinessRuleViolation)`: 无激活线卷或线卷编号已过期
    ///
    /// 任一步失败则整体回滚
    pub fn record_injection(
        &self,
        coil_number: &str,
        length_used_m: f64,
        heat: &HeatReference,
        params: &HeatParameters,
    ) -> RepositoryResult<InjectionLog> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let active = coil_repo::select_active(&tx)?.ok_or_else(|| {
            RepositoryError::BusinessRuleViolation("当前没有激活线卷".to_string())
        })?;
        if active.coil_number != coil_number {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "线卷 {} 不是当前激活线卷 (当前: {})",
                coil_number, active.coil_number
            )));
        }

        let balance_after = coil_repo::debit_coil(&tx, active.coil_id, length_used_m)?;

        let mut log = InjectionLog::new(
            active.coil_number,
            length_used_m,
            balance_after,
            heat.clone(),
            *params,
        );
        log.log_seq = insert_log(&tx, &log)?;

        tx.commit()?;
        Ok(log)
    }

    /// 清空全部日志（不影响线卷余量）
    ///
    /// # 返回
    /// - Ok(rows): 删除的行数
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM injection_log", [])?;
        Ok(rows)
    }
}

/// 插入一条日志，返回数据库分配的 log_seq
pub(super) fn insert_log(conn: &Connection, log: &InjectionLog) -> rusqlite::Result<i64> {
    let p = &log.params;
    conn.execute(
        r#"
        INSERT INTO injection_log (
            log_id, injected_at, coil_number, length_used_m, balance_after_m,
            heat_id, lf_number,
            tonnage_t, freeboard_mm, temperature_c, aluminium, sulphur, silicon,
            phosphorus_before, phosphorus_initial, injection_speed_m_per_min
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            log.log_id,
            log.injected_at.format(DATETIME_FORMAT).to_string(),
            log.coil_number,
            log.length_used_m,
            log.balance_after_m,
            log.heat.heat_id,
            log.heat.lf_number,
            p.tonnage_t,
            p.freeboard_mm,
            p.temperature_c,
            p.aluminium,
            p.sulphur,
            p.silicon,
            p.phosphorus_before,
            p.phosphorus_initial,
            p.injection_speed_m_per_min,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
