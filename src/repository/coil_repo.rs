// ==========================================
// 钙线喂线系统 - 线卷数据仓储
// ==========================================
// 红线: 激活线卷只通过 ledger_state.active_coil_id 表达，至多一个
// 红线: 切换/新建/自举均在单个事务内完成
// ==========================================

use crate::db::DATETIME_FORMAT;
use crate::domain::coil::{CoilConfig, CoilDefaults, CoilSpec};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const SELECT_COIL: &str = r#"
    SELECT c.coil_id, c.coil_number,
           c.total_length_m, c.current_length_m,
           c.density_g_per_m, c.target_ppm, c.recovery_pct,
           c.heats_treated,
           CASE WHEN s.active_coil_id = c.coil_id THEN 1 ELSE 0 END AS is_active,
           c.created_at, c.updated_at
    FROM coil_config c
    LEFT JOIN ledger_state s ON s.state_id = 1
"#;

// ==========================================
// CoilSwitchResult - 切换/新建结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilSwitchResult {
    pub coil: CoilConfig,
    pub created: bool,       // 是否新建
    pub balance_reset: bool, // 总长度变化导致余量/炉数重置
}

// ==========================================
// CoilConfigRepository - 线卷仓储
// ==========================================
/// 线卷仓储
/// 职责: 管理 coil_config / ledger_state 表
pub struct CoilConfigRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CoilConfigRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询当前激活线卷
    pub fn find_active(&self) -> RepositoryResult<Option<CoilConfig>> {
        let conn = self.get_conn()?;
        Ok(select_active(&conn)?)
    }

    /// 按线卷编号查询
    pub fn find_by_number(&self, coil_number: &str) -> RepositoryResult<Option<CoilConfig>> {
        let conn = self.get_conn()?;
        Ok(select_by_number(&conn, coil_number)?)
    }

    /// 查询全部线卷（按创建顺序）
    pub fn list_all(&self) -> RepositoryResult<Vec<CoilConfig>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY c.coil_id ASC", SELECT_COIL);
        let mut stmt = conn.prepare(&sql)?;
        let coils = stmt
            .query_map([], map_coil_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(coils)
    }

    // ==========================================
    // 写入操作（事务）
    // ==========================================

    /// 确保存在激活线卷（惰性自举）
    ///
    /// # 规则
    /// 1. 已有激活线卷 → 直接返回
    /// 2. 无激活但有线卷 → 激活最早创建的线卷
    /// 3. 空库 → 按默认参数新建并激活
    ///
    /// 幂等：第二次调用只走规则 1
    pub fn ensure_active(&self, defaults: &CoilDefaults) -> RepositoryResult<CoilConfig> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        if let Some(coil) = select_active(&tx)? {
            return Ok(coil);
        }

        let first_id: Option<i64> = tx
            .query_row(
                "SELECT coil_id FROM coil_config ORDER BY coil_id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let coil_id = match first_id {
            Some(id) => {
                tracing::info!("无激活线卷，激活已有线卷: coil_id={}", id);
                id
            }
            None => {
                tracing::info!("线卷表为空，创建默认线卷: {}", defaults.coil_number);
                insert_coil(&tx, &CoilSpec::from(defaults))?
            }
        };

        set_active(&tx, coil_id)?;
        let coil = select_by_id(&tx, coil_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "CoilConfig".to_string(),
            id: coil_id.to_string(),
        })?;

        tx.commit()?;
        Ok(coil)
    }

    /// 切换到指定线卷，不存在则新建
    ///
    /// # 规则
    /// - 已存在: 更新密度/收得率/ppm；总长度变化时余量重置为总长度、炉数清零
    /// - 不存在: 新建（余量 = 总长度）
    /// - 两种情况都将其设为唯一激活线卷
    pub fn switch_or_create(&self, spec: &CoilSpec) -> RepositoryResult<CoilSwitchResult> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = now_str();

        let (coil_id, created, balance_reset) = match select_by_number(&tx, &spec.coil_number)? {
            Some(existing) => {
                let reset = spec.total_length_m != existing.total_length_m;
                if reset {
                    tx.execute(
                        r#"
                        UPDATE coil_config
                        SET total_length_m = ?1, current_length_m = ?1, heats_treated = 0,
                            density_g_per_m = ?2, target_ppm = ?3, recovery_pct = ?4,
                            updated_at = ?5
                        WHERE coil_id = ?6
                        "#,
                        params![
                            spec.total_length_m,
                            spec.density_g_per_m,
                            spec.target_ppm,
                            spec.recovery_pct,
                            now,
                            existing.coil_id,
                        ],
                    )?;
                } else {
                    tx.execute(
                        r#"
                        UPDATE coil_config
                        SET density_g_per_m = ?1, target_ppm = ?2, recovery_pct = ?3,
                            updated_at = ?4
                        WHERE coil_id = ?5
                        "#,
                        params![
                            spec.density_g_per_m,
                            spec.target_ppm,
                            spec.recovery_pct,
                            now,
                            existing.coil_id,
                        ],
                    )?;
                }
                (existing.coil_id, false, reset)
            }
            None => (insert_coil(&tx, spec)?, true, false),
        };

        set_active(&tx, coil_id)?;
        let coil = select_by_id(&tx, coil_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "CoilConfig".to_string(),
            id: coil_id.to_string(),
        })?;

        tx.commit()?;
        Ok(CoilSwitchResult {
            coil,
            created,
            balance_reset,
        })
    }
}

// ==========================================
// 连接级辅助函数（可在事务内复用）
// ==========================================

pub(crate) fn select_active(conn: &Connection) -> SqliteResult<Option<CoilConfig>> {
    let sql = format!("{} WHERE c.coil_id = s.active_coil_id", SELECT_COIL);
    conn.query_row(&sql, [], map_coil_row).optional()
}

pub(crate) fn select_by_id(conn: &Connection, coil_id: i64) -> SqliteResult<Option<CoilConfig>> {
    let sql = format!("{} WHERE c.coil_id = ?1", SELECT_COIL);
    conn.query_row(&sql, params![coil_id], map_coil_row).optional()
}

pub(crate) fn select_by_number(
    conn: &Connection,
    coil_number: &str,
) -> SqliteResult<Option<CoilConfig>> {
    let sql = format!("{} WHERE c.coil_number = ?1", SELECT_COIL);
    conn.query_row(&sql, params![coil_number], map_coil_row).optional()
}

/// 扣减余量、累计炉数，返回扣减后的余量
pub(crate) fn debit_coil(conn: &Connection, coil_id: i64, length_m: f64) -> SqliteResult<f64> {
    conn.execute(
        r#"
        UPDATE coil_config
        SET current_length_m = current_length_m - ?1,
            heats_treated = heats_treated + 1,
            updated_at = ?2
        WHERE coil_id = ?3
        "#,
        params![length_m, now_str(), coil_id],
    )?;

    conn.query_row(
        "SELECT current_length_m FROM coil_config WHERE coil_id = ?1",
        params![coil_id],
        |row| row.get(0),
    )
}

fn insert_coil(conn: &Connection, spec: &CoilSpec) -> SqliteResult<i64> {
    let now = now_str();
    conn.execute(
        r#"
        INSERT INTO coil_config (
            coil_number, total_length_m, current_length_m,
            density_g_per_m, target_ppm, recovery_pct,
            heats_treated, created_at, updated_at
        ) VALUES (?1, ?2, ?2, ?3, ?4, ?5, 0, ?6, ?6)
        "#,
        params![
            spec.coil_number,
            spec.total_length_m,
            spec.density_g_per_m,
            spec.target_ppm,
            spec.recovery_pct,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn set_active(conn: &Connection, coil_id: i64) -> SqliteResult<()> {
    conn.execute(
        r#"
        INSERT INTO ledger_state (state_id, active_coil_id, updated_at)
        VALUES (1, ?1, ?2)
        ON CONFLICT(state_id) DO UPDATE SET
            active_coil_id = excluded.active_coil_id,
            updated_at = excluded.updated_at
        "#,
        params![coil_id, now_str()],
    )?;
    Ok(())
}

fn map_coil_row(row: &Row) -> SqliteResult<CoilConfig> {
    Ok(CoilConfig {
        coil_id: row.get(0)?,
        coil_number: row.get(1)?,
        total_length_m: row.get(2)?,
        current_length_m: row.get(3)?,
        density_g_per_m: row.get(4)?,
        target_ppm: row.get(5)?,
        recovery_pct: row.get(6)?,
        heats_treated: row.get(7)?,
        is_active: row.get::<_, i64>(8)? == 1,
        created_at: parse_datetime(row, 9)?,
        updated_at: parse_datetime(row, 10)?,
    })
}

pub(crate) fn parse_datetime(row: &Row, idx: usize) -> SqliteResult<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn now_str() -> String {
    chrono::Local::now()
        .naive_local()
        .format(DATETIME_FORMAT)
        .to_string()
}
