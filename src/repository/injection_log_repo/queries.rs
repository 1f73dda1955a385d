use super::core::InjectionLogRepository;
use crate::domain::heat::{HeatParameters, HeatReference};
use crate::domain::injection_log::InjectionLog;
use crate::repository::coil_repo::parse_datetime;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_LOG: &str = r#"
    SELECT log_id, log_seq, injected_at, coil_number, length_used_m, balance_after_m,
           heat_id, lf_number,
           tonnage_t, freeboard_mm, temperature_c, aluminium, sulphur, silicon,
           phosphorus_before, phosphorus_initial, injection_speed_m_per_min
    FROM injection_log
"#;

impl InjectionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询最近的日志（新 → 旧）
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<InjectionLog>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "{} ORDER BY log_seq DESC LIMIT ?",
            SELECT_LOG
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 按 log_id 查询单条日志
    pub fn find_by_id(&self, log_id: &str) -> RepositoryResult<Option<InjectionLog>> {
        let conn = self.get_conn()?;

        let sql = format!("{} WHERE log_id = ?", SELECT_LOG);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![log_id], |row| self.map_row(row)) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询指定线卷的日志（新 → 旧）
    pub fn find_by_coil_number(
        &self,
        coil_number: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<InjectionLog>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "{} WHERE coil_number = ? ORDER BY log_seq DESC LIMIT ?",
            SELECT_LOG
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![coil_number, limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 日志总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM injection_log", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn map_row(&self, row: &Row) -> SqliteResult<InjectionLog> {
        Ok(InjectionLog {
            log_id: row.get(0)?,
            log_seq: row.get(1)?,
            injected_at: parse_datetime(row, 2)?,
            coil_number: row.get(3)?,
            length_used_m: row.get(4)?,
            balance_after_m: row.get(5)?,
            heat: HeatReference {
                heat_id: row.get(6)?,
                lf_number: row.get(7)?,
            },
            params: HeatParameters {
                tonnage_t: row.get(8)?,
                freeboard_mm: row.get(9)?,
                temperature_c: row.get(10)?,
                aluminium: row.get(11)?,
                sulphur: row.get(12)?,
                silicon: row.get(13)?,
                phosphorus_before: row.get(14)?,
                phosphorus_initial: row.get(15)?,
                injection_speed_m_per_min: row.get(16)?,
            },
        })
    }
}
