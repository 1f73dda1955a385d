// ==========================================
// 钙线喂线系统 - 命令耗时与慢 SQL 统计
// ==========================================
// 开关（环境变量）:
// - CA_WIRE_PERF_SQL=1       开启 SQL 计数与慢查询日志（Debug 默认开启）
// - CA_WIRE_SLOW_SQL_MS=50   慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 0 表示未开启
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn env_enabled() -> bool {
    match std::env::var("CA_WIRE_PERF_SQL") {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => cfg!(debug_assertions),
    }
}

/// 安装 SQLite 语句 profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    if !env_enabled() {
        SLOW_SQL_MS.store(0, Ordering::Relaxed);
        conn.profile(None);
        return;
    }

    let threshold = std::env::var("CA_WIRE_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(50);
    SLOW_SQL_MS.store(threshold, Ordering::Relaxed);

    conn.profile(Some(profile_callback));
}

fn profile_callback(sql: &str, duration: Duration) {
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));

    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    let ms = duration.as_millis() as u64;
    if threshold > 0 && ms >= threshold {
        let sql_short: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::warn!(target: "slow_sql", duration_ms = ms, sql = %sql_short, "slow sql");
    }
}

/// 命令耗时 Guard：drop 时记录耗时与 SQL 语句数
///
/// ```ignore
/// let _perf = ca_wire_injection::perf::PerfGuard::new("confirm");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let sql_count = SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start);
        tracing::debug!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count,
            "done"
        );
    }
}
