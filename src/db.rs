// ==========================================
// 钙线喂线系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表（幂等），记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式（毫秒精度，字典序即时间序）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接，应用统一配置并确保表结构存在
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 打开内存数据库（测试/演示用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表:
/// - coil_config: 线卷配置
/// - ledger_state: 单行，记录当前激活线卷
/// - injection_log: 喂线日志（只追加）
/// - config_kv: 系统配置
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS coil_config (
            coil_id INTEGER PRIMARY KEY AUTOINCREMENT,
            coil_number TEXT NOT NULL UNIQUE,
            total_length_m REAL NOT NULL,
            current_length_m REAL NOT NULL,
            density_g_per_m REAL NOT NULL,
            target_ppm REAL NOT NULL,
            recovery_pct REAL NOT NULL,
            heats_treated INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ledger_state (
            state_id INTEGER PRIMARY KEY CHECK (state_id = 1),
            active_coil_id INTEGER REFERENCES coil_config(coil_id),
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS injection_log (
            log_seq INTEGER PRIMARY KEY AUTOINCREMENT,
            log_id TEXT NOT NULL UNIQUE,
            injected_at TEXT NOT NULL,
            coil_number TEXT NOT NULL,
            length_used_m REAL NOT NULL,
            balance_after_m REAL NOT NULL,
            heat_id TEXT,
            lf_number TEXT,
            tonnage_t REAL NOT NULL,
            freeboard_mm REAL NOT NULL,
            temperature_c REAL NOT NULL,
            aluminium REAL NOT NULL,
            sulphur REAL NOT NULL,
            silicon REAL NOT NULL,
            phosphorus_before REAL NOT NULL,
            phosphorus_initial REAL NOT NULL,
            injection_speed_m_per_min REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_injection_log_coil ON injection_log(coil_number, log_seq);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
