// ==========================================
// 仓库托盘分配跟踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表入口（migrations/v0.1_schema.sql）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version（与 `migrations/v0.*.sql` 对齐）
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V0_1: &str = include_str!("../migrations/v0.1_schema.sql");

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

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等，所有语句均为 IF NOT EXISTS）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_V0_1)
}

/// 将历史数据中 pallet = '' 的行统一为 NULL
///
/// 外部导入流程可能写入空字符串；启动时归一化一次，读取侧仍兼容两种表示。
///
/// # 返回
/// - Ok(rows): 被归一化的行数
pub fn normalize_unassigned_pallets(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE scanfile SET pallet = NULL, pallet_type = NULL WHERE pallet = ''",
        [],
    )
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_normalize_unassigned_pallets() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO scanfile (sscc, barcode, sku, jobno, jobno_type, pallet, pallet_type)
            VALUES ('S1', 'B1', 'SKU1', 'J1', 'J1-EXP', '', ''),
                   ('S2', 'B2', 'SKU1', 'J1', 'J1-EXP', '3', 'EURO'),
                   ('S3', 'B3', 'SKU1', 'J1', 'J1-EXP', NULL, NULL);
            "#,
        )
        .unwrap();

        let rows = normalize_unassigned_pallets(&conn).unwrap();
        assert_eq!(rows, 1);

        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM scanfile WHERE pallet IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 2);
    }
}
