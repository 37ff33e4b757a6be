use super::core::{ActionLogRepository, TS_FORMAT};
use crate::domain::action_log::ActionLog;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 id 查询单条日志
    pub fn find_by_id(&self, log_id: i64) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, username, action, message, created_at, is_read FROM logs WHERE id = ?1",
        )?;

        match stmt.query_row(params![log_id], |row| self.map_row(row)) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询最近的日志
    ///
    /// # 参数
    /// - unread_only: 只返回未读
    pub fn find_recent(&self, limit: usize, unread_only: bool) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, username, action, message, created_at, is_read
            FROM logs
            WHERE (?1 = 0 OR is_read = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![unread_only, limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定操作人的日志
    pub fn find_by_actor(&self, actor: &str, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, username, action, message, created_at, is_read
            FROM logs
            WHERE username = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![actor, limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 未读数量
    pub fn count_unread(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM logs WHERE is_read = 0", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 将数据库行映射为 ActionLog
    fn map_row(&self, row: &Row) -> SqliteResult<ActionLog> {
        let created_at_str: String = row.get(4)?;
        let created_at = NaiveDateTime::parse_from_str(&created_at_str, TS_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(ActionLog {
            log_id: row.get(0)?,
            actor: row.get(1)?,
            action_type: row.get(2)?,
            message: row.get(3)?,
            created_at,
            is_read: row.get(5)?,
        })
    }
}
