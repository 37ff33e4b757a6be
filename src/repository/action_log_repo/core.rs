use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储
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

    /// 插入操作日志
    ///
    /// # 返回
    /// - `Ok(log_id)`: 自增 id（忽略 log.log_id）
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO logs (username, action, message, created_at, is_read)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                log.actor,
                log.action_type,
                log.message,
                log.created_at.format(TS_FORMAT).to_string(),
                log.is_read,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 标记单条日志为已读
    ///
    /// # 返回
    /// - Ok(rows): 0 表示日志不存在
    pub fn mark_read(&self, log_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("UPDATE logs SET is_read = 1 WHERE id = ?1", params![log_id])?;
        Ok(rows)
    }

    /// 全部标记为已读
    pub fn mark_all_read(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("UPDATE logs SET is_read = 1 WHERE is_read = 0", [])?;
        Ok(rows)
    }
}
