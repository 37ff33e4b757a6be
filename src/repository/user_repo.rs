// ==========================================
// 仓库托盘分配跟踪系统 - 用户与会话仓储
// ==========================================
// 职责: users / user_session 表的数据映射
// 红线: 不做密码校验与权限判断（由 api::user_api 负责）
// ==========================================

use crate::domain::types::Role;
use crate::domain::user::{User, UserSession};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 用户
    // ==========================================

    /// 新建用户，返回自增 id
    ///
    /// 用户名重复时返回 UniqueConstraintViolation
    pub fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (username, password_hash, role, is_active, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            "#,
            params![
                username,
                password_hash,
                role.as_str(),
                created_at.format(TS_FORMAT).to_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, username, password_hash, role, is_active, created_at
            FROM users WHERE username = ?1
            "#,
        )?;

        match stmt.query_row(params![username], map_user_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, username, password_hash, role, is_active, created_at
            FROM users ORDER BY username
            "#,
        )?;

        let users = stmt
            .query_map([], map_user_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(users)
    }

    /// 修改角色 / 启用状态（None 表示不变）
    ///
    /// # 返回
    /// - Ok(rows): 0 表示用户不存在
    pub fn update_profile(
        &self,
        username: &str,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE users
            SET role = COALESCE(?2, role),
                is_active = COALESCE(?3, is_active)
            WHERE username = ?1
            "#,
            params![username, role.map(|r| r.as_str()), is_active],
        )?;
        Ok(rows)
    }

    pub fn update_password_hash(&self, username: &str, password_hash: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE users SET password_hash = ?2 WHERE username = ?1",
            params![username, password_hash],
        )?;
        Ok(rows)
    }

    /// 删除用户（会话随外键级联删除）
    pub fn delete(&self, username: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(rows)
    }

    /// 统计启用中的管理员数量
    pub fn count_active_admins(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ==========================================
    // 会话
    // ==========================================

    pub fn insert_session(&self, session: &UserSession) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO user_session (session_id, username, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                session.session_id,
                session.username,
                session.created_at.format(TS_FORMAT).to_string(),
                session.expires_at.format(TS_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_session(&self, session_id: &str) -> RepositoryResult<Option<UserSession>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, username, created_at, expires_at FROM user_session WHERE session_id = ?1",
        )?;

        let result = stmt.query_row(params![session_id], |row| {
            Ok(UserSession {
                session_id: row.get(0)?,
                username: row.get(1)?,
                created_at: parse_ts(row, 2)?,
                expires_at: parse_ts(row, 3)?,
            })
        });

        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_session(&self, session_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM user_session WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(rows)
    }

    /// 删除某用户的全部会话（停用、重置密码时调用）
    pub fn delete_sessions_for_user(&self, username: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM user_session WHERE username = ?1",
            params![username],
        )?;
        Ok(rows)
    }

    pub fn delete_expired_sessions(&self, now: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM user_session WHERE expires_at <= ?1",
            params![now.format(TS_FORMAT).to_string()],
        )?;
        Ok(rows)
    }
}

fn map_user_row(row: &Row) -> SqliteResult<User> {
    let role_str: String = row.get(3)?;
    let role = Role::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("未知角色: {}", role_str).into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role,
        is_active: row.get(4)?,
        created_at: parse_ts(row, 5)?,
    })
}

fn parse_ts(row: &Row, idx: usize) -> SqliteResult<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn setup_repo() -> UserRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        UserRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_and_find_user() {
        let repo = setup_repo();
        let id = repo.insert("kho01", "hash", Role::Scanner, ts(1)).unwrap();
        assert!(id > 0);

        let user = repo.find_by_username("kho01").unwrap().unwrap();
        assert_eq!(user.role, Role::Scanner);
        assert!(user.is_active);
        assert_eq!(user.created_at, ts(1));
        assert!(repo.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let repo = setup_repo();
        repo.insert("kho01", "hash", Role::Scanner, ts(1)).unwrap();
        let err = repo.insert("kho01", "hash2", Role::Printer, ts(1)).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_update_profile_keeps_unset_fields() {
        let repo = setup_repo();
        repo.insert("in01", "hash", Role::Printer, ts(1)).unwrap();

        assert_eq!(repo.update_profile("in01", None, Some(false)).unwrap(), 1);
        let user = repo.find_by_username("in01").unwrap().unwrap();
        assert_eq!(user.role, Role::Printer);
        assert!(!user.is_active);

        assert_eq!(repo.update_profile("in01", Some(Role::Admin), None).unwrap(), 1);
        let user = repo.find_by_username("in01").unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(!user.is_active);

        assert_eq!(repo.update_profile("ghost", Some(Role::Admin), None).unwrap(), 0);
    }

    #[test]
    fn test_sessions_cascade_on_user_delete() {
        let repo = setup_repo();
        repo.insert("kho01", "hash", Role::Scanner, ts(1)).unwrap();
        repo.insert_session(&UserSession {
            session_id: "s1".to_string(),
            username: "kho01".to_string(),
            created_at: ts(1),
            expires_at: ts(1) + Duration::days(7),
        })
        .unwrap();

        let session = repo.find_session("s1").unwrap().unwrap();
        assert_eq!(session.username, "kho01");

        assert_eq!(repo.delete("kho01").unwrap(), 1);
        assert!(repo.find_session("s1").unwrap().is_none());
    }

    #[test]
    fn test_delete_expired_sessions() {
        let repo = setup_repo();
        repo.insert("kho01", "hash", Role::Scanner, ts(1)).unwrap();
        for (id, days) in [("old", 1), ("fresh", 10)] {
            repo.insert_session(&UserSession {
                session_id: id.to_string(),
                username: "kho01".to_string(),
                created_at: ts(1),
                expires_at: ts(1) + Duration::days(days),
            })
            .unwrap();
        }

        assert_eq!(repo.delete_expired_sessions(ts(5)).unwrap(), 1);
        assert!(repo.find_session("old").unwrap().is_none());
        assert!(repo.find_session("fresh").unwrap().is_some());
        assert_eq!(repo.delete_sessions_for_user("kho01").unwrap(), 1);
    }

    #[test]
    fn test_count_active_admins() {
        let repo = setup_repo();
        repo.insert("admin", "hash", Role::Admin, ts(1)).unwrap();
        repo.insert("admin2", "hash", Role::Admin, ts(1)).unwrap();
        repo.update_profile("admin2", None, Some(false)).unwrap();
        repo.insert("kho01", "hash", Role::Scanner, ts(1)).unwrap();
        assert_eq!(repo.count_active_admins().unwrap(), 1);
    }
}
