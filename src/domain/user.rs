// ==========================================
// 仓库托盘分配跟踪系统 - 用户与会话领域模型
// ==========================================
// 对齐: users / user_session 表
// ==========================================

use crate::domain::types::Role;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// User - 用户
// ==========================================
// 注意: password_hash 不参与序列化，避免随接口返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

// ==========================================
// UserSession - 登录会话
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: String,
    pub username: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl UserSession {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }
}
