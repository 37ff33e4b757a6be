// ==========================================
// 仓库托盘分配跟踪系统 - 操作日志领域模型
// ==========================================
// 对齐: logs 表
// 用途: 完成托盘、用户管理、配置修改等操作的审计记录
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    pub log_id: i64,              // 自增ID（插入时忽略）
    pub actor: String,            // 操作人（logs.username）
    pub action_type: String,      // 操作类型（logs.action）
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_read: bool,
}

impl ActionLog {
    /// 构造一条待插入的日志
    pub fn new(actor: &str, action_type: ActionType, message: impl Into<String>) -> Self {
        Self {
            log_id: 0,
            actor: actor.to_string(),
            action_type: action_type.as_str().to_string(),
            message: Some(message.into()),
            created_at: chrono::Local::now().naive_local(),
            is_read: false,
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    FinishPallet,   // 完成托盘
    Login,          // 登录
    CreateUser,     // 创建用户
    UpdateUser,     // 修改用户（角色/启用）
    ResetPassword,  // 重置/修改密码
    DeleteUser,     // 删除用户
    UpdateConfig,   // 修改配置
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::FinishPallet => "finish_pallet",
            ActionType::Login => "login",
            ActionType::CreateUser => "create_user",
            ActionType::UpdateUser => "update_user",
            ActionType::ResetPassword => "reset_password",
            ActionType::DeleteUser => "delete_user",
            ActionType::UpdateConfig => "update_config",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "finish_pallet" => Some(ActionType::FinishPallet),
            "login" => Some(ActionType::Login),
            "create_user" => Some(ActionType::CreateUser),
            "update_user" => Some(ActionType::UpdateUser),
            "reset_password" => Some(ActionType::ResetPassword),
            "delete_user" => Some(ActionType::DeleteUser),
            "update_config" => Some(ActionType::UpdateConfig),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_trip() {
        for t in [
            ActionType::FinishPallet,
            ActionType::Login,
            ActionType::CreateUser,
            ActionType::UpdateUser,
            ActionType::ResetPassword,
            ActionType::DeleteUser,
            ActionType::UpdateConfig,
        ] {
            assert_eq!(ActionType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ActionType::parse("scan"), None);
    }
}
