// ==========================================
// 仓库托盘分配跟踪系统 - 请求上下文
// ==========================================
// 每个需要登录的操作都显式接收 RequestContext，
// 并声明允许的角色集合
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{Role, RoleSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub username: String,
    pub role: Role,
}

impl RequestContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// 校验角色
    ///
    /// # 参数
    /// - allowed: 允许的角色集合
    /// - operation: 操作名（写入错误信息）
    pub fn require(&self, allowed: RoleSet, operation: &str) -> ApiResult<()> {
        if allowed.contains(self.role) {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                role = %self.role,
                operation,
                "权限不足"
            );
            Err(ApiError::PermissionDenied {
                operation: operation.to_string(),
                role: self.role,
            })
        }
    }
}
