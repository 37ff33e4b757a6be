// ==========================================
// 仓库托盘分配跟踪系统 - 操作日志 API
// ==========================================
// 仅管理员可见
// ==========================================

use std::sync::Arc;

use crate::api::context::RequestContext;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::ActionLog;
use crate::domain::types::RoleSet;
use crate::repository::ActionLogRepository;

/// 未指定条数时的默认值
pub const DEFAULT_LOG_LIMIT: usize = 100;

pub struct LogApi {
    action_log_repo: Arc<ActionLogRepository>,
}

impl LogApi {
    pub fn new(action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self { action_log_repo }
    }

    /// 最近的日志（可只看未读）
    pub fn list_logs(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
        unread_only: bool,
    ) -> ApiResult<Vec<ActionLog>> {
        ctx.require(RoleSet::ADMIN, "list_logs")?;
        let limit = match limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于 0".to_string())),
            Some(l) => l,
            None => DEFAULT_LOG_LIMIT,
        };
        Ok(self.action_log_repo.find_recent(limit, unread_only)?)
    }

    pub fn mark_read(&self, ctx: &RequestContext, log_id: i64) -> ApiResult<()> {
        ctx.require(RoleSet::ADMIN, "mark_log_read")?;
        if self.action_log_repo.mark_read(log_id)? == 0 {
            return Err(ApiError::NotFound(format!("日志 {}", log_id)));
        }
        Ok(())
    }

    /// 全部标记已读，返回本次标记的条数
    pub fn mark_all_read(&self, ctx: &RequestContext) -> ApiResult<usize> {
        ctx.require(RoleSet::ADMIN, "mark_all_logs_read")?;
        Ok(self.action_log_repo.mark_all_read()?)
    }

    pub fn unread_count(&self, ctx: &RequestContext) -> ApiResult<i64> {
        ctx.require(RoleSet::ADMIN, "unread_log_count")?;
        Ok(self.action_log_repo.count_unread()?)
    }
}
