// ==========================================
// 仓库托盘分配跟踪系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（仅管理员，更新写操作日志）
// ==========================================

use std::sync::Arc;

use crate::api::context::RequestContext;
use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigEntry, ConfigManager};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::RoleSet;
use crate::i18n::t_with_args;
use crate::repository::ActionLogRepository;

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            config_manager,
            action_log_repo,
        }
    }

    /// 查询所有配置（含默认值）
    pub fn list_configs(&self, ctx: &RequestContext) -> ApiResult<Vec<ConfigEntry>> {
        ctx.require(RoleSet::ADMIN, "list_configs")?;
        self.config_manager
            .list_entries()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 更新配置
    ///
    /// # 参数
    /// - key: 必须是已登记的配置键
    /// - value: 按键校验
    pub fn update_config(&self, ctx: &RequestContext, key: &str, value: &str) -> ApiResult<ConfigEntry> {
        ctx.require(RoleSet::ADMIN, "update_config")?;
        let key = key.trim();
        let value = value.trim();
        config_keys::validate(key, value).map_err(ApiError::InvalidInput)?;

        self.config_manager
            .set_global_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let message = t_with_args("config.updated", &[("key", key), ("value", value)]);
        self.action_log_repo
            .insert(&ActionLog::new(&ctx.username, ActionType::UpdateConfig, message))?;
        tracing::info!(operator = %ctx.username, key, value, "配置已更新");

        self.config_manager
            .list_entries()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .into_iter()
            .find(|e| e.key == key)
            .ok_or_else(|| ApiError::InternalError(format!("配置写入后未找到: {}", key)))
    }
}
