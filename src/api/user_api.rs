// ==========================================
// 仓库托盘分配跟踪系统 - 用户与会话 API
// ==========================================
// 职责:
// 1. 登录 / 登出 / 会话解析（会话 → RequestContext）
// 2. 用户管理（仅管理员）
// 3. 修改本人密码
// 密码: argon2 PHC 字符串
// ==========================================

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::context::RequestContext;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::{Role, RoleSet};
use crate::domain::user::{User, UserSession};
use crate::i18n::{t, t_with_args};
use crate::repository::{ActionLogRepository, RepositoryError, UserRepository};

/// 密码最短长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 用户名最长长度
pub const MAX_USERNAME_LEN: usize = 64;

/// 登录结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    pub session: String,
    pub username: String,
    pub role: Role,
    pub expires_at: NaiveDateTime,
}

// ==========================================
// UserApi
// ==========================================
pub struct UserApi {
    user_repo: Arc<UserRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl UserApi {
    pub fn new(
        user_repo: Arc<UserRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            user_repo,
            action_log_repo,
            config_manager,
        }
    }

    // ==========================================
    // 登录与会话
    // ==========================================

    /// 登录并创建会话
    pub fn login(&self, username: &str, password: &str) -> ApiResult<LoginResult> {
        let username = username.trim();
        let user = match self.user_repo.find_by_username(username)? {
            Some(u) if verify_password(password, &u.password_hash) => u,
            _ => {
                warn!(username, "登录失败");
                return Err(ApiError::InvalidCredentials);
            }
        };
        if !user.is_active {
            warn!(username, "停用账号尝试登录");
            return Err(ApiError::InactiveUser(user.username));
        }

        let now = now();
        let purged = self.user_repo.delete_expired_sessions(now)?;
        if purged > 0 {
            tracing::debug!(purged, "清理过期会话");
        }

        let days = self
            .config_manager
            .get_session_lifetime_days()
            .map_err(|e| ApiError::InternalError(format!("读取 session_lifetime_days 失败: {}", e)))?;
        let session = UserSession {
            session_id: Uuid::new_v4().to_string(),
            username: user.username.clone(),
            created_at: now,
            expires_at: now + Duration::days(days),
        };
        self.user_repo.insert_session(&session)?;

        self.action_log_repo.insert(&ActionLog::new(
            &user.username,
            ActionType::Login,
            t("auth.logged_in"),
        ))?;
        info!(username = %user.username, role = %user.role, "登录成功");

        Ok(LoginResult {
            session: session.session_id,
            username: user.username,
            role: user.role,
            expires_at: session.expires_at,
        })
    }

    /// 登出（会话不存在时也视为成功）
    pub fn logout(&self, session_id: &str) -> ApiResult<()> {
        self.user_repo.delete_session(session_id)?;
        Ok(())
    }

    /// 会话 → 请求上下文
    ///
    /// 会话缺失/过期、用户已删除或停用时返回 Unauthenticated
    pub fn authenticate(&self, session_id: Option<&str>) -> ApiResult<RequestContext> {
        self.authenticate_at(session_id, now())
    }

    pub fn authenticate_at(
        &self,
        session_id: Option<&str>,
        now: NaiveDateTime,
    ) -> ApiResult<RequestContext> {
        let session_id = match session_id.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(ApiError::Unauthenticated),
        };

        let session = self
            .user_repo
            .find_session(session_id)?
            .ok_or(ApiError::Unauthenticated)?;
        if session.is_expired(now) {
            self.user_repo.delete_session(session_id)?;
            return Err(ApiError::Unauthenticated);
        }

        match self.user_repo.find_by_username(&session.username)? {
            Some(user) if user.is_active => Ok(RequestContext::new(user.username, user.role)),
            _ => Err(ApiError::Unauthenticated),
        }
    }

    /// 修改本人密码
    pub fn change_password(
        &self,
        ctx: &RequestContext,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        ctx.require(RoleSet::ANY, "change_password")?;
        let user = self.require_user(&ctx.username)?;
        if !verify_password(old_password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }
        validate_password(new_password)?;

        self.user_repo
            .update_password_hash(&user.username, &hash_password(new_password)?)?;
        self.log(ctx, ActionType::ResetPassword, "user.password_changed", &user.username)?;
        Ok(())
    }

    // ==========================================
    // 用户管理（管理员）
    // ==========================================

    pub fn list_users(&self, ctx: &RequestContext) -> ApiResult<Vec<User>> {
        ctx.require(RoleSet::ADMIN, "list_users")?;
        Ok(self.user_repo.list_all()?)
    }

    pub fn create_user(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
        role: Role,
    ) -> ApiResult<User> {
        ctx.require(RoleSet::ADMIN, "create_user")?;
        let username = validate_username(username)?;
        validate_password(password)?;

        let hash = hash_password(password)?;
        match self.user_repo.insert(username, &hash, role, now()) {
            Ok(_) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "用户名已存在: {}",
                    username
                )))
            }
            Err(e) => return Err(e.into()),
        }

        let message = t_with_args(
            "user.created",
            &[("username", username), ("role", role.as_str())],
        );
        self.action_log_repo
            .insert(&ActionLog::new(&ctx.username, ActionType::CreateUser, message))?;
        info!(operator = %ctx.username, username, role = %role, "创建用户");

        self.require_user(username)
    }

    /// 修改角色 / 启用状态
    ///
    /// 不允许让系统失去最后一个启用中的管理员
    pub fn update_user(
        &self,
        ctx: &RequestContext,
        username: &str,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> ApiResult<User> {
        ctx.require(RoleSet::ADMIN, "update_user")?;
        if role.is_none() && is_active.is_none() {
            return Err(ApiError::InvalidInput("role 与 is_active 至少提供一个".to_string()));
        }
        let user = self.require_user(username.trim())?;

        let loses_admin = user.role == Role::Admin
            && user.is_active
            && (role.map_or(false, |r| r != Role::Admin) || is_active == Some(false));
        if loses_admin && self.user_repo.count_active_admins()? <= 1 {
            return Err(ApiError::BusinessRuleViolation(
                "至少需要保留一个启用中的管理员".to_string(),
            ));
        }

        self.user_repo.update_profile(&user.username, role, is_active)?;
        if is_active == Some(false) {
            self.user_repo.delete_sessions_for_user(&user.username)?;
        }
        self.log(ctx, ActionType::UpdateUser, "user.updated", &user.username)?;

        self.require_user(&user.username)
    }

    /// 重置他人密码（该用户的会话全部失效）
    pub fn reset_password(
        &self,
        ctx: &RequestContext,
        username: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        ctx.require(RoleSet::ADMIN, "reset_password")?;
        let user = self.require_user(username.trim())?;
        validate_password(new_password)?;

        self.user_repo
            .update_password_hash(&user.username, &hash_password(new_password)?)?;
        self.user_repo.delete_sessions_for_user(&user.username)?;
        self.log(ctx, ActionType::ResetPassword, "user.password_changed", &user.username)?;
        Ok(())
    }

    /// 删除用户（不能删除自己）
    pub fn delete_user(&self, ctx: &RequestContext, username: &str) -> ApiResult<()> {
        ctx.require(RoleSet::ADMIN, "delete_user")?;
        let username = username.trim();
        if username == ctx.username {
            return Err(ApiError::BusinessRuleViolation("不能删除当前登录用户".to_string()));
        }

        if self.user_repo.delete(username)? == 0 {
            return Err(ApiError::NotFound(format!("用户 {}", username)));
        }
        self.log(ctx, ActionType::DeleteUser, "user.deleted", username)?;
        Ok(())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn require_user(&self, username: &str) -> ApiResult<User> {
        self.user_repo
            .find_by_username(username)?
            .ok_or_else(|| ApiError::NotFound(format!("用户 {}", username)))
    }

    fn log(
        &self,
        ctx: &RequestContext,
        action: ActionType,
        key: &str,
        username: &str,
    ) -> ApiResult<()> {
        let message = t_with_args(key, &[("username", username)]);
        self.action_log_repo
            .insert(&ActionLog::new(&ctx.username, action, message))?;
        info!(operator = %ctx.username, username, action = action.as_str(), "用户管理");
        Ok(())
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// ==========================================
// 密码与用户名
// ==========================================

/// 生成 argon2 密码哈希（PHC 字符串）
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ApiError::InternalError(format!("生成盐失败: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::InternalError(format!("密码哈希失败: {}", e)))
}

/// 校验密码；哈希格式错误视为不匹配
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "密码至少 {} 位",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> ApiResult<&str> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::InvalidInput(format!(
            "用户名长度应为 1-{}",
            MAX_USERNAME_LEN
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidInput("用户名不能包含空白字符".to_string()));
    }
    Ok(username)
}
