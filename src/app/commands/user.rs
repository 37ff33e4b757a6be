use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::RequestContext;
use crate::app::state::AppState;
use crate::domain::types::Role;
use crate::i18n::{t, t_with_args};

use super::common::{map_api_error, ok_data, ok_message, parse_payload, to_line, CommandResult};

// ==========================================
// 登录 / 会话 / 用户管理
// ==========================================

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordPayload {
    old_password: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserPayload {
    username: String,
    password: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct UpdateUserPayload {
    username: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordPayload {
    username: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct UsernamePayload {
    username: String,
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| {
        map_api_error(ApiError::InvalidInput(format!(
            "role 必须为 admin/scanner/printer: {}",
            value
        )))
    })
}

// ==========================================
// 无需会话的命令
// ==========================================

pub(super) fn login(state: &AppState, payload: serde_json::Value) -> CommandResult {
    let p: LoginPayload = parse_payload(payload)?;
    let result = state
        .user_api
        .login(&p.username, &p.password)
        .map_err(map_api_error)?;

    to_line(json!({
        "success": true,
        "message": t("auth.logged_in"),
        "session": result.session,
        "username": result.username,
        "role": result.role,
        "expires_at": result.expires_at,
    }))
}

/// 退出登录（会话不存在时同样成功）
pub(super) fn logout(state: &AppState, session: Option<&str>) -> CommandResult {
    if let Some(session) = session.map(str::trim).filter(|s| !s.is_empty()) {
        state.user_api.logout(session).map_err(map_api_error)?;
    }
    ok_message(t("auth.logged_out"))
}

// ==========================================
// 需要会话的命令
// ==========================================

pub(super) fn change_password(
    state: &AppState,
    ctx: &RequestContext,
    payload: serde_json::Value,
) -> CommandResult {
    let p: ChangePasswordPayload = parse_payload(payload)?;
    state
        .user_api
        .change_password(ctx, &p.old_password, &p.new_password)
        .map_err(map_api_error)?;
    ok_message(t_with_args(
        "user.password_changed",
        &[("username", ctx.username.as_str())],
    ))
}

pub(super) fn list_users(state: &AppState, ctx: &RequestContext, _payload: serde_json::Value) -> CommandResult {
    let users = state.user_api.list_users(ctx).map_err(map_api_error)?;
    ok_data(&users)
}

pub(super) fn create_user(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: CreateUserPayload = parse_payload(payload)?;
    let role = parse_role(&p.role)?;
    let user = state
        .user_api
        .create_user(ctx, &p.username, &p.password, role)
        .map_err(map_api_error)?;
    ok_data(&user)
}

pub(super) fn update_user(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: UpdateUserPayload = parse_payload(payload)?;
    let role = p.role.as_deref().map(parse_role).transpose()?;
    let user = state
        .user_api
        .update_user(ctx, &p.username, role, p.is_active)
        .map_err(map_api_error)?;
    ok_data(&user)
}

pub(super) fn reset_password(
    state: &AppState,
    ctx: &RequestContext,
    payload: serde_json::Value,
) -> CommandResult {
    let p: ResetPasswordPayload = parse_payload(payload)?;
    state
        .user_api
        .reset_password(ctx, &p.username, &p.new_password)
        .map_err(map_api_error)?;
    ok_message(t_with_args(
        "user.password_changed",
        &[("username", p.username.trim())],
    ))
}

pub(super) fn delete_user(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: UsernamePayload = parse_payload(payload)?;
    state
        .user_api
        .delete_user(ctx, &p.username)
        .map_err(map_api_error)?;
    ok_message(t_with_args("user.deleted", &[("username", p.username.trim())]))
}
