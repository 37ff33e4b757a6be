use serde::Deserialize;

use crate::api::RequestContext;
use crate::app::state::AppState;
use crate::i18n::t;

use super::common::{map_api_error, ok_data, ok_message, parse_payload, CommandResult};

// ==========================================
// 操作日志 / 运行配置（仅管理员）
// ==========================================

#[derive(Debug, Default, Deserialize)]
struct ListLogsPayload {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    unread_only: bool,
}

#[derive(Debug, Deserialize)]
struct MarkReadPayload {
    log_id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateConfigPayload {
    key: String,
    value: String,
}

pub(super) fn list_logs(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: ListLogsPayload = parse_payload(payload)?;
    let logs = state
        .log_api
        .list_logs(ctx, p.limit, p.unread_only)
        .map_err(map_api_error)?;
    ok_data(&logs)
}

pub(super) fn mark_log_read(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: MarkReadPayload = parse_payload(payload)?;
    state
        .log_api
        .mark_read(ctx, p.log_id)
        .map_err(map_api_error)?;
    ok_message(t("common.success"))
}

pub(super) fn mark_all_logs_read(
    state: &AppState,
    ctx: &RequestContext,
    _payload: serde_json::Value,
) -> CommandResult {
    let updated = state.log_api.mark_all_read(ctx).map_err(map_api_error)?;
    ok_data(&serde_json::json!({ "updated": updated }))
}

pub(super) fn unread_log_count(
    state: &AppState,
    ctx: &RequestContext,
    _payload: serde_json::Value,
) -> CommandResult {
    let count = state.log_api.unread_count(ctx).map_err(map_api_error)?;
    ok_data(&serde_json::json!({ "count": count }))
}

pub(super) fn list_configs(state: &AppState, ctx: &RequestContext, _payload: serde_json::Value) -> CommandResult {
    let entries = state.config_api.list_configs(ctx).map_err(map_api_error)?;
    ok_data(&entries)
}

pub(super) fn update_config(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: UpdateConfigPayload = parse_payload(payload)?;
    let entry = state
        .config_api
        .update_config(ctx, &p.key, &p.value)
        .map_err(map_api_error)?;
    ok_data(&entry)
}
