use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::RequestContext;
use crate::app::state::AppState;
use crate::i18n::t_with_args;

use super::common::{de_text, map_api_error, parse_payload, reconcile_message, to_line, CommandResult};

// ==========================================
// 扫码 / 人工分配 / 移除分配
// ==========================================
// 响应约定: 分配类失败同样返回 {success: false, message}，
// 认证、权限等请求级错误走通用 ErrorResponse

#[derive(Debug, Deserialize)]
struct ScanPayload {
    barcode: String,
    job_type: String,
    #[serde(deserialize_with = "de_text")]
    pallet_no: String,
    pallet_type: String,
}

#[derive(Debug, Deserialize)]
struct ManualAssignPayload {
    job_type: String,
    sku: String,
    pallet_type: String,
    #[serde(deserialize_with = "de_text")]
    pallet_no: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct UnassignPayload {
    job_type: String,
    #[serde(alias = "pallet_no", deserialize_with = "de_text")]
    pallet: String,
    sku: String,
    #[serde(default)]
    quantity: Option<i64>,
}

/// 分配类失败：业务失败返回扁平结构，其余走 ErrorResponse
fn map_assign_error(err: ApiError) -> String {
    match err {
        ApiError::Reconcile(e) => {
            tracing::warn!(error = %e, "分配失败");
            let resp = json!({ "success": false, "message": reconcile_message(&e) });
            resp.to_string()
        }
        other => map_api_error(other),
    }
}

pub(super) fn scan(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: ScanPayload = parse_payload(payload)?;

    let outcome = state
        .scan_api
        .scan(ctx, &p.barcode, &p.job_type, &p.pallet_no, &p.pallet_type)
        .map_err(map_assign_error)?;

    let pallet = outcome.pallet.to_string();
    let message = t_with_args(
        "scan.assigned",
        &[("sku", outcome.sku.as_str()), ("pallet", pallet.as_str())],
    );

    to_line(json!({
        "success": true,
        "sku": outcome.sku,
        "message": message,
        "pallet_count": outcome.pallet_count,
        "total_sscc": outcome.counts.total,
        "scanned_sscc": outcome.counts.assigned,
        "remain_sscc": outcome.counts.remaining,
    }))
}

pub(super) fn manual_assign(
    state: &AppState,
    ctx: &RequestContext,
    payload: serde_json::Value,
) -> CommandResult {
    let p: ManualAssignPayload = parse_payload(payload)?;

    let outcome = state
        .scan_api
        .manual_assign(ctx, &p.job_type, &p.sku, &p.pallet_type, &p.pallet_no, p.quantity)
        .map_err(map_assign_error)?;

    let pallet = outcome.pallet.to_string();
    let count = outcome.assigned.to_string();
    let message = t_with_args(
        "assign.assigned",
        &[
            ("count", count.as_str()),
            ("sku", outcome.sku.as_str()),
            ("pallet", pallet.as_str()),
        ],
    );

    to_line(json!({
        "success": true,
        "message": message,
        "count": outcome.assigned,
    }))
}

pub(super) fn unassign(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: UnassignPayload = parse_payload(payload)?;

    let outcome = state
        .scan_api
        .unassign(ctx, &p.job_type, &p.pallet, &p.sku, p.quantity)
        .map_err(map_assign_error)?;

    let pallet = outcome.pallet.to_string();
    let count = outcome.cleared.to_string();
    let message = t_with_args(
        "unassign.cleared",
        &[
            ("pallet", pallet.as_str()),
            ("count", count.as_str()),
            ("sku", outcome.sku.as_str()),
        ],
    );

    to_line(json!({ "success": true, "message": message }))
}
