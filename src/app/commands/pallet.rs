use serde::Deserialize;

use crate::api::RequestContext;
use crate::app::state::AppState;

use super::common::{de_opt_text, de_text, map_api_error, ok_data, parse_payload, CommandResult};

// ==========================================
// 作业 / 托盘查询与完成托盘
// ==========================================

#[derive(Debug, Deserialize)]
struct JobPayload {
    job_type: String,
}

#[derive(Debug, Deserialize)]
struct PalletPayload {
    job_type: String,
    #[serde(deserialize_with = "de_text")]
    pallet_no: String,
}

#[derive(Debug, Deserialize)]
struct HistoryPayload {
    job_type: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pallet_no: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

pub(super) fn list_jobs(state: &AppState, ctx: &RequestContext, _payload: serde_json::Value) -> CommandResult {
    let jobs = state.scan_api.list_jobs(ctx).map_err(map_api_error)?;
    ok_data(&jobs)
}

pub(super) fn job_summary(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: JobPayload = parse_payload(payload)?;
    let summary = state
        .scan_api
        .job_summary(ctx, &p.job_type)
        .map_err(map_api_error)?;
    ok_data(&summary)
}

pub(super) fn pallet_slots(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: JobPayload = parse_payload(payload)?;
    let slots = state
        .scan_api
        .pallet_slots(ctx, &p.job_type)
        .map_err(map_api_error)?;
    ok_data(&slots)
}

pub(super) fn history(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: HistoryPayload = parse_payload(payload)?;
    let records = state
        .scan_api
        .history(ctx, &p.job_type, p.pallet_no.as_deref(), p.limit)
        .map_err(map_api_error)?;
    ok_data(&records)
}

pub(super) fn finish_pallet(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: PalletPayload = parse_payload(payload)?;
    let result = state
        .scan_api
        .finish_pallet(ctx, &p.job_type, &p.pallet_no)
        .map_err(map_api_error)?;
    ok_data(&result)
}

// ==========================================
// 打印
// ==========================================

pub(super) fn print_data(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: PalletPayload = parse_payload(payload)?;
    let data = state
        .print_api
        .print_data(ctx, &p.job_type, &p.pallet_no)
        .map_err(map_api_error)?;
    ok_data(&data)
}

pub(super) fn print_csv(state: &AppState, ctx: &RequestContext, payload: serde_json::Value) -> CommandResult {
    let p: PalletPayload = parse_payload(payload)?;
    let csv_text = state
        .print_api
        .print_csv(ctx, &p.job_type, &p.pallet_no)
        .map_err(map_api_error)?;
    ok_data(&csv_text)
}
