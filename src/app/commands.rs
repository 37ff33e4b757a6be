// ==========================================
// 仓库托盘分配跟踪系统 - JSON 命令（按域拆分）
// ==========================================
// 职责: 解析一行 JSON 请求，认证后分派给对应 API，返回一行 JSON 响应
// 请求: {"command": "...", "session": "...", "payload": {...}}
// ==========================================

mod admin;
mod common;
mod pallet;
mod scan;
mod user;

use serde::Deserialize;
use serde_json::Value;

use crate::api::RequestContext;
use crate::app::state::AppState;
use crate::i18n::t_with_args;
use crate::perf::PerfGuard;

use common::{error_json, invalid_request, map_api_error, CommandResult};

/// 请求信封
#[derive(Debug, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

type Handler = fn(&AppState, &RequestContext, Value) -> CommandResult;

/// 需要会话的命令表: (命令名, perf 标签, 处理函数)
const SESSION_COMMANDS: &[(&str, &str, Handler)] = &[
    ("scan", "cmd.scan", scan::scan),
    ("manual_assign", "cmd.manual_assign", scan::manual_assign),
    ("unassign", "cmd.unassign", scan::unassign),
    ("list_jobs", "cmd.list_jobs", pallet::list_jobs),
    ("job_summary", "cmd.job_summary", pallet::job_summary),
    ("pallet_slots", "cmd.pallet_slots", pallet::pallet_slots),
    ("history", "cmd.history", pallet::history),
    ("finish_pallet", "cmd.finish_pallet", pallet::finish_pallet),
    ("print_data", "cmd.print_data", pallet::print_data),
    ("print_csv", "cmd.print_csv", pallet::print_csv),
    ("change_password", "cmd.change_password", user::change_password),
    ("list_users", "cmd.list_users", user::list_users),
    ("create_user", "cmd.create_user", user::create_user),
    ("update_user", "cmd.update_user", user::update_user),
    ("reset_password", "cmd.reset_password", user::reset_password),
    ("delete_user", "cmd.delete_user", user::delete_user),
    ("list_logs", "cmd.list_logs", admin::list_logs),
    ("mark_log_read", "cmd.mark_log_read", admin::mark_log_read),
    ("mark_all_logs_read", "cmd.mark_all_logs_read", admin::mark_all_logs_read),
    ("unread_log_count", "cmd.unread_log_count", admin::unread_log_count),
    ("list_configs", "cmd.list_configs", admin::list_configs),
    ("update_config", "cmd.update_config", admin::update_config),
];

fn lookup(command: &str) -> Option<(&'static str, Handler)> {
    SESSION_COMMANDS
        .iter()
        .find(|(name, _, _)| *name == command)
        .map(|(_, op, handler)| (*op, *handler))
}

/// 处理一行请求，返回一行响应（永不 panic，错误也编码为 JSON）
pub fn dispatch(state: &AppState, line: &str) -> String {
    let envelope: CommandEnvelope = match serde_json::from_str(line.trim()) {
        Ok(env) => env,
        Err(e) => {
            tracing::warn!(error = %e, "请求解析失败");
            return invalid_request(&e.to_string());
        }
    };

    let command = envelope.command.trim().to_string();
    tracing::debug!(command = %command, "收到命令");

    let result = match command.as_str() {
        "login" => {
            let _perf = PerfGuard::new("cmd.login");
            user::login(state, envelope.payload)
        }
        "logout" => {
            let _perf = PerfGuard::new("cmd.logout");
            user::logout(state, envelope.session.as_deref())
        }
        other => match lookup(other) {
            Some((op, handler)) => {
                let _perf = PerfGuard::new(op);
                run_authenticated(state, envelope.session.as_deref(), envelope.payload, handler)
            }
            None => {
                tracing::warn!(command = %other, "未知命令");
                Err(error_json(
                    "UNKNOWN_COMMAND",
                    t_with_args("common.unknown_command", &[("command", other)]),
                    None,
                ))
            }
        },
    };

    result.unwrap_or_else(|err| err)
}

fn run_authenticated(
    state: &AppState,
    session: Option<&str>,
    payload: Value,
    handler: Handler,
) -> CommandResult {
    let ctx = state.user_api.authenticate(session).map_err(map_api_error)?;
    handler(state, &ctx, payload)
}

/// 所有可用命令名（含 login / logout）
pub fn command_names() -> Vec<&'static str> {
    let mut names = vec!["login", "logout"];
    names.extend(SESSION_COMMANDS.iter().map(|(name, _, _)| *name));
    names
}
