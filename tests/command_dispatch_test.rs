// ==========================================
// JSON 命令分派集成测试
// ==========================================
// 测试范围: 请求信封解析、会话校验、扫码类响应结构、通用错误结构
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::{units, MasterDataBuilder};
use serde_json::{json, Value};

use pallet_tracker::app::dispatch;
use pallet_tracker::domain::types::Role;

fn call(env: &ApiTestEnv, request: Value) -> Value {
    let line = dispatch(&env.state, &request.to_string());
    serde_json::from_str(&line).expect("响应必须是合法 JSON")
}

#[test]
fn test_malformed_request() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let resp: Value = serde_json::from_str(&dispatch(&env.state, "{not json")).unwrap();
    assert_eq!(resp["success"], false);
    assert_eq!(resp["code"], "INVALID_REQUEST");
}

#[test]
fn test_unknown_command() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let resp = call(&env, json!({ "command": "drop_everything" }));
    assert_eq!(resp["success"], false);
    assert_eq!(resp["code"], "UNKNOWN_COMMAND");
    assert!(resp["message"].as_str().unwrap().contains("drop_everything"));
}

#[test]
fn test_session_required() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let resp = call(&env, json!({ "command": "list_jobs" }));
    assert_eq!(resp["success"], false);
    assert_eq!(resp["code"], "UNAUTHENTICATED");
}

#[test]
fn test_login_and_scan_flow() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_master(&[MasterDataBuilder::new("SKU-A", "12345").build()]);
    env.seed_inventory(&units(JOB, "SKU-A", 2));
    env.create_user("scan01", Role::Scanner);

    let login = call(
        &env,
        json!({ "command": "login", "payload": { "username": "scan01", "password": PASSWORD } }),
    );
    assert_eq!(login["success"], true);
    assert_eq!(login["role"], "scanner");
    let session = login["session"].as_str().unwrap().to_string();

    // 托盘号允许以数字发送
    let scan = call(
        &env,
        json!({
            "command": "scan",
            "session": session,
            "payload": { "barcode": BARCODE, "job_type": JOB, "pallet_no": 2, "pallet_type": "EURO" }
        }),
    );
    assert_eq!(scan["success"], true);
    assert_eq!(scan["sku"], "SKU-A");
    assert_eq!(scan["pallet_count"], 1);
    assert_eq!(scan["total_sscc"], 2);
    assert_eq!(scan["scanned_sscc"], 1);
    assert_eq!(scan["remain_sscc"], 1);

    let assign = call(
        &env,
        json!({
            "command": "manual_assign",
            "session": session,
            "payload": { "job_type": JOB, "sku": "SKU-A", "pallet_type": "EURO", "pallet_no": "2", "quantity": 5 }
        }),
    );
    assert_eq!(assign["success"], false);
    assert!(assign.get("count").is_none());

    let unassign = call(
        &env,
        json!({
            "command": "unassign",
            "session": session,
            "payload": { "job_type": JOB, "pallet": "2", "sku": "SKU-A" }
        }),
    );
    assert_eq!(unassign["success"], true);
    assert_eq!(env.inventory_repo.count_on_pallet(JOB, "2").unwrap(), 0);
}

#[test]
fn test_unknown_prefix_message_names_prefix() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_inventory(&units(JOB, "SKU-A", 1));
    let session = env.login_as("scan01", Role::Scanner);

    let resp = call(
        &env,
        json!({
            "command": "scan",
            "session": session,
            "payload": { "barcode": BARCODE, "job_type": JOB, "pallet_no": "1", "pallet_type": "EURO" }
        }),
    );
    assert_eq!(resp["success"], false);
    assert!(resp["message"].as_str().unwrap().contains("12345"));
    assert!(resp.get("sku").is_none());
}

#[test]
fn test_permission_error_has_code_and_details() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let session = env.login_as("print01", Role::Printer);

    let resp = call(
        &env,
        json!({ "command": "list_users", "session": session }),
    );
    assert_eq!(resp["success"], false);
    assert_eq!(resp["code"], "PERMISSION_DENIED");
    assert_eq!(resp["details"]["operation"], "list_users");
    assert_eq!(resp["details"]["role"], "printer");
}

#[test]
fn test_admin_config_and_logs() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let session = env.login_as("admin", Role::Admin);

    let updated = call(
        &env,
        json!({
            "command": "update_config",
            "session": session,
            "payload": { "key": "history_limit", "value": "50" }
        }),
    );
    assert_eq!(updated["success"], true);
    assert_eq!(updated["data"]["value"], "50");
    assert_eq!(updated["data"]["is_default"], false);

    let rejected = call(
        &env,
        json!({
            "command": "update_config",
            "session": session,
            "payload": { "key": "history_limit", "value": "0" }
        }),
    );
    assert_eq!(rejected["code"], "INVALID_INPUT");

    // 登录 + 配置更新各写一条日志
    let unread = call(&env, json!({ "command": "unread_log_count", "session": session }));
    assert_eq!(unread["data"]["count"], 2);

    let marked = call(&env, json!({ "command": "mark_all_logs_read", "session": session }));
    assert_eq!(marked["data"]["updated"], 2);

    let logs = call(
        &env,
        json!({ "command": "list_logs", "session": session, "payload": { "unread_only": true } }),
    );
    assert_eq!(logs["data"].as_array().unwrap().len(), 0);
}

#[test]
fn test_logout_command() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let session = env.login_as("scan01", Role::Scanner);

    let resp = call(&env, json!({ "command": "logout", "session": session }));
    assert_eq!(resp["success"], true);

    let resp = call(&env, json!({ "command": "list_jobs", "session": session }));
    assert_eq!(resp["code"], "UNAUTHENTICATED");
}

#[test]
fn test_integral_float_pallet_no_accepted() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.seed_master(&[MasterDataBuilder::new("SKU-A", "12345").build()]);
    env.seed_inventory(&units(JOB, "SKU-A", 1));
    let session = env.login_as("scan01", Role::Scanner);

    let resp = call(
        &env,
        json!({
            "command": "scan",
            "session": session,
            "payload": { "barcode": BARCODE, "job_type": JOB, "pallet_no": 3.0, "pallet_type": "EURO" }
        }),
    );
    assert_eq!(resp["success"], true);
    assert_eq!(env.inventory_repo.count_on_pallet(JOB, "3").unwrap(), 1);

    let resp = call(
        &env,
        json!({
            "command": "finish_pallet",
            "session": session,
            "payload": { "job_type": JOB, "pallet_no": 3.5 }
        }),
    );
    assert_eq!(resp["success"], false);
    assert_eq!(resp["code"], "INVALID_PALLET_NO");
}
