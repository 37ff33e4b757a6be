use crate::api::error::ApiError;
use crate::engine::ReconcileError;
use crate::i18n::{t, t_with_args};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ==========================================
// 公共工具：错误映射、消息本地化、请求解析
// ==========================================

/// 命令结果：Ok / Err 均为一行 JSON
pub(super) type CommandResult = Result<String, String>;

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct ErrorResponse {
    pub success: bool,

    /// 错误代码
    pub code: String,

    /// 本地化后的错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 构造错误响应 JSON
pub(super) fn error_json(code: &str, message: String, details: Option<Value>) -> String {
    let resp = ErrorResponse {
        success: false,
        code: code.to_string(),
        message,
        details,
    };
    serde_json::to_string(&resp).unwrap_or_else(|_| {
        format!(r#"{{"success":false,"code":"{}","message":"serialize failed"}}"#, code)
    })
}

/// 将 ApiError 转换为错误响应 JSON
pub(super) fn map_api_error(err: ApiError) -> String {
    let code = match &err {
        ApiError::Unauthenticated => "UNAUTHENTICATED",
        ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
        ApiError::InactiveUser(_) => "INACTIVE_USER",
        ApiError::PermissionDenied { .. } => "PERMISSION_DENIED",
        ApiError::InvalidInput(_) => "INVALID_INPUT",
        ApiError::NotFound(_) => "NOT_FOUND",
        ApiError::InvalidPalletNo(_) => "INVALID_PALLET_NO",
        ApiError::EmptyPallet { .. } => "EMPTY_PALLET",
        ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
        ApiError::Reconcile(e) => reconcile_code(e),
        ApiError::DatabaseError(_) => "DATABASE_ERROR",
        ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
        ApiError::InternalError(_) => "INTERNAL_ERROR",
    };

    let details = match &err {
        ApiError::PermissionDenied { operation, role } => Some(serde_json::json!({
            "operation": operation,
            "role": role,
        })),
        ApiError::EmptyPallet { job_type, pallet } => Some(serde_json::json!({
            "job_type": job_type,
            "pallet": pallet,
        })),
        ApiError::Reconcile(ReconcileError::InsufficientAvailability {
            requested,
            available,
            ..
        }) => Some(serde_json::json!({
            "requested": requested,
            "available": available,
        })),
        _ => None,
    };

    tracing::warn!(code, error = %err, "命令失败");
    error_json(code, localized_message(&err), details)
}

pub(super) fn reconcile_code(err: &ReconcileError) -> &'static str {
    match err {
        ReconcileError::InvalidBarcode { .. } => "INVALID_BARCODE",
        ReconcileError::UnknownPrefix { .. } => "UNKNOWN_PREFIX",
        ReconcileError::NoAvailableUnit { .. } => "NO_AVAILABLE_UNIT",
        ReconcileError::InsufficientAvailability { .. } => "INSUFFICIENT_AVAILABILITY",
        ReconcileError::InvalidQuantity { .. } => "INVALID_QUANTITY",
        ReconcileError::NothingToUnassign { .. } => "NOTHING_TO_UNASSIGN",
        ReconcileError::StoreFailure(_) => "STORE_FAILURE",
    }
}

/// 扫码/分配/移除失败的本地化消息（存储错误原文透出）
pub(super) fn reconcile_message(err: &ReconcileError) -> String {
    match err {
        ReconcileError::InvalidBarcode { barcode, min_len } => {
            let min_len = min_len.to_string();
            t_with_args(
                "scan.invalid_barcode",
                &[("barcode", barcode.as_str()), ("min_len", min_len.as_str())],
            )
        }
        ReconcileError::UnknownPrefix { prefix } => {
            t_with_args("scan.unknown_prefix", &[("prefix", prefix.as_str())])
        }
        ReconcileError::NoAvailableUnit { sku, job_type } => t_with_args(
            "scan.no_available_unit",
            &[("sku", sku.as_str()), ("job_type", job_type.as_str())],
        ),
        ReconcileError::InsufficientAvailability {
            sku,
            requested,
            available,
        } => {
            let requested = requested.to_string();
            let available = available.to_string();
            t_with_args(
                "assign.insufficient",
                &[
                    ("sku", sku.as_str()),
                    ("requested", requested.as_str()),
                    ("available", available.as_str()),
                ],
            )
        }
        ReconcileError::InvalidQuantity { quantity } => {
            let quantity = quantity.to_string();
            t_with_args("assign.invalid_quantity", &[("quantity", quantity.as_str())])
        }
        ReconcileError::NothingToUnassign { pallet, sku } => t_with_args(
            "unassign.nothing",
            &[("pallet", pallet.as_str()), ("sku", sku.as_str())],
        ),
        ReconcileError::StoreFailure(msg) => {
            t_with_args("store.failure", &[("error", msg.as_str())])
        }
    }
}

pub(super) fn localized_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthenticated => t("auth.unauthenticated"),
        ApiError::InvalidCredentials => t("auth.invalid_credentials"),
        ApiError::InactiveUser(username) => {
            t_with_args("auth.inactive", &[("username", username.as_str())])
        }
        ApiError::PermissionDenied { operation, .. } => {
            t_with_args("auth.permission_denied", &[("operation", operation.as_str())])
        }
        ApiError::InvalidInput(msg) => t_with_args("common.invalid_input", &[("error", msg.as_str())]),
        ApiError::NotFound(msg) => t_with_args("common.not_found", &[("error", msg.as_str())]),
        ApiError::InvalidPalletNo(pallet) => {
            t_with_args("pallet.invalid_no", &[("pallet", pallet.as_str())])
        }
        ApiError::EmptyPallet { pallet, .. } => {
            t_with_args("pallet.empty", &[("pallet", pallet.as_str())])
        }
        ApiError::BusinessRuleViolation(msg) => {
            t_with_args("common.rule_violation", &[("error", msg.as_str())])
        }
        ApiError::Reconcile(e) => reconcile_message(e),
        ApiError::DatabaseError(msg) | ApiError::DatabaseConnectionError(msg) => {
            t_with_args("store.failure", &[("error", msg.as_str())])
        }
        ApiError::InternalError(_) => {
            let detail = err.to_string();
            t_with_args("common.internal_error", &[("error", detail.as_str())])
        }
    }
}

// ==========================================
// 请求解析 / 响应序列化
// ==========================================

/// 解析 payload（缺省 payload 视为空对象）
pub(super) fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T, String> {
    let payload = if payload.is_null() {
        Value::Object(Default::default())
    } else {
        payload
    };
    serde_json::from_value(payload).map_err(|e| invalid_request(&e.to_string()))
}

pub(super) fn invalid_request(detail: &str) -> String {
    error_json(
        "INVALID_REQUEST",
        t_with_args("common.invalid_request", &[("error", detail)]),
        None,
    )
}

/// 成功响应 `{success: true, data: ...}`
pub(super) fn ok_data<T: Serialize>(data: &T) -> CommandResult {
    serde_json::to_string(&serde_json::json!({ "success": true, "data": data }))
        .map_err(|e| error_json("INTERNAL_ERROR", format!("序列化失败: {}", e), None))
}

/// 成功响应 `{success: true, message}`
pub(super) fn ok_message(message: String) -> CommandResult {
    serde_json::to_string(&serde_json::json!({ "success": true, "message": message }))
        .map_err(|e| error_json("INTERNAL_ERROR", format!("序列化失败: {}", e), None))
}

/// 将任意 JSON 值序列化为响应行
pub(super) fn to_line(value: Value) -> CommandResult {
    serde_json::to_string(&value)
        .map_err(|e| error_json("INTERNAL_ERROR", format!("序列化失败: {}", e), None))
}

/// 文本字段：扫码枪/前端可能把托盘号等发成数字
pub(super) fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(number_text(&n)),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// 整数值的浮点数（如 3.0）按整数输出
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

pub(super) fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(number_text(&n))),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
