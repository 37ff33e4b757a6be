// ==========================================
// 仓库托盘分配跟踪系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储错误，并补充认证、权限、输入校验错误
// ==========================================

use crate::domain::types::Role;
use crate::engine::error::ReconcileError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 认证与权限
    // ==========================================
    #[error("未登录或会话已过期")]
    Unauthenticated,

    #[error("用户名或密码错误")]
    InvalidCredentials,

    #[error("账号已停用: {0}")]
    InactiveUser(String),

    #[error("权限不足: role={role}, operation={operation}")]
    PermissionDenied { operation: String, role: Role },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("托盘号无效（范围 1-25）: {0}")]
    InvalidPalletNo(String),

    #[error("托盘为空: job_type={job_type}, pallet={pallet}")]
    EmptyPallet { job_type: String, pallet: String },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 扫码/分配/移除失败
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConcurrentClaim { expected, actual } => ApiError::Reconcile(
                ReconcileError::from(RepositoryError::ConcurrentClaim { expected, actual }),
            ),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
