// ==========================================
// 仓库托盘分配跟踪系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 扫码/分配/移除的失败分类
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// 条码长度不足
    #[error("条码无效（长度不足 {min_len}）: {barcode}")]
    InvalidBarcode { barcode: String, min_len: usize },

    /// 前缀在主数据中找不到
    #[error("主数据中找不到前缀: {prefix}")]
    UnknownPrefix { prefix: String },

    /// 作业中该 SKU 没有未分配的箱
    #[error("作业 {job_type} 中 SKU {sku} 无可分配箱号")]
    NoAvailableUnit { sku: String, job_type: String },

    /// 人工分配数量超过可用数量
    #[error("SKU {sku} 可用数量不足: 需要 {requested}，可用 {available}")]
    InsufficientAvailability {
        sku: String,
        requested: i64,
        available: i64,
    },

    /// 数量必须为正整数
    #[error("数量无效: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// 托盘上没有可移除的记录
    #[error("托盘 {pallet} 上没有 SKU {sku}")]
    NothingToUnassign { pallet: String, sku: String },

    /// 存储层失败（含并发占用冲突），事务已回滚
    #[error("存储失败: {0}")]
    StoreFailure(String),
}

impl From<RepositoryError> for ReconcileError {
    fn from(err: RepositoryError) -> Self {
        ReconcileError::StoreFailure(err.to_string())
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_claim_becomes_store_failure() {
        let err: ReconcileError = RepositoryError::ConcurrentClaim {
            expected: 3,
            actual: 2,
        }
        .into();

        match err {
            ReconcileError::StoreFailure(msg) => assert!(msg.contains("并发占用冲突")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
