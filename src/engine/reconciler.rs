// ==========================================
// 仓库托盘分配跟踪系统 - 托盘对账引擎
// ==========================================
// 职责: 扫码分配 / 人工批量分配 / 移除分配
// 流程: 条码解码 → 前缀解析 SKU → 匹配未分配箱 → 单事务提交 → 重新统计
// 红线: Engine 不拼 SQL，只通过 ReconcileStore 访问存储
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::pallet::{JobCounts, PalletNo};
use crate::engine::barcode::BarcodeDecoder;
use crate::engine::error::{ReconcileError, ReconcileResult};
use crate::engine::repositories::ReconcileStore;


// ==========================================
// 请求 / 结果
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
    pub job_type: String,
    pub pallet: PalletNo,
    pub pallet_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub sku: String,
    pub pallet: PalletNo,
    /// 提交后该托盘上的箱数
    pub pallet_count: i64,
    /// 提交后作业统计
    pub counts: JobCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub job_type: String,
    pub sku: String,
    pub pallet: PalletNo,
    pub pallet_type: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub sku: String,
    pub pallet: PalletNo,
    pub assigned: usize,
    pub pallet_count: i64,
    pub counts: JobCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignRequest {
    pub job_type: String,
    pub pallet: PalletNo,
    pub sku: String,
    /// None 表示移除该托盘上此 SKU 的全部箱
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignOutcome {
    pub sku: String,
    pub pallet: PalletNo,
    pub cleared: usize,
}

// ==========================================
// PalletReconciler - 托盘对账引擎
// ==========================================
pub struct PalletReconciler<S: ReconcileStore> {
    store: S,
    decoder: BarcodeDecoder,
}

impl<S: ReconcileStore> PalletReconciler<S> {
    pub fn new(store: S, decoder: BarcodeDecoder) -> Self {
        Self { store, decoder }
    }

    pub fn decoder(&self) -> BarcodeDecoder {
        self.decoder
    }

    // ==========================================
    // 扫码分配
    // ==========================================

    /// 扫一个箱：分配该 SKU 在作业中 id 最小的未分配箱
    ///
    /// 不写扫码时间（保留导入时的值）
    pub fn scan(&self, req: &ScanRequest) -> ReconcileResult<ScanOutcome> {
        let prefix = self.decoder.decode(&req.barcode).map_err(|e| {
            warn!(barcode = %req.barcode, variant = %self.decoder.variant(), "条码长度不足");
            e
        })?;

        let sku = self.resolve_sku(&prefix)?;

        let ids = self.store.find_available_ids(&sku, &req.job_type, 1)?;
        debug!(sku = %sku, job_type = %req.job_type, found = ids.len(), "匹配未分配箱");
        if ids.is_empty() {
            warn!(sku = %sku, job_type = %req.job_type, "无可分配箱号");
            return Err(ReconcileError::NoAvailableUnit {
                sku,
                job_type: req.job_type.clone(),
            });
        }

        let pallet = req.pallet.to_string();
        self.store
            .assign_records(&ids, &pallet, &req.pallet_type, None)?;

        let pallet_count = self.store.count_on_pallet(&req.job_type, &pallet)?;
        let counts = self.store.job_counts(&req.job_type)?;

        info!(
            sku = %sku,
            job_type = %req.job_type,
            pallet = %pallet,
            record_id = ids[0],
            pallet_count,
            remaining = counts.remaining,
            "扫码分配完成"
        );

        Ok(ScanOutcome {
            sku,
            pallet: req.pallet,
            pallet_count,
            counts,
        })
    }

    // ==========================================
    // 人工批量分配
    // ==========================================

    /// 人工分配 quantity 个箱；可用不足时不做任何修改
    pub fn manual_assign(&self, req: &AssignRequest) -> ReconcileResult<AssignOutcome> {
        self.manual_assign_at(req, chrono::Local::now().naive_local())
    }

    /// 同 manual_assign，扫码时间由调用方给定
    pub fn manual_assign_at(
        &self,
        req: &AssignRequest,
        now: NaiveDateTime,
    ) -> ReconcileResult<AssignOutcome> {
        if req.quantity <= 0 {
            return Err(ReconcileError::InvalidQuantity {
                quantity: req.quantity,
            });
        }

        let requested = req.quantity as usize;
        let ids = self
            .store
            .find_available_ids(&req.sku, &req.job_type, requested)?;
        if ids.len() < requested {
            let available = self.store.count_available(&req.sku, &req.job_type)?;
            warn!(
                sku = %req.sku,
                job_type = %req.job_type,
                requested,
                available,
                "可用数量不足，未做修改"
            );
            return Err(ReconcileError::InsufficientAvailability {
                sku: req.sku.clone(),
                requested: req.quantity,
                available,
            });
        }

        let pallet = req.pallet.to_string();
        let assigned = self
            .store
            .assign_records(&ids, &pallet, &req.pallet_type, Some(now))?;

        let pallet_count = self.store.count_on_pallet(&req.job_type, &pallet)?;
        let counts = self.store.job_counts(&req.job_type)?;

        info!(
            sku = %req.sku,
            job_type = %req.job_type,
            pallet = %pallet,
            assigned,
            pallet_count,
            "人工分配完成"
        );

        Ok(AssignOutcome {
            sku: req.sku.clone(),
            pallet: req.pallet,
            assigned,
            pallet_count,
            counts,
        })
    }

    // ==========================================
    // 移除分配
    // ==========================================

    /// 从托盘移除最多 quantity 个该 SKU 的箱（最近扫码优先）
    pub fn unassign(&self, req: &UnassignRequest) -> ReconcileResult<UnassignOutcome> {
        let limit = match req.quantity {
            Some(q) if q <= 0 => return Err(ReconcileError::InvalidQuantity { quantity: q }),
            Some(q) => Some(q as usize),
            None => None,
        };

        let pallet = req.pallet.to_string();
        let ids = self
            .store
            .find_assigned_ids(&req.job_type, &pallet, &req.sku, limit)?;
        if ids.is_empty() {
            warn!(sku = %req.sku, job_type = %req.job_type, pallet = %pallet, "托盘上无该 SKU");
            return Err(ReconcileError::NothingToUnassign {
                pallet,
                sku: req.sku.clone(),
            });
        }

        let cleared = self.store.clear_records(&ids)?;
        info!(
            sku = %req.sku,
            job_type = %req.job_type,
            pallet = %pallet,
            cleared,
            "移除分配完成"
        );

        Ok(UnassignOutcome {
            sku: req.sku.clone(),
            pallet: req.pallet,
            cleared,
        })
    }

    fn resolve_sku(&self, prefix: &str) -> ReconcileResult<String> {
        match self.store.find_sku_by_prefix(prefix)? {
            Some(sku) => {
                debug!(prefix = %prefix, sku = %sku, "前缀解析");
                Ok(sku)
            }
            None => {
                warn!(prefix = %prefix, "主数据中找不到前缀");
                Err(ReconcileError::UnknownPrefix {
                    prefix: prefix.to_string(),
                })
            }
        }
    }
}
