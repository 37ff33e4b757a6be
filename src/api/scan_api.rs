// ==========================================
// 仓库托盘分配跟踪系统 - 扫码与托盘 API
// ==========================================
// 职责:
// 1. 扫码分配 / 人工分配 / 移除分配（委托 PalletReconciler）
// 2. 作业列表、作业汇总、托盘位、扫码历史
// 3. 完成托盘（写操作日志）
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::context::RequestContext;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::inventory::InventoryRecord;
use crate::domain::pallet::{JobOverview, JobSummary, PalletNo, PalletSlot};
use crate::domain::types::RoleSet;
use crate::engine::{
    compute_slots, AssignOutcome, AssignRequest, BarcodeDecoder, PalletReconciler, ScanOutcome,
    ScanRepositories, ScanRequest, UnassignOutcome, UnassignRequest,
};
use crate::i18n::t_with_args;
use crate::repository::{ActionLogRepository, InventoryRepository};

/// 完成托盘结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishPalletResult {
    pub job_type: String,
    pub pallet: PalletNo,
    pub units: i64,
    pub log_id: i64,
}

// ==========================================
// ScanApi - 扫码与托盘 API
// ==========================================
pub struct ScanApi {
    repos: ScanRepositories,
    inventory_repo: Arc<InventoryRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ScanApi {
    pub fn new(
        repos: ScanRepositories,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            inventory_repo: repos.inventory_repo.clone(),
            repos,
            action_log_repo,
            config_manager,
        }
    }

    /// 按当前配置的解码版本构造引擎（配置可在运行期修改）
    fn reconciler(&self) -> ApiResult<PalletReconciler<ScanRepositories>> {
        let variant = self
            .config_manager
            .get_decoder_variant()
            .map_err(|e| ApiError::InternalError(format!("读取条码解码配置失败: {}", e)))?;
        Ok(PalletReconciler::new(
            self.repos.clone(),
            BarcodeDecoder::new(variant),
        ))
    }

    // ==========================================
    // 分配操作
    // ==========================================

    /// 扫码分配一个箱
    pub fn scan(
        &self,
        ctx: &RequestContext,
        barcode: &str,
        job_type: &str,
        pallet_no: &str,
        pallet_type: &str,
    ) -> ApiResult<ScanOutcome> {
        ctx.require(RoleSet::SCANNING, "scan")?;
        let job_type = require_text("job_type", job_type)?;
        let pallet = parse_pallet(pallet_no)?;
        let pallet_type = require_text("pallet_type", pallet_type)?;

        let outcome = self.reconciler()?.scan(&ScanRequest {
            barcode: barcode.to_string(),
            job_type: job_type.to_string(),
            pallet,
            pallet_type: pallet_type.to_string(),
        })?;
        Ok(outcome)
    }

    /// 人工分配 quantity 个箱
    pub fn manual_assign(
        &self,
        ctx: &RequestContext,
        job_type: &str,
        sku: &str,
        pallet_type: &str,
        pallet_no: &str,
        quantity: i64,
    ) -> ApiResult<AssignOutcome> {
        ctx.require(RoleSet::SCANNING, "manual_assign")?;
        let req = AssignRequest {
            job_type: require_text("job_type", job_type)?.to_string(),
            sku: require_text("sku", sku)?.to_string(),
            pallet: parse_pallet(pallet_no)?,
            pallet_type: require_text("pallet_type", pallet_type)?.to_string(),
            quantity,
        };

        Ok(self.reconciler()?.manual_assign(&req)?)
    }

    /// 从托盘移除箱（quantity 为 None 时移除全部）
    pub fn unassign(
        &self,
        ctx: &RequestContext,
        job_type: &str,
        pallet_no: &str,
        sku: &str,
        quantity: Option<i64>,
    ) -> ApiResult<UnassignOutcome> {
        ctx.require(RoleSet::SCANNING, "unassign")?;
        let req = UnassignRequest {
            job_type: require_text("job_type", job_type)?.to_string(),
            pallet: parse_pallet(pallet_no)?,
            sku: require_text("sku", sku)?.to_string(),
            quantity,
        };

        Ok(self.reconciler()?.unassign(&req)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn list_jobs(&self, ctx: &RequestContext) -> ApiResult<Vec<JobOverview>> {
        ctx.require(RoleSet::ANY, "list_jobs")?;
        Ok(self.inventory_repo.list_jobs()?)
    }

    /// 作业汇总
    ///
    /// 作业不存在时返回 NotFound
    pub fn job_summary(&self, ctx: &RequestContext, job_type: &str) -> ApiResult<JobSummary> {
        ctx.require(RoleSet::ANY, "job_summary")?;
        let job_type = require_text("job_type", job_type)?;

        let counts = self.inventory_repo.job_counts(job_type)?;
        if counts.total == 0 {
            return Err(ApiError::NotFound(format!("作业 {}", job_type)));
        }
        let pallets = self.inventory_repo.pallet_counts(job_type)?;

        Ok(JobSummary {
            job_type: job_type.to_string(),
            counts,
            pallets,
        })
    }

    /// 托盘位 1..=25 的占用情况
    pub fn pallet_slots(&self, ctx: &RequestContext, job_type: &str) -> ApiResult<Vec<PalletSlot>> {
        ctx.require(RoleSet::ANY, "pallet_slots")?;
        let job_type = require_text("job_type", job_type)?;

        let pallets = self.inventory_repo.pallet_counts(job_type)?;
        Ok(compute_slots(&pallets))
    }

    /// 扫码历史（最近扫码优先）
    ///
    /// # 参数
    /// - pallet_no: Some 时只看该托盘
    /// - limit: None 时使用配置 history_limit
    pub fn history(
        &self,
        ctx: &RequestContext,
        job_type: &str,
        pallet_no: Option<&str>,
        limit: Option<usize>,
    ) -> ApiResult<Vec<InventoryRecord>> {
        ctx.require(RoleSet::ANY, "history")?;
        let job_type = require_text("job_type", job_type)?;
        let pallet = pallet_no.map(parse_pallet).transpose()?;

        let limit = match limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于 0".to_string())),
            Some(l) => l,
            None => self
                .config_manager
                .get_history_limit()
                .map_err(|e| ApiError::InternalError(format!("读取 history_limit 失败: {}", e)))?,
        };

        let pallet_str = pallet.map(|p| p.to_string());
        Ok(self
            .inventory_repo
            .list_history(job_type, pallet_str.as_deref(), limit)?)
    }

    // ==========================================
    // 完成托盘
    // ==========================================

    /// 完成托盘：只记录日志，不修改箱号
    pub fn finish_pallet(
        &self,
        ctx: &RequestContext,
        job_type: &str,
        pallet_no: &str,
    ) -> ApiResult<FinishPalletResult> {
        ctx.require(RoleSet::SCANNING, "finish_pallet")?;
        let job_type = require_text("job_type", job_type)?;
        let pallet = parse_pallet(pallet_no)?;
        let pallet_str = pallet.to_string();

        let units = self.inventory_repo.count_on_pallet(job_type, &pallet_str)?;
        if units == 0 {
            return Err(ApiError::EmptyPallet {
                job_type: job_type.to_string(),
                pallet: pallet_str,
            });
        }

        let units_str = units.to_string();
        let message = t_with_args(
            "pallet.finished",
            &[
                ("pallet", pallet_str.as_str()),
                ("job_type", job_type),
                ("count", units_str.as_str()),
            ],
        );
        let log_id = self.action_log_repo.insert(&ActionLog::new(
            &ctx.username,
            ActionType::FinishPallet,
            message,
        ))?;

        tracing::info!(
            username = %ctx.username,
            job_type,
            pallet = %pallet,
            units,
            "托盘已完成"
        );

        Ok(FinishPalletResult {
            job_type: job_type.to_string(),
            pallet,
            units,
            log_id,
        })
    }
}

// ==========================================
// 参数校验
// ==========================================

/// 非空文本（去除首尾空白）
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(v)
}

/// 托盘号 1..=25
pub(crate) fn parse_pallet(value: &str) -> ApiResult<PalletNo> {
    PalletNo::parse(value).ok_or_else(|| ApiError::InvalidPalletNo(value.to_string()))
}
