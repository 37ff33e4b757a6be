// ==========================================
// 仓库托盘分配跟踪系统 - 引擎层仓储聚合
// ==========================================
// 职责: 定义对账引擎所需的存储能力（ReconcileStore）
//       并由 SQLite 仓储集合实现
// 红线: 引擎只依赖 trait，不直接拼 SQL
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::domain::pallet::JobCounts;
use crate::repository::{InventoryRepository, MasterDataRepository, RepositoryResult};

/// 对账引擎的存储接口
///
/// 单元测试中以内存实现替换
pub trait ReconcileStore {
    /// 前缀 → SKU（最小 id 优先）
    fn find_sku_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<String>>;

    /// 未分配记录 id（最小 id 优先，最多 limit 条）
    fn find_available_ids(&self, sku: &str, job_type: &str, limit: usize)
        -> RepositoryResult<Vec<i64>>;

    /// 未分配记录总数
    fn count_available(&self, sku: &str, job_type: &str) -> RepositoryResult<i64>;

    /// 单事务分配；任一记录已被占用时整体回滚
    fn assign_records(
        &self,
        ids: &[i64],
        pallet: &str,
        pallet_type: &str,
        scanned_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<usize>;

    /// 托盘上某 SKU 的已分配记录 id（最近扫码优先）
    fn find_assigned_ids(
        &self,
        job_type: &str,
        pallet: &str,
        sku: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<i64>>;

    /// 单事务清除分配
    fn clear_records(&self, ids: &[i64]) -> RepositoryResult<usize>;

    fn count_on_pallet(&self, job_type: &str, pallet: &str) -> RepositoryResult<i64>;

    fn job_counts(&self, job_type: &str) -> RepositoryResult<JobCounts>;
}

/// 扫码引擎仓储集合
#[derive(Clone)]
pub struct ScanRepositories {
    /// 库存箱号仓储
    pub inventory_repo: Arc<InventoryRepository>,
    /// SKU 主数据仓储
    pub master_data_repo: Arc<MasterDataRepository>,
}

impl ScanRepositories {
    pub fn new(
        inventory_repo: Arc<InventoryRepository>,
        master_data_repo: Arc<MasterDataRepository>,
    ) -> Self {
        Self {
            inventory_repo,
            master_data_repo,
        }
    }
}

impl ReconcileStore for ScanRepositories {
    fn find_sku_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        self.master_data_repo.find_sku_by_prefix(prefix)
    }

    fn find_available_ids(
        &self,
        sku: &str,
        job_type: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<i64>> {
        self.inventory_repo.find_available_ids(sku, job_type, limit)
    }

    fn count_available(&self, sku: &str, job_type: &str) -> RepositoryResult<i64> {
        self.inventory_repo.count_available(sku, job_type)
    }

    fn assign_records(
        &self,
        ids: &[i64],
        pallet: &str,
        pallet_type: &str,
        scanned_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<usize> {
        self.inventory_repo
            .assign_records(ids, pallet, pallet_type, scanned_at)
    }

    fn find_assigned_ids(
        &self,
        job_type: &str,
        pallet: &str,
        sku: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<i64>> {
        self.inventory_repo
            .find_assigned_ids(job_type, pallet, sku, limit)
    }

    fn clear_records(&self, ids: &[i64]) -> RepositoryResult<usize> {
        self.inventory_repo.clear_records(ids)
    }

    fn count_on_pallet(&self, job_type: &str, pallet: &str) -> RepositoryResult<i64> {
        self.inventory_repo.count_on_pallet(job_type, pallet)
    }

    fn job_counts(&self, job_type: &str) -> RepositoryResult<JobCounts> {
        self.inventory_repo.job_counts(job_type)
    }
}
