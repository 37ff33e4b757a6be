// ==========================================
// 仓库托盘分配跟踪系统 - 托盘打印 API
// ==========================================
// 职责: 托盘打印数据查询、CSV 导出（供外部标签版式使用）
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::context::RequestContext;
use crate::api::error::{ApiError, ApiResult};
use crate::api::scan_api::{parse_pallet, require_text};
use crate::domain::print::PrintData;
use crate::domain::types::RoleSet;
use crate::engine::build_print_data;
use crate::repository::{InventoryRepository, MasterDataRepository};

/// CSV 列（每个 SKU 一行，抬头信息逐行重复）
const CSV_HEADERS: [&str; 16] = [
    "job_no",
    "job_type",
    "pallet",
    "pallet_type",
    "master_delivery",
    "ship_to",
    "ship_to_company",
    "address",
    "zip",
    "sku",
    "description",
    "cartons",
    "total_qty",
    "unit_weight",
    "total_weight",
    "total_cbm",
];

pub struct PrintApi {
    inventory_repo: Arc<InventoryRepository>,
    master_data_repo: Arc<MasterDataRepository>,
}

impl PrintApi {
    pub fn new(
        inventory_repo: Arc<InventoryRepository>,
        master_data_repo: Arc<MasterDataRepository>,
    ) -> Self {
        Self {
            inventory_repo,
            master_data_repo,
        }
    }

    /// 单个托盘的打印数据
    ///
    /// 托盘为空时返回 NotFound
    pub fn print_data(
        &self,
        ctx: &RequestContext,
        job_type: &str,
        pallet_no: &str,
    ) -> ApiResult<PrintData> {
        ctx.require(RoleSet::PRINTING, "print_data")?;
        self.load(job_type, pallet_no)
    }

    /// 导出 CSV 文本
    pub fn print_csv(&self, ctx: &RequestContext, job_type: &str, pallet_no: &str) -> ApiResult<String> {
        ctx.require(RoleSet::PRINTING, "print_csv")?;
        let data = self.load(job_type, pallet_no)?;
        to_csv(&data)
    }

    fn load(&self, job_type: &str, pallet_no: &str) -> ApiResult<PrintData> {
        let job_type = require_text("job_type", job_type)?;
        let pallet = parse_pallet(pallet_no)?.to_string();

        let records = self.inventory_repo.list_on_pallet(job_type, &pallet)?;

        let mut masters = HashMap::new();
        for r in &records {
            if masters.contains_key(&r.sku) {
                continue;
            }
            if let Some(m) = self.master_data_repo.find_by_sku(&r.sku)? {
                masters.insert(r.sku.clone(), m);
            }
        }

        build_print_data(&records, &masters).ok_or_else(|| {
            ApiError::NotFound(format!("作业 {} 托盘 {} 无记录", job_type, pallet))
        })
    }
}

fn to_csv(data: &PrintData) -> ApiResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADERS).map_err(csv_error)?;

    let h = &data.header;
    let address = h
        .address_lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    for line in &data.lines {
        let cartons = line.cartons.to_string();
        let total_qty = line.total_qty.to_string();
        let unit_weight = fmt_opt(line.unit_weight);
        let total_weight = fmt_opt(line.total_weight);
        let total_cbm = fmt_opt(line.total_cbm);
        wtr.write_record([
            h.job_no.as_str(),
            h.job_type.as_str(),
            h.pallet.as_str(),
            h.pallet_type.as_deref().unwrap_or(""),
            h.master_delivery.as_str(),
            h.ship_to.as_str(),
            h.ship_to_company.as_str(),
            address.as_str(),
            h.zip.as_str(),
            line.sku.as_str(),
            line.description.as_deref().unwrap_or(""),
            cartons.as_str(),
            total_qty.as_str(),
            unit_weight.as_str(),
            total_weight.as_str(),
            total_cbm.as_str(),
        ])
        .map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("CSV 写入失败: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::InternalError(format!("CSV 编码失败: {}", e)))
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.3}", x)).unwrap_or_default()
}

fn csv_error(e: csv::Error) -> ApiError {
    ApiError::InternalError(format!("CSV 写入失败: {}", e))
}
