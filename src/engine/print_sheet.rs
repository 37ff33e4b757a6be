// ==========================================
// 仓库托盘分配跟踪系统 - 托盘打印数据聚合
// ==========================================
// 输入: 单个托盘上的全部箱号记录 + 相关 SKU 主数据
// 输出: 抬头 + 按 SKU 汇总的明细 + 托盘合计
// ==========================================

use std::collections::HashMap;

use crate::domain::inventory::InventoryRecord;
use crate::domain::master_data::MasterDataRecord;
use crate::domain::print::{PrintData, PrintHeader, PrintLine};

/// 聚合托盘打印数据
///
/// # 参数
/// - records: 托盘上的记录（需非空；明细顺序按 SKU 首次出现顺序）
/// - masters: SKU → 主数据，缺失时描述/重量/体积为空
///
/// # 返回
/// - None: records 为空
pub fn build_print_data(
    records: &[InventoryRecord],
    masters: &HashMap<String, MasterDataRecord>,
) -> Option<PrintData> {
    let first = records.first()?;

    let header = PrintHeader {
        job_no: first.job_no.clone(),
        job_type: first.job_type.clone(),
        pallet: first.pallet.clone().unwrap_or_default(),
        pallet_type: first.pallet_type.clone(),
        master_delivery: first.master_delivery.clone(),
        ship_to: first.ship_to.clone(),
        ship_to_company: first.ship_to_company.clone(),
        address_lines: first.address_lines.clone(),
        zip: first.zip.clone(),
    };

    // SKU → (箱数, 总数量)，保持首次出现顺序
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (i64, i64)> = HashMap::new();
    for r in records {
        let entry = sums.entry(r.sku.as_str()).or_insert_with(|| {
            order.push(r.sku.as_str());
            (0, 0)
        });
        entry.0 += 1;
        entry.1 += r.qty;
    }

    let lines: Vec<PrintLine> = order
        .into_iter()
        .map(|sku| {
            let (cartons, total_qty) = sums[sku];
            let master = masters.get(sku);
            let unit_weight = master.and_then(|m| m.weight);
            let unit_cbm = master.and_then(|m| m.unit_cbm());
            PrintLine {
                sku: sku.to_string(),
                description: master.and_then(|m| m.description.clone()),
                cartons,
                total_qty,
                unit_weight,
                total_weight: unit_weight.map(|w| w * cartons as f64),
                total_cbm: unit_cbm.map(|c| c * cartons as f64),
            }
        })
        .collect();

    let total_cartons = lines.iter().map(|l| l.cartons).sum();
    let total_qty = lines.iter().map(|l| l.total_qty).sum();
    let total_weight = lines.iter().filter_map(|l| l.total_weight).sum();
    let total_cbm = lines.iter().filter_map(|l| l.total_cbm).sum();

    Some(PrintData {
        header,
        lines,
        total_cartons,
        total_qty,
        total_weight,
        total_cbm,
    })
}
