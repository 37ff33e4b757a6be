// ==========================================
// 仓库托盘分配跟踪系统 - 托盘打印数据
// ==========================================
// 用途: 为外部标签版式提供单个托盘的聚合数据（版式本身不在本系统内）
// ==========================================

use serde::{Deserialize, Serialize};

/// 托盘抬头（取托盘上第一条记录的发货信息）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintHeader {
    pub job_no: String,
    pub job_type: String,
    pub pallet: String,
    pub pallet_type: Option<String>,
    pub master_delivery: String,
    pub ship_to: String,
    pub ship_to_company: String,
    pub address_lines: [String; 4],
    pub zip: String,
}

/// 按 SKU 汇总的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintLine {
    pub sku: String,
    pub description: Option<String>,
    pub cartons: i64,
    pub total_qty: i64,
    pub unit_weight: Option<f64>,
    pub total_weight: Option<f64>,
    pub total_cbm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintData {
    pub header: PrintHeader,
    pub lines: Vec<PrintLine>,
    pub total_cartons: i64,
    pub total_qty: i64,
    pub total_weight: f64,
    pub total_cbm: f64,
}
