// ==========================================
// 仓库托盘分配跟踪系统 - SKU 主数据领域模型
// ==========================================
// 对齐: migrations/v0.1_schema.sql masterdata 表
// 用途: 条码前缀 → SKU 的映射来源，本系统只读
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterDataRecord {
    pub id: i64,
    pub supplier_code: String, // 供应商代码
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,

    // ===== 物理尺寸 =====
    pub weight: Option<f64>, // 单箱重量（kg）
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub cbm: Option<f64>, // 单箱体积（m³）

    // ===== 条码映射 =====
    pub prefix: Option<String>,

    pub remark: Option<String>,
    pub loose_case: Option<String>,
    pub cartons_per_pallet: Option<i64>,
    pub pallet_kind: Option<String>,
}

impl MasterDataRecord {
    /// 单箱体积：优先使用 cbm 字段，缺失时按长宽高（cm）换算
    pub fn unit_cbm(&self) -> Option<f64> {
        if let Some(cbm) = self.cbm {
            return Some(cbm);
        }
        match (self.length, self.width, self.height) {
            (Some(l), Some(w), Some(h)) => Some(l * w * h / 1_000_000.0),
            _ => None,
        }
    }
}
