// ==========================================
// 仓库托盘分配跟踪系统 - 库存箱号领域模型
// ==========================================
// 对齐: migrations/v0.1_schema.sql scanfile 表
// 用途: 外部导入写入，本系统只更新托盘相关字段
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// InventoryRecord - 单个物理箱（一个 SSCC 一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,

    // ===== 发货信息 =====
    pub sscc: String,
    pub release_key: String,
    pub master_delivery: String,
    pub qty: i64,
    pub master_ctl: String,
    pub ship_to_company: String,
    pub address_lines: [String; 4],
    pub ship_to: String,
    pub zip: String,

    // ===== 条码与作业 =====
    pub barcode: String,
    pub sku: String,
    pub job_no: String,
    pub job_type: String,

    // ===== 托盘分配 =====
    pub pallet: Option<String>,      // None = 未分配
    pub pallet_type: Option<String>,
    pub tag_label: Option<String>,
    pub job_scan: Option<String>,
    pub scanned_at: Option<NaiveDateTime>,
}

impl InventoryRecord {
    /// 是否可分配（托盘为空）
    pub fn is_available(&self) -> bool {
        self.pallet.is_none()
    }
}

/// 将数据库中的托盘值归一化为 Option（'' 与 NULL 都视为未分配）
pub fn normalize_pallet(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pallet() {
        assert_eq!(normalize_pallet(None), None);
        assert_eq!(normalize_pallet(Some(String::new())), None);
        assert_eq!(normalize_pallet(Some("  ".to_string())), None);
        assert_eq!(normalize_pallet(Some("12".to_string())), Some("12".to_string()));
    }
}
