// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use pallet_tracker::domain::inventory::InventoryRecord;
use pallet_tracker::domain::master_data::MasterDataRecord;

// ==========================================
// InventoryRecord 构建器
// ==========================================

pub struct InventoryBuilder {
    sscc: String,
    sku: String,
    job_no: String,
    job_type: String,
    qty: i64,
    pallet: Option<String>,
    pallet_type: Option<String>,
    ship_to_company: String,
}

impl InventoryBuilder {
    pub fn new(sscc: &str, sku: &str, job_type: &str) -> Self {
        let job_no = job_type.split('-').next().unwrap_or(job_type).to_string();
        Self {
            sscc: sscc.to_string(),
            sku: sku.to_string(),
            job_no,
            job_type: job_type.to_string(),
            qty: 6,
            pallet: None,
            pallet_type: None,
            ship_to_company: "Cong ty ABC".to_string(),
        }
    }

    pub fn qty(mut self, qty: i64) -> Self {
        self.qty = qty;
        self
    }

    /// 预先放到托盘上（'' 模拟导入时的空字符串）
    pub fn pallet(mut self, pallet: &str, pallet_type: &str) -> Self {
        self.pallet = Some(pallet.to_string());
        self.pallet_type = Some(pallet_type.to_string());
        self
    }

    pub fn ship_to_company(mut self, company: &str) -> Self {
        self.ship_to_company = company.to_string();
        self
    }

    pub fn build(self) -> InventoryRecord {
        InventoryRecord {
            id: 0,
            sscc: self.sscc.clone(),
            release_key: format!("RK-{}", self.sscc),
            master_delivery: "DL-0001".to_string(),
            qty: self.qty,
            master_ctl: "CTL-1".to_string(),
            ship_to_company: self.ship_to_company,
            address_lines: [
                "12 Nguyen Hue".to_string(),
                "Quan 1".to_string(),
                "Ho Chi Minh".to_string(),
                String::new(),
            ],
            ship_to: "HCM".to_string(),
            zip: "700000".to_string(),
            barcode: format!("00000000{}", self.sscc),
            sku: self.sku,
            job_no: self.job_no,
            job_type: self.job_type,
            pallet: self.pallet,
            pallet_type: self.pallet_type,
            tag_label: None,
            job_scan: None,
            scanned_at: None,
        }
    }
}

/// 批量生成同一 SKU 的箱号（SSCC 按序号生成）
pub fn units(job_type: &str, sku: &str, count: usize) -> Vec<InventoryRecord> {
    (0..count)
        .map(|i| InventoryBuilder::new(&format!("{}-{:04}", sku, i + 1), sku, job_type).build())
        .collect()
}

// ==========================================
// MasterDataRecord 构建器
// ==========================================

pub struct MasterDataBuilder {
    sku: String,
    prefix: String,
    description: Option<String>,
    weight: Option<f64>,
    cbm: Option<f64>,
}

impl MasterDataBuilder {
    pub fn new(sku: &str, prefix: &str) -> Self {
        Self {
            sku: sku.to_string(),
            prefix: prefix.to_string(),
            description: None,
            weight: None,
            cbm: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn cbm(mut self, cbm: f64) -> Self {
        self.cbm = Some(cbm);
        self
    }

    pub fn build(self) -> MasterDataRecord {
        MasterDataRecord {
            id: 0,
            supplier_code: "SUP01".to_string(),
            sku: self.sku,
            description: self.description,
            quantity: 6,
            weight: self.weight,
            length: None,
            width: None,
            height: None,
            cbm: self.cbm,
            prefix: Some(self.prefix),
            remark: None,
            loose_case: None,
            cartons_per_pallet: Some(40),
            pallet_kind: None,
        }
    }
}
