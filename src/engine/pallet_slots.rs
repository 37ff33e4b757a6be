// ==========================================
// 仓库托盘分配跟踪系统 - 托盘位计算
// ==========================================
// 托盘位状态不落库: 由作业内各托盘箱数推导
// ==========================================

use crate::domain::pallet::{PalletCount, PalletNo, PalletSlot, SlotStatus};
use std::collections::HashMap;

/// 根据各托盘箱数计算 1..=25 的托盘位
///
/// 不在 1..=25 范围内的托盘值（历史数据）不占用托盘位
pub fn compute_slots(pallets: &[PalletCount]) -> Vec<PalletSlot> {
    let mut used: HashMap<PalletNo, i64> = HashMap::new();
    for p in pallets {
        if let Some(no) = PalletNo::parse(&p.pallet) {
            *used.entry(no).or_insert(0) += p.units;
        }
    }

    PalletNo::all()
        .map(|no| match used.get(&no) {
            Some(&count) if count > 0 => PalletSlot {
                pallet_no: no,
                status: SlotStatus::Used,
                unit_count: count,
            },
            _ => PalletSlot {
                pallet_no: no,
                status: SlotStatus::Free,
                unit_count: 0,
            },
        })
        .collect()
}
