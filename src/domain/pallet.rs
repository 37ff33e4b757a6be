// ==========================================
// 仓库托盘分配跟踪系统 - 托盘与作业统计
// ==========================================
// 托盘位不单独建表: 每次查询时根据 scanfile.pallet 重新计算
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 托盘号下限
pub const PALLET_SLOT_MIN: u8 = 1;
/// 托盘号上限
pub const PALLET_SLOT_MAX: u8 = 25;

// ==========================================
// PalletNo - 托盘号 (1..=25)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PalletNo(u8);

impl PalletNo {
    pub fn new(no: u8) -> Option<Self> {
        if (PALLET_SLOT_MIN..=PALLET_SLOT_MAX).contains(&no) {
            Some(PalletNo(no))
        } else {
            None
        }
    }

    /// 解析请求或数据库中的托盘号字符串
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<u8>().ok().and_then(PalletNo::new)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// 所有托盘号（升序）
    pub fn all() -> impl Iterator<Item = PalletNo> {
        (PALLET_SLOT_MIN..=PALLET_SLOT_MAX).map(PalletNo)
    }
}

impl fmt::Display for PalletNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PalletNo {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PalletNo::new(value).ok_or_else(|| {
            format!("托盘号超出范围 {}-{}: {}", PALLET_SLOT_MIN, PALLET_SLOT_MAX, value)
        })
    }
}

impl From<PalletNo> for u8 {
    fn from(value: PalletNo) -> Self {
        value.0
    }
}

// ==========================================
// 托盘位状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Used,
    Free,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalletSlot {
    pub pallet_no: PalletNo,
    pub status: SlotStatus,
    pub unit_count: i64,
}

// ==========================================
// 作业统计
// ==========================================

/// 作业维度的箱数统计（total = assigned + remaining）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub total: i64,
    pub assigned: i64,
    pub remaining: i64,
}

impl JobCounts {
    pub fn new(total: i64, assigned: i64) -> Self {
        Self {
            total,
            assigned,
            remaining: (total - assigned).max(0),
        }
    }
}

/// 单个托盘上的箱数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletCount {
    pub pallet: String,
    pub pallet_type: Option<String>,
    pub units: i64,
}

/// 作业汇总（总数 + 各托盘明细）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_type: String,
    pub counts: JobCounts,
    pub pallets: Vec<PalletCount>,
}

/// 作业列表项（作业号 + 作业类型）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOverview {
    pub job_no: String,
    pub job_type: String,
    pub counts: JobCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pallet_no_range() {
        assert!(PalletNo::new(0).is_none());
        assert!(PalletNo::new(1).is_some());
        assert!(PalletNo::new(25).is_some());
        assert!(PalletNo::new(26).is_none());
    }

    #[test]
    fn test_pallet_no_parse() {
        assert_eq!(PalletNo::parse(" 7 ").map(|p| p.get()), Some(7));
        assert_eq!(PalletNo::parse("07").map(|p| p.to_string()), Some("7".to_string()));
        assert!(PalletNo::parse("A1").is_none());
        assert!(PalletNo::parse("").is_none());
        assert_eq!(PalletNo::all().count(), 25);
    }

    #[test]
    fn test_pallet_no_serde() {
        let p: PalletNo = serde_json::from_str("12").unwrap();
        assert_eq!(p.get(), 12);
        assert!(serde_json::from_str::<PalletNo>("30").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "12");
    }

    #[test]
    fn test_job_counts_remaining() {
        assert_eq!(JobCounts::new(10, 4).remaining, 6);
        assert_eq!(JobCounts::new(3, 3).remaining, 0);
    }
}
