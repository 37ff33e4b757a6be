// ==========================================
// 仓库托盘分配跟踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod inventory;
pub mod master_data;
pub mod pallet;
pub mod print;
pub mod types;
pub mod user;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use inventory::InventoryRecord;
pub use master_data::MasterDataRecord;
pub use pallet::{
    JobCounts, JobOverview, JobSummary, PalletCount, PalletNo, PalletSlot, SlotStatus,
    PALLET_SLOT_MAX, PALLET_SLOT_MIN,
};
pub use print::{PrintData, PrintHeader, PrintLine};
pub use types::{DecoderVariant, Role, RoleSet};
pub use user::{User, UserSession};
