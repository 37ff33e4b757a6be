// ==========================================
// 仓库托盘分配跟踪系统 - 引擎层
// ==========================================
// 职责: 实现扫码对账规则,不拼 SQL
// 红线: Engine 只依赖 ReconcileStore，所有失败返回 ReconcileError
// ==========================================

pub mod barcode;
pub mod error;
pub mod pallet_slots;
pub mod print_sheet;
pub mod reconciler;
pub mod repositories;

// 重导出核心引擎
pub use barcode::BarcodeDecoder;
pub use error::{ReconcileError, ReconcileResult};
pub use pallet_slots::compute_slots;
pub use print_sheet::build_print_data;
pub use reconciler::{
    AssignOutcome, AssignRequest, PalletReconciler, ScanOutcome, ScanRequest, UnassignOutcome,
    UnassignRequest,
};
pub use repositories::{ReconcileStore, ScanRepositories};
