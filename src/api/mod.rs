// ==========================================
// 仓库托盘分配跟踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 app::commands 调用
// 约束: 每个需要登录的操作显式接收 RequestContext 并校验角色
// ==========================================

pub mod config_api;
pub mod context;
pub mod error;
pub mod log_api;
pub mod print_api;
pub mod scan_api;
pub mod user_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use context::RequestContext;
pub use error::{ApiError, ApiResult};
pub use log_api::LogApi;
pub use print_api::PrintApi;
pub use scan_api::{FinishPalletResult, ScanApi};
pub use user_api::{LoginResult, UserApi};
