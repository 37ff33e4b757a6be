// ==========================================
// 仓库托盘分配跟踪系统 - 应用层
// ==========================================
// 职责: 应用状态装配与 JSON 命令分派
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{command_names, dispatch, CommandEnvelope};
pub use state::{get_default_db_path, AppState};
