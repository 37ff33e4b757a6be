// ==========================================
// 仓库托盘分配跟踪系统 - 配置层
// ==========================================
// 职责: 运行期配置读取与更新
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigEntry, ConfigManager};
