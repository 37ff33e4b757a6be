// ==========================================
// 仓库托盘分配跟踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 扫码核对箱号、分配到托盘、统计与打印
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 扫码核对与分配规则
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与命令分派
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DecoderVariant, Role, RoleSet};

// 领域实体
pub use domain::{
    ActionLog, ActionType, InventoryRecord, JobCounts, MasterDataRecord, PalletNo, PalletSlot,
    PrintData, User,
};

// 引擎
pub use engine::{BarcodeDecoder, PalletReconciler, ReconcileError};

// API
pub use api::{ApiError, ConfigApi, LogApi, PrintApi, RequestContext, ScanApi, UserApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库托盘分配跟踪系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
