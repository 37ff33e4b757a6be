// ==========================================
// 仓库托盘分配跟踪系统 - 操作日志数据仓储
// ==========================================
// 依据: migrations/v0.1_schema.sql logs 表
// 红线: Repository 只做数据映射，日志内容由 API 层组织
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
