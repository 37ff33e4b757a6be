// ==========================================
// 仓库托盘分配跟踪系统 - 库存箱号数据仓储
// ==========================================
// 对齐: scanfile 表
// 红线: Repository 不含业务逻辑，只做数据映射
// 约束: 所有查询使用参数化
// ==========================================

mod core;
mod queries;


pub use core::InventoryRepository;

/// “未分配”判定（兼容外部导入写入的空字符串）
pub(crate) const AVAILABLE_PREDICATE: &str = "COALESCE(TRIM(pallet), '') = ''";

/// “已分配”判定
pub(crate) const ASSIGNED_PREDICATE: &str = "COALESCE(TRIM(pallet), '') <> ''";

/// 托盘号在库中的归一化键: 纯数字按数值（"07" 与 "7" 相同），其他值原样
pub(crate) const PALLET_KEY: &str = "CASE WHEN TRIM(pallet) <> '' AND TRIM(pallet) NOT GLOB '*[^0-9]*' \
     THEN CAST(CAST(TRIM(pallet) AS INTEGER) AS TEXT) ELSE TRIM(pallet) END";

/// 托盘号匹配条件，param 为参数占位符（如 "?2"），取值为规范托盘号
pub(crate) fn pallet_matches(param: &str) -> String {
    format!("({}) = {}", PALLET_KEY, param)
}

/// 时间戳存储格式
pub(crate) const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
