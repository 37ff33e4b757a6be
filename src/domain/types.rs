// ==========================================
// 仓库托盘分配跟踪系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 用户角色 (Role)
// ==========================================
// 封闭枚举: 只允许 admin / scanner / printer
// 序列化格式: 小写（与 users.role 列一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,   // 管理员
    Scanner, // 扫码员
    Printer, // 打印员
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Scanner => "scanner",
            Role::Printer => "printer",
        }
    }

    /// 从字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "scanner" => Some(Role::Scanner),
            "printer" => Some(Role::Printer),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Role::Admin => 0b001,
            Role::Scanner => 0b010,
            Role::Printer => 0b100,
        }
    }
}

// ==========================================
// 角色集合 (RoleSet)
// ==========================================
// 用途: 每个操作声明允许的角色集合，由 RequestContext 校验
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    /// 仅管理员
    pub const ADMIN: RoleSet = RoleSet(0b001);
    /// 扫码作业（扫码/分配/移除/完成托盘）
    pub const SCANNING: RoleSet = RoleSet(0b011);
    /// 打印作业
    pub const PRINTING: RoleSet = RoleSet(0b101);
    /// 所有已登录用户
    pub const ANY: RoleSet = RoleSet(0b111);

    pub fn of(roles: &[Role]) -> Self {
        RoleSet(roles.iter().fold(0, |acc, r| acc | r.bit()))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }
}

// ==========================================
// 条码解码策略 (Decoder Variant)
// ==========================================
// 两个历史版本的偏移规则不同，通过配置 barcode_decoder_variant 显式选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderVariant {
    /// v1: 取第 [8, 13) 个字符，最短 14 位
    V1,
    /// v2: 取倒数第 6 到倒数第 2 个字符（共 5 位），最短 10 位
    V2,
}

impl fmt::Display for DecoderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DecoderVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoderVariant::V1 => "v1",
            DecoderVariant::V2 => "v2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Some(DecoderVariant::V1),
            "v2" => Some(DecoderVariant::V2),
            _ => None,
        }
    }
}

impl Default for DecoderVariant {
    fn default() -> Self {
        DecoderVariant::V1
    }
}
