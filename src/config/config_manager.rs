// ==========================================
// 仓库托盘分配跟踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、更新
// 存储: config_kv 表 (key-value + scope)
// 说明: 未写入的键使用 config_keys 中的默认值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::DecoderVariant;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置项（含默认值标记）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub is_default: bool,
    pub updated_at: Option<String>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    // ===== 类型化读取 =====

    /// 条码解码版本
    pub fn get_decoder_variant(&self) -> Result<DecoderVariant, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::BARCODE_DECODER_VARIANT,
            config_keys::DEFAULT_DECODER_VARIANT,
        )?;
        DecoderVariant::parse(&value)
            .ok_or_else(|| format!("无效的条码解码版本: {}", value).into())
    }

    /// 会话有效天数
    pub fn get_session_lifetime_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::SESSION_LIFETIME_DAYS,
            &config_keys::DEFAULT_SESSION_LIFETIME_DAYS.to_string(),
        )?;
        Ok(value.trim().parse::<i64>()?)
    }

    /// 扫码历史默认条数
    pub fn get_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::HISTORY_LIMIT,
            &config_keys::DEFAULT_HISTORY_LIMIT.to_string(),
        )?;
        Ok(value.trim().parse::<usize>()?)
    }

    // ===== 写入 =====

    /// 写入 global 配置（UPSERT）
    ///
    /// 说明：值的合法性由调用方先用 config_keys::validate 校验
    pub fn set_global_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 列出全部已知配置（已写入的值覆盖默认值）
    pub fn list_entries(&self) -> Result<Vec<ConfigEntry>, Box<dyn Error>> {
        let stored = {
            let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            let mut stmt = conn.prepare(
                "SELECT key, value, updated_at FROM config_kv WHERE scope_id = 'global' ORDER BY key",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        (row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?),
                    ))
                })?
                .collect::<Result<BTreeMap<_, _>, _>>()?;
            rows
        };

        let mut entries: Vec<ConfigEntry> = config_keys::DEFAULTS
            .iter()
            .map(|(key, default)| match stored.get(*key) {
                Some((value, updated_at)) => ConfigEntry {
                    key: key.to_string(),
                    value: value.clone(),
                    is_default: false,
                    updated_at: updated_at.clone(),
                },
                None => ConfigEntry {
                    key: key.to_string(),
                    value: default.to_string(),
                    is_default: true,
                    updated_at: None,
                },
            })
            .collect();

        // 未登记的键（例如外部工具写入）也展示出来
        for (key, (value, updated_at)) in &stored {
            if !config_keys::is_known(key) {
                entries.push(ConfigEntry {
                    key: key.clone(),
                    value: value.clone(),
                    is_default: false,
                    updated_at: updated_at.clone(),
                });
            }
        }

        Ok(entries)
    }

    /// 获取所有配置的快照（JSON格式，启动日志使用）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let map: BTreeMap<String, String> = self
            .list_entries()?
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect();
        Ok(serde_json::to_string(&json!(map))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 条码解码
    pub const BARCODE_DECODER_VARIANT: &str = "barcode_decoder_variant";
    pub const DEFAULT_DECODER_VARIANT: &str = "v1";

    // 登录会话
    pub const SESSION_LIFETIME_DAYS: &str = "session_lifetime_days";
    pub const DEFAULT_SESSION_LIFETIME_DAYS: i64 = 7;

    // 扫码历史
    pub const HISTORY_LIMIT: &str = "history_limit";
    pub const DEFAULT_HISTORY_LIMIT: usize = 200;

    /// 已登记的键及默认值（列表展示顺序）
    pub const DEFAULTS: &[(&str, &str)] = &[
        (BARCODE_DECODER_VARIANT, DEFAULT_DECODER_VARIANT),
        (SESSION_LIFETIME_DAYS, "7"),
        (HISTORY_LIMIT, "200"),
    ];

    pub fn is_known(key: &str) -> bool {
        DEFAULTS.iter().any(|(k, _)| *k == key)
    }

    /// 校验配置值
    ///
    /// # 返回
    /// - Err(String): 不可接受的原因
    pub fn validate(key: &str, value: &str) -> Result<(), String> {
        let v = value.trim();
        match key {
            BARCODE_DECODER_VARIANT => crate::domain::types::DecoderVariant::parse(v)
                .map(|_| ())
                .ok_or_else(|| format!("{} 只能是 v1 或 v2: {}", key, value)),
            SESSION_LIFETIME_DAYS => match v.parse::<i64>() {
                Ok(days) if (1..=365).contains(&days) => Ok(()),
                _ => Err(format!("{} 必须是 1-365 之间的整数: {}", key, value)),
            },
            HISTORY_LIMIT => match v.parse::<usize>() {
                Ok(limit) if (1..=10_000).contains(&limit) => Ok(()),
                _ => Err(format!("{} 必须是 1-10000 之间的整数: {}", key, value)),
            },
            _ => Err(format!("未知配置键: {}", key)),
        }
    }
}
