// ==========================================
// 仓库托盘分配跟踪系统 - 命令耗时与 SQL 统计
// ==========================================
// 每条命令一个 PerfGuard: 结束时输出耗时与语句数
// 语句计数依赖 rusqlite trace 回调（同一线程内执行）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const ENV_PERF_SQL: &str = "PALLET_TRACKER_PERF_SQL";
const ENV_SLOW_SQL_MS: &str = "PALLET_TRACKER_SLOW_SQL_MS";
const ENV_SLOW_COMMAND_MS: &str = "PALLET_TRACKER_SLOW_COMMAND_MS";

static SETTINGS: OnceLock<PerfSettings> = OnceLock::new();

thread_local! {
    static OPEN_GUARDS: Cell<u32> = Cell::new(0);
    static STATEMENTS: Cell<u64> = Cell::new(0);
}

/// 性能统计开关与阈值（进程内只读取一次环境变量）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfSettings {
    /// 是否安装 SQLite trace/profile 回调
    pub sql_enabled: bool,
    /// 慢 SQL 阈值（毫秒，0 表示不告警）
    pub slow_sql_ms: u64,
    /// 慢命令阈值（毫秒，0 表示不告警）
    pub slow_command_ms: u64,
}

impl PerfSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Debug 构建默认开启 SQL 统计，Release 默认关闭
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            sql_enabled: lookup(ENV_PERF_SQL)
                .map(|v| is_on(&v))
                .unwrap_or(cfg!(debug_assertions)),
            slow_sql_ms: millis(ENV_SLOW_SQL_MS, if cfg!(debug_assertions) { 50 } else { 200 }),
            slow_command_ms: millis(ENV_SLOW_COMMAND_MS, 1000),
        }
    }
}

fn settings() -> PerfSettings {
    *SETTINGS.get_or_init(PerfSettings::from_env)
}

fn is_on(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// 压缩空白并按字符截断，用于日志输出
fn compact_sql(sql: &str, max_chars: usize) -> String {
    let s = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

/// 为连接安装语句计数与慢 SQL 告警
pub fn install_sqlite_tracing(conn: &mut Connection) {
    if !settings().sql_enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    conn.trace(Some(count_statement));
    conn.profile(Some(warn_slow_statement));
    tracing::debug!(slow_sql_ms = settings().slow_sql_ms, "SQL 统计已开启");
}

fn count_statement(_sql: &str) {
    // 只统计命令执行期间的语句
    if OPEN_GUARDS.with(|g| g.get() > 0) {
        STATEMENTS.with(|c| c.set(c.get().saturating_add(1)));
    }
}

fn warn_slow_statement(sql: &str, duration: Duration) {
    let threshold = settings().slow_sql_ms;
    let ms = duration.as_millis() as u64;
    if threshold > 0 && ms >= threshold {
        tracing::warn!(target: "slow_sql", duration_ms = ms, sql = %compact_sql(sql, 300), "慢 SQL");
    }
}

// ==========================================
// PerfGuard - 单条命令的耗时统计
// ==========================================

/// 用法: `let _perf = PerfGuard::new("cmd.scan");`，离开作用域时输出日志
pub struct PerfGuard {
    command: &'static str,
    started: Instant,
    statements_before: u64,
}

impl PerfGuard {
    pub fn new(command: &'static str) -> Self {
        OPEN_GUARDS.with(|g| g.set(g.get().saturating_add(1)));
        Self {
            command,
            started: Instant::now(),
            statements_before: STATEMENTS.with(|c| c.get()),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let sql_count = STATEMENTS
            .with(|c| c.get())
            .saturating_sub(self.statements_before);

        let slow_ms = settings().slow_command_ms;
        if slow_ms > 0 && elapsed_ms >= slow_ms {
            tracing::warn!(target: "perf", command = self.command, elapsed_ms, sql_count, "命令耗时过长");
        } else {
            tracing::info!(target: "perf", command = self.command, elapsed_ms, sql_count, "命令完成");
        }

        OPEN_GUARDS.with(|g| g.set(g.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> PerfSettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PerfSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_settings_from_env_values() {
        let s = settings_from(&[
            (ENV_PERF_SQL, " On "),
            (ENV_SLOW_SQL_MS, "5"),
            (ENV_SLOW_COMMAND_MS, "0"),
        ]);
        assert_eq!(
            s,
            PerfSettings {
                sql_enabled: true,
                slow_sql_ms: 5,
                slow_command_ms: 0,
            }
        );

        let off = settings_from(&[(ENV_PERF_SQL, "no"), (ENV_SLOW_SQL_MS, "abc")]);
        assert!(!off.sql_enabled);
        assert_eq!(off.slow_sql_ms, if cfg!(debug_assertions) { 50 } else { 200 });
        assert_eq!(off.slow_command_ms, 1000);
    }

    #[test]
    fn test_compact_sql() {
        let sql = "SELECT id\n    FROM scanfile\n    WHERE sku = ?1";
        assert_eq!(compact_sql(sql, 100), "SELECT id FROM scanfile WHERE sku = ?1");
        assert_eq!(compact_sql(sql, 6), "SELECT…");
        assert_eq!(compact_sql("托盘 查询", 2), "托盘…");
    }

    #[test]
    fn test_statements_counted_only_inside_guard() {
        let before = STATEMENTS.with(|c| c.get());
        count_statement("SELECT 1");
        assert_eq!(STATEMENTS.with(|c| c.get()), before);

        let guard = PerfGuard::new("cmd.test");
        count_statement("SELECT 1");
        count_statement("SELECT 2");
        assert_eq!(STATEMENTS.with(|c| c.get()) - guard.statements_before, 2);
        drop(guard);
        assert_eq!(OPEN_GUARDS.with(|g| g.get()), 0);
    }
}
