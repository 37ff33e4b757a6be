use super::{ASSIGNED_PREDICATE, AVAILABLE_PREDICATE, SCAN_TIME_FORMAT};
use crate::domain::inventory::InventoryRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// 单条 UPDATE 的 id 数上限（SQLite 绑定参数上限 32766）
const ID_CHUNK: usize = 500;

// ==========================================
// InventoryRepository - 库存箱号仓储
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    /// 从共享连接创建仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 批量写入箱号记录（外部导入/测试数据准备）
    ///
    /// # 说明
    /// - 忽略 record.id，由数据库自增
    /// - 使用事务确保原子性
    pub fn batch_insert(&self, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for r in records {
            tx.execute(
                r#"
                INSERT INTO scanfile (
                    release_key, sscc, master_delivery, qty, master_ctl,
                    master_st_company, master_add1, master_add2, master_add3, master_add4,
                    ship_to, st_zip, barcode, sku, jobno, jobno_type,
                    tag_label, pallet, time_scan, pallet_type, jobscan
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                    ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
                )
                "#,
                params![
                    r.release_key,
                    r.sscc,
                    r.master_delivery,
                    r.qty,
                    r.master_ctl,
                    r.ship_to_company,
                    r.address_lines[0],
                    r.address_lines[1],
                    r.address_lines[2],
                    r.address_lines[3],
                    r.ship_to,
                    r.zip,
                    r.barcode,
                    r.sku,
                    r.job_no,
                    r.job_type,
                    r.tag_label,
                    r.pallet,
                    r.scanned_at.map(|t| t.format(SCAN_TIME_FORMAT).to_string()),
                    r.pallet_type,
                    r.job_scan,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 将指定记录分配到托盘（单事务）
    ///
    /// # 参数
    /// - ids: 待分配记录（超过 ID_CHUNK 时分批执行，仍在同一事务内）
    /// - pallet / pallet_type: 目标托盘
    /// - scanned_at: Some 时同时写入扫码时间（人工分配），None 保持原值
    ///
    /// # 返回
    /// - Ok(n): n == ids.len()
    /// - Err(ConcurrentClaim): 部分记录在此期间已被占用，整个事务回滚
    pub fn assign_records(
        &self,
        ids: &[i64],
        pallet: &str,
        pallet_type: &str,
        scanned_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut head: Vec<Value> = vec![
            Value::Text(pallet.to_string()),
            Value::Text(pallet_type.to_string()),
        ];
        let time_clause = match scanned_at {
            Some(ts) => {
                head.push(Value::Text(ts.format(SCAN_TIME_FORMAT).to_string()));
                ", time_scan = ?"
            }
            None => "",
        };

        self.update_exact(&head, ids, |n| {
            format!(
                "UPDATE scanfile SET pallet = ?, pallet_type = ?{} WHERE id IN ({}) AND {}",
                time_clause,
                placeholders(n),
                AVAILABLE_PREDICATE
            )
        })
    }

    /// 清除指定记录的托盘分配（单事务）
    ///
    /// # 返回
    /// - Ok(n): n == ids.len()
    /// - Err(ConcurrentClaim): 部分记录在此期间已被清除，整个事务回滚
    pub fn clear_records(&self, ids: &[i64]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.update_exact(&[], ids, |n| {
            format!(
                "UPDATE scanfile SET pallet = NULL, pallet_type = NULL WHERE id IN ({}) AND {}",
                placeholders(n),
                ASSIGNED_PREDICATE
            )
        })
    }

    /// 按 ID_CHUNK 分批执行 UPDATE，累计受影响行数必须等于 ids.len()，否则回滚
    ///
    /// head: 每批 SQL 中位于 id 列表之前的参数
    fn update_exact<F>(&self, head: &[Value], ids: &[i64], sql_for: F) -> RepositoryResult<usize>
    where
        F: Fn(usize) -> String,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut affected = 0;
        for chunk in ids.chunks(ID_CHUNK) {
            let sql = sql_for(chunk.len());
            let values = head
                .iter()
                .cloned()
                .chain(chunk.iter().map(|id| Value::Integer(*id)));
            affected += tx.execute(&sql, params_from_iter(values))?;
        }

        let expected = ids.len();
        if affected != expected {
            tx.rollback()?;
            return Err(RepositoryError::ConcurrentClaim {
                expected,
                actual: affected,
            });
        }

        tx.commit()?;
        Ok(affected)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
