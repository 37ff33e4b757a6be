// ==========================================
// 仓库托盘分配跟踪系统 - SKU 主数据仓储
// ==========================================
// 职责: masterdata 表的读取（前缀解析、打印明细）
// 说明: 主数据由外部流程维护，写入仅用于导入工具和测试
// ==========================================

use crate::domain::master_data::MasterDataRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, mancc, sku, description, quantity, weight, length, width, height, cbm,
    prefix, remark, loosecase, cartonperpallet, kindpallet
"#;

pub struct MasterDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MasterDataRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入主数据（事务）
    pub fn batch_insert(&self, records: &[MasterDataRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for r in records {
            tx.execute(
                r#"
                INSERT INTO masterdata (
                    mancc, sku, description, quantity, weight, length, width, height, cbm,
                    prefix, remark, loosecase, cartonperpallet, kindpallet
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    r.supplier_code,
                    r.sku,
                    r.description,
                    r.quantity,
                    r.weight,
                    r.length,
                    r.width,
                    r.height,
                    r.cbm,
                    r.prefix,
                    r.remark,
                    r.loose_case,
                    r.cartons_per_pallet,
                    r.pallet_kind,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 按条码前缀查找 SKU（精确匹配，多条时取最小 id）
    pub fn find_sku_by_prefix(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT sku FROM masterdata WHERE prefix = ?1 ORDER BY id LIMIT 1")?;

        match stmt.query_row(params![prefix], |row| row.get(0)) {
            Ok(sku) => Ok(Some(sku)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 SKU 查询主数据（多条时取最小 id）
    pub fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<MasterDataRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM masterdata WHERE sku = ?1 ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![sku], map_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部主数据（按 SKU 排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<MasterDataRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM masterdata ORDER BY sku, id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }
}

fn map_row(row: &Row) -> SqliteResult<MasterDataRecord> {
    Ok(MasterDataRecord {
        id: row.get(0)?,
        supplier_code: row.get(1)?,
        sku: row.get(2)?,
        description: row.get(3)?,
        quantity: row.get(4)?,
        weight: row.get(5)?,
        length: row.get(6)?,
        width: row.get(7)?,
        height: row.get(8)?,
        cbm: row.get(9)?,
        prefix: row.get(10)?,
        remark: row.get(11)?,
        loose_case: row.get(12)?,
        cartons_per_pallet: row.get(13)?,
        pallet_kind: row.get(14)?,
    })
}
