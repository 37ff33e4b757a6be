use super::core::InventoryRepository;
use super::{pallet_matches, ASSIGNED_PREDICATE, AVAILABLE_PREDICATE, PALLET_KEY, SCAN_TIME_FORMAT};
use crate::domain::inventory::{normalize_pallet, InventoryRecord};
use crate::domain::pallet::{JobCounts, JobOverview, PalletCount};
use crate::repository::error::RepositoryResult;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    id, sscc, release_key, master_delivery, qty, master_ctl,
    master_st_company, master_add1, master_add2, master_add3, master_add4,
    ship_to, st_zip, barcode, sku, jobno, jobno_type,
    pallet, pallet_type, tag_label, jobscan, time_scan
"#;

impl InventoryRepository {
    // ==========================================
    // 单条查询
    // ==========================================

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM scanfile WHERE id = ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![id], |row| self.map_row(row)) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 可用性查询（分配前）
    // ==========================================

    /// 查询某 SKU 在作业中的未分配记录 id（按 id 升序，最多 limit 条）
    pub fn find_available_ids(
        &self,
        sku: &str,
        job_type: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT id FROM scanfile WHERE sku = ?1 AND jobno_type = ?2 AND {} ORDER BY id LIMIT ?3",
            AVAILABLE_PREDICATE
        );
        let mut stmt = conn.prepare(&sql)?;

        let ids = stmt
            .query_map(params![sku, job_type, limit as i64], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    /// 统计某 SKU 在作业中的未分配数量
    pub fn count_available(&self, sku: &str, job_type: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT COUNT(*) FROM scanfile WHERE sku = ?1 AND jobno_type = ?2 AND {}",
            AVAILABLE_PREDICATE
        );
        let count: i64 = conn.query_row(&sql, params![sku, job_type], |row| row.get(0))?;
        Ok(count)
    }

    /// 查询托盘上某 SKU 的已分配记录 id（最近扫码优先）
    ///
    /// # 参数
    /// - limit: None 表示全部
    pub fn find_assigned_ids(
        &self,
        job_type: &str,
        pallet: &str,
        sku: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT id FROM scanfile
            WHERE jobno_type = ?1 AND {} AND sku = ?3
            ORDER BY COALESCE(time_scan, '') DESC, id DESC
            LIMIT ?4
            "#,
            pallet_matches("?2")
        );
        let mut stmt = conn.prepare(&sql)?;

        // SQLite: LIMIT -1 表示不限制
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let ids = stmt
            .query_map(params![job_type, pallet, sku, limit], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    // ==========================================
    // 统计查询
    // ==========================================

    /// 统计托盘上的箱数
    pub fn count_on_pallet(&self, job_type: &str, pallet: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT COUNT(*) FROM scanfile WHERE jobno_type = ?1 AND {}",
            pallet_matches("?2")
        );
        let count: i64 = conn.query_row(&sql, params![job_type, pallet], |row| row.get(0))?;
        Ok(count)
    }

    /// 作业维度统计：总数 / 已分配 / 剩余
    pub fn job_counts(&self, job_type: &str) -> RepositoryResult<JobCounts> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT COUNT(*), SUM(CASE WHEN {} THEN 1 ELSE 0 END) FROM scanfile WHERE jobno_type = ?1",
            ASSIGNED_PREDICATE
        );
        let (total, assigned): (i64, Option<i64>) =
            conn.query_row(&sql, params![job_type], |row| Ok((row.get(0)?, row.get(1)?)))?;

        Ok(JobCounts::new(total, assigned.unwrap_or(0)))
    }

    /// 作业内各托盘箱数（按托盘号数值升序）
    pub fn pallet_counts(&self, job_type: &str) -> RepositoryResult<Vec<PalletCount>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} AS p, MAX(pallet_type), COUNT(*)
            FROM scanfile
            WHERE jobno_type = ?1 AND {}
            GROUP BY p
            ORDER BY CAST(p AS INTEGER), p
            "#,
            PALLET_KEY, ASSIGNED_PREDICATE
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![job_type], |row| {
                Ok(PalletCount {
                    pallet: row.get(0)?,
                    pallet_type: row.get(1)?,
                    units: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 作业列表（作业号 + 作业类型）
    pub fn list_jobs(&self) -> RepositoryResult<Vec<JobOverview>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT jobno, jobno_type, COUNT(*), SUM(CASE WHEN {} THEN 1 ELSE 0 END)
            FROM scanfile
            GROUP BY jobno, jobno_type
            ORDER BY jobno, jobno_type
            "#,
            ASSIGNED_PREDICATE
        );
        let mut stmt = conn.prepare(&sql)?;

        let jobs = stmt
            .query_map([], |row| {
                let total: i64 = row.get(2)?;
                let assigned: Option<i64> = row.get(3)?;
                Ok(JobOverview {
                    job_no: row.get(0)?,
                    job_type: row.get(1)?,
                    counts: JobCounts::new(total, assigned.unwrap_or(0)),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(jobs)
    }

    // ==========================================
    // 明细查询
    // ==========================================

    /// 扫码历史：已分配记录，最近扫码优先
    ///
    /// # 参数
    /// - pallet: Some 时只看该托盘
    pub fn list_history(
        &self,
        job_type: &str,
        pallet: Option<&str>,
        limit: usize,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM scanfile
            WHERE jobno_type = ?1 AND {}
              AND (?2 IS NULL OR {})
            ORDER BY COALESCE(time_scan, '') DESC, id DESC
            LIMIT ?3
            "#,
            SELECT_COLUMNS,
            ASSIGNED_PREDICATE,
            pallet_matches("?2")
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![job_type, pallet, limit as i64], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 托盘上的全部记录（按 SKU、id 排序）
    pub fn list_on_pallet(&self, job_type: &str, pallet: &str) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM scanfile WHERE jobno_type = ?1 AND {} ORDER BY sku, id",
            SELECT_COLUMNS,
            pallet_matches("?2")
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![job_type, pallet], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 将数据库行映射为 InventoryRecord（'' 托盘归一化为 None）
    fn map_row(&self, row: &Row) -> SqliteResult<InventoryRecord> {
        let time_scan: Option<String> = row.get(21)?;

        Ok(InventoryRecord {
            id: row.get(0)?,
            sscc: row.get(1)?,
            release_key: row.get(2)?,
            master_delivery: row.get(3)?,
            qty: row.get(4)?,
            master_ctl: row.get(5)?,
            ship_to_company: row.get(6)?,
            address_lines: [row.get(7)?, row.get(8)?, row.get(9)?, row.get(10)?],
            ship_to: row.get(11)?,
            zip: row.get(12)?,
            barcode: row.get(13)?,
            sku: row.get(14)?,
            job_no: row.get(15)?,
            job_type: row.get(16)?,
            pallet: normalize_pallet(row.get(17)?),
            pallet_type: normalize_pallet(row.get(18)?),
            tag_label: row.get(19)?,
            job_scan: row.get(20)?,
            scanned_at: time_scan.as_deref().and_then(parse_scan_time),
        })
    }
}

/// 解析扫码时间（兼容导入时只有日期的历史数据）
fn parse_scan_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, SCAN_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
