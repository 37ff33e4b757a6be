// ==========================================
// 仓库托盘分配跟踪系统 - 应用状态
// ==========================================
// 职责: 打开数据库、建表、装配各 Repository 与 API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, LogApi, PrintApi, ScanApi, UserApi};
use crate::config::ConfigManager;
use crate::engine::ScanRepositories;
use crate::repository::{
    ActionLogRepository, InventoryRepository, MasterDataRepository, UserRepository,
};

/// 默认数据库路径的环境变量
pub const DB_PATH_ENV: &str = "PALLET_TRACKER_DB_PATH";

/// 应用状态
///
/// 所有 API 共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub scan_api: Arc<ScanApi>,
    pub print_api: Arc<PrintApi>,
    pub user_api: Arc<UserApi>,
    pub log_api: Arc<LogApi>,
    pub config_api: Arc<ConfigApi>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建 AppState
    ///
    /// # 说明
    /// 1. 打开连接并应用统一 PRAGMA
    /// 2. 幂等建表，并把历史数据中的空字符串托盘归一化为 NULL
    /// 3. 装配 Repository / API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);

        crate::db::init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        match crate::db::normalize_unassigned_pallets(&conn) {
            Ok(0) => {}
            Ok(rows) => tracing::info!(rows, "已将空字符串托盘归一化为 NULL"),
            Err(e) => tracing::warn!("托盘归一化失败(将继续启动): {}", e),
        }
        if let Ok(Some(version)) = crate::db::read_schema_version(&conn) {
            tracing::debug!(schema_version = version, "数据库版本");
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository 层
        // ==========================================
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let master_data_repo = Arc::new(MasterDataRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        match config_manager.get_config_snapshot() {
            Ok(snapshot) => tracing::info!(config = %snapshot, "运行配置"),
            Err(e) => tracing::warn!("读取配置快照失败: {}", e),
        }

        // ==========================================
        // API 层
        // ==========================================
        let scan_api = Arc::new(ScanApi::new(
            ScanRepositories::new(inventory_repo.clone(), master_data_repo.clone()),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let print_api = Arc::new(PrintApi::new(inventory_repo, master_data_repo));
        let user_api = Arc::new(UserApi::new(
            user_repo,
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let log_api = Arc::new(LogApi::new(action_log_repo.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone(), action_log_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            scan_api,
            print_api,
            user_api,
            log_api,
            config_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 PALLET_TRACKER_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./pallet_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pallet-tracker");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("pallet_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}
