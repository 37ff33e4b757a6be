// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 基于临时数据库装配完整 AppState，并提供数据准备入口
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use pallet_tracker::api::user_api::hash_password;
use pallet_tracker::api::RequestContext;
use pallet_tracker::app::AppState;
use pallet_tracker::db::open_sqlite_connection;
use pallet_tracker::domain::inventory::InventoryRecord;
use pallet_tracker::domain::master_data::MasterDataRecord;
use pallet_tracker::domain::types::Role;
use pallet_tracker::repository::{
    ActionLogRepository, InventoryRepository, MasterDataRepository, UserRepository,
};

/// 测试统一使用的条码：v1 前缀 12345，v2 前缀 23456
pub const BARCODE: &str = "000000001234567";

/// 测试统一使用的作业
pub const JOB: &str = "J001-EXP";

/// 测试账号统一密码
pub const PASSWORD: &str = "secret123";

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// state 为被测对象；repo 使用独立连接，用于数据准备与结果核对
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // Repository层（用于测试数据准备）
    pub inventory_repo: Arc<InventoryRepository>,
    pub master_data_repo: Arc<MasterDataRepository>,
    pub user_repo: Arc<UserRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        pallet_tracker::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let state = AppState::new(db_path.clone())?;

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            db_path,
            state,
            inventory_repo: Arc::new(InventoryRepository::new(conn.clone())),
            master_data_repo: Arc::new(MasterDataRepository::new(conn.clone())),
            user_repo: Arc::new(UserRepository::new(conn.clone())),
            action_log_repo: Arc::new(ActionLogRepository::new(conn)),
            _temp_file: temp_file,
        })
    }

    /// 不落库的请求上下文（用户名按角色生成）
    pub fn ctx(&self, role: Role) -> RequestContext {
        RequestContext::new(format!("{}_user", role.as_str()), role)
    }

    pub fn seed_inventory(&self, records: &[InventoryRecord]) {
        self.inventory_repo
            .batch_insert(records)
            .expect("写入箱号失败");
    }

    pub fn seed_master(&self, records: &[MasterDataRecord]) {
        self.master_data_repo
            .batch_insert(records)
            .expect("写入主数据失败");
    }

    /// 创建用户（密码统一为 PASSWORD）
    pub fn create_user(&self, username: &str, role: Role) {
        let hash = hash_password(PASSWORD).expect("哈希失败");
        self.user_repo
            .insert(username, &hash, role, chrono::Local::now().naive_local())
            .expect("创建用户失败");
    }

    /// 创建用户并登录，返回会话号
    pub fn login_as(&self, username: &str, role: Role) -> String {
        self.create_user(username, role);
        self.state
            .user_api
            .login(username, PASSWORD)
            .expect("登录失败")
            .session
    }
}
