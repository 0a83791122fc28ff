// ==========================================
// 家具订单报价系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{QuotationApi, RateLibraryApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{QuotationRepository, RateMaterialRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FURNITURE_QUOTE_DB";

/// 应用状态
///
/// 所有仓储与配置共用同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 报价单API
    pub quotation_api: Arc<QuotationApi>,

    /// 费率库API
    pub rate_library_api: Arc<RateLibraryApi>,

    /// 配置管理器（用于维护单号规则、公式别名）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository与配置
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::prepare_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let quotation_repo = Arc::new(QuotationRepository::from_connection(conn.clone()));
        let rate_material_repo = Arc::new(RateMaterialRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let quotation_api = Arc::new(QuotationApi::new(quotation_repo, config_manager.clone()));
        let rate_library_api = Arc::new(RateLibraryApi::new(rate_material_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            quotation_api,
            rate_library_api,
            config_manager,
        })
    }

    fn prepare_schema(conn: &Connection) -> Result<(), String> {
        match read_schema_version(conn).map_err(|e| format!("读取schema_version失败: {}", e))? {
            Some(v) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    db_version = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库版本高于当前程序，可能由更新版本创建"
                );
            }
            Some(_) => {}
            None => tracing::info!("新数据库，开始建表"),
        }
        init_schema(conn).map_err(|e| format!("建表失败: {}", e))
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 FURNITURE_QUOTE_DB，其次使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./furniture_quote.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("furniture-quote");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("quote.db");
        }
    }

    path.to_string_lossy().to_string()
}
