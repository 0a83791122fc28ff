// ==========================================
// 家具订单报价系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入、快照
// 存储: config_kv 表 (key-value + scope)，目前只使用 global scope
// ==========================================

use crate::config::quote_config_trait::QuoteConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::formula::FormulaId;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置层 Result 类型别名
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

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
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(key, value, "配置已写入");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取指定前缀下的全部配置（键已去掉前缀）
    fn get_configs_with_prefix(&self, prefix: &str) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv
             WHERE scope_id = 'global' AND substr(key, 1, length(?1)) = ?1
             ORDER BY key",
        )?;

        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            if let Some(name) = key.strip_prefix(prefix) {
                map.insert(name.to_string(), value);
            }
        }
        Ok(map)
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 迁移费率/别名配置到另一台机器
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 同名配置会被覆盖，快照外的配置保持不变
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in &config_map {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        tracing::info!(count, "已从快照恢复配置");
        Ok(count)
    }
}

// ==========================================
// QuoteConfigReader Trait 实现
// ==========================================
#[async_trait]
impl QuoteConfigReader for ConfigManager {
    async fn get_quotation_number_prefix(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::QUOTATION_NUMBER_PREFIX, "QTN-")
    }

    async fn get_quotation_number_width(&self) -> ConfigResult<usize> {
        let value = self.get_config_or_default(config_keys::QUOTATION_NUMBER_WIDTH, "4")?;
        Ok(value.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::QUOTATION_NUMBER_WIDTH,
                raw_value = %value,
                "单号宽度配置格式错误，使用默认值 4"
            );
            4
        }))
    }

    async fn get_formula_aliases(&self) -> ConfigResult<Vec<(String, FormulaId)>> {
        let raw = self.get_configs_with_prefix(config_keys::FORMULA_ALIAS_PREFIX)?;

        let mut aliases = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            match value.parse::<FormulaId>() {
                Ok(id) => aliases.push((name, id)),
                Err(_) => tracing::warn!(
                    material = %name,
                    raw_value = %value,
                    "未知公式 ID，忽略该别名"
                ),
            }
        }
        Ok(aliases)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 报价单号
    pub const QUOTATION_NUMBER_PREFIX: &str = "quotation_number_prefix";
    pub const QUOTATION_NUMBER_WIDTH: &str = "quotation_number_width";

    // 材料公式别名: formula_alias/<材料名> = <公式 ID>
    pub const FORMULA_ALIAS_PREFIX: &str = "formula_alias/";
}
