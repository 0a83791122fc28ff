// ==========================================
// 家具订单报价系统 - 费率库仓储
// ==========================================
// 职责: 管理 rate_material 表（材料类别 → 选项 JSON）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::rate::{RateMaterial, RateOption};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

fn decode(material_type: String, options_json: &str) -> RepositoryResult<RateMaterial> {
    let options: BTreeMap<String, RateOption> = serde_json::from_str(options_json)
        .map_err(|e| RepositoryError::json("options_json", e))?;
    Ok(RateMaterial {
        material_type,
        options,
    })
}

// ==========================================
// RateMaterialRepository - 费率库仓储
// ==========================================
pub struct RateMaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RateMaterialRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入材料类别；已存在时合并选项（同名覆盖）
    ///
    /// # 返回
    /// - 合并后的完整条目
    pub fn upsert(&self, material: RateMaterial) -> RepositoryResult<RateMaterial> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT options_json FROM rate_material WHERE material_type = ?1",
                params![material.material_type],
                |row| row.get(0),
            )
            .optional()?;

        let merged = match existing {
            Some(json) => {
                let mut current = decode(material.material_type.clone(), &json)?;
                current.merge(material);
                current
            }
            None => material,
        };

        let options_json = serde_json::to_string(&merged.options)
            .map_err(|e| RepositoryError::json("options_json", e))?;
        tx.execute(
            r#"
            INSERT INTO rate_material (material_type, options_json) VALUES (?1, ?2)
            ON CONFLICT(material_type) DO UPDATE SET options_json = excluded.options_json
            "#,
            params![merged.material_type, options_json],
        )?;
        tx.commit()?;

        tracing::debug!(
            material_type = %merged.material_type,
            options = merged.options.len(),
            "费率库条目已写入"
        );
        Ok(merged)
    }

    /// 查询全部材料类别（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<RateMaterial>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT material_type, options_json FROM rate_material ORDER BY material_type ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(material_type, json)| decode(material_type, &json))
            .collect()
    }

    pub fn find_by_type(&self, material_type: &str) -> RepositoryResult<Option<RateMaterial>> {
        let conn = self.get_conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT options_json FROM rate_material WHERE material_type = ?1",
                params![material_type],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| decode(material_type.to_string(), &j)).transpose()
    }
}
