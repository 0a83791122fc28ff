// ==========================================
// 家具订单报价系统 - 报价单仓储
// ==========================================
// 职责: 管理 quotation 表（费率表与条目树以 JSON 文本存储）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::quotation::{Item, MaterialGroup, NewQuotation, Quotation, QuotationSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::quotation_store::QuotationStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 数据库原始行（JSON / 时间戳尚未解析）
struct QuotationRow {
    id: String,
    quotation_number: String,
    client_name: String,
    client_code: String,
    materials_json: String,
    items_json: String,
    created_at: String,
    updated_at: String,
}

impl QuotationRow {
    fn from_row(row: &rusqlite::Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            quotation_number: row.get(1)?,
            client_name: row.get(2)?,
            client_code: row.get(3)?,
            materials_json: row.get(4)?,
            items_json: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_quotation(self) -> RepositoryResult<Quotation> {
        let materials: Vec<MaterialGroup> = serde_json::from_str(&self.materials_json)
            .map_err(|e| RepositoryError::json("materials_json", e))?;
        let items: Vec<Item> = serde_json::from_str(&self.items_json)
            .map_err(|e| RepositoryError::json("items_json", e))?;

        Ok(Quotation {
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            quotation_number: self.quotation_number,
            client_name: self.client_name,
            client_code: self.client_code,
            materials,
            items,
        })
    }
}

fn parse_timestamp(field: &str, raw: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: e.to_string(),
        })
}

/// 单号序号部分（前缀之后的纯数字）
fn sequence_of(number: &str, prefix: &str) -> Option<u64> {
    number.strip_prefix(prefix)?.parse().ok()
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, quotation_number, client_name, client_code,
           materials_json, items_json, created_at, updated_at
    FROM quotation
"#;

// ==========================================
// QuotationRepository - 报价单仓储
// ==========================================
pub struct QuotationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuotationRepository {
    /// 创建新的 QuotationRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 ID 查询（不存在返回 None）
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Quotation>> {
        let conn = self.get_conn()?;
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = conn
            .query_row(&sql, params![id], QuotationRow::from_row)
            .optional()?;
        row.map(QuotationRow::into_quotation).transpose()
    }

    /// 按单号查询
    pub fn find_by_number(&self, quotation_number: &str) -> RepositoryResult<Option<Quotation>> {
        let conn = self.get_conn()?;
        let sql = format!("{SELECT_COLUMNS} WHERE quotation_number = ?1");
        let row = conn
            .query_row(&sql, params![quotation_number], QuotationRow::from_row)
            .optional()?;
        row.map(QuotationRow::into_quotation).transpose()
    }

    fn insert(&self, new: NewQuotation) -> RepositoryResult<Quotation> {
        let now = Utc::now();
        let quotation = Quotation {
            id: Uuid::new_v4().to_string(),
            quotation_number: new.quotation_number,
            client_name: new.client_name,
            client_code: new.client_code,
            materials: new.materials,
            items: new.items,
            created_at: now,
            updated_at: now,
        };

        let materials_json = serde_json::to_string(&quotation.materials)
            .map_err(|e| RepositoryError::json("materials_json", e))?;
        let items_json = serde_json::to_string(&quotation.items)
            .map_err(|e| RepositoryError::json("items_json", e))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO quotation (
                id, quotation_number, client_name, client_code,
                materials_json, items_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                quotation.id,
                quotation.quotation_number,
                quotation.client_name,
                quotation.client_code,
                materials_json,
                items_json,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        tracing::info!(
            id = %quotation.id,
            quotation_number = %quotation.quotation_number,
            "报价单已创建"
        );
        Ok(quotation)
    }

    fn update_items(&self, id: &str, items: &[Item]) -> RepositoryResult<()> {
        let items_json =
            serde_json::to_string(items).map_err(|e| RepositoryError::json("items_json", e))?;

        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE quotation SET items_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![items_json, Utc::now().to_rfc3339(), id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Quotation".to_string(),
                id: id.to_string(),
            });
        }
        tracing::debug!(id, items = items.len(), "条目树已保存");
        Ok(())
    }

    fn summaries(&self) -> RepositoryResult<Vec<QuotationSummary>> {
        let conn = self.get_conn()?;
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, quotation_number DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], QuotationRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| {
                let quotation = row.into_quotation()?;
                Ok(QuotationSummary {
                    item_count: quotation.items.len(),
                    total_amount: quotation.items.iter().map(|i| i.total_amount).sum(),
                    id: quotation.id,
                    quotation_number: quotation.quotation_number,
                    client_name: quotation.client_name,
                    client_code: quotation.client_code,
                    created_at: quotation.created_at,
                })
            })
            .collect()
    }

    fn max_sequence(&self, prefix: &str) -> RepositoryResult<u64> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT quotation_number FROM quotation WHERE substr(quotation_number, 1, length(?1)) = ?1",
        )?;
        let numbers = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(numbers
            .iter()
            .filter_map(|n| sequence_of(n, prefix))
            .max()
            .unwrap_or(0))
    }
}

#[async_trait]
impl QuotationStore for QuotationRepository {
    async fn fetch_quotation(&self, id: &str) -> RepositoryResult<Quotation> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Quotation".to_string(),
            id: id.to_string(),
        })
    }

    async fn replace_items(&self, id: &str, items: Vec<Item>) -> RepositoryResult<()> {
        self.update_items(id, &items)
    }

    async fn create_quotation(&self, new: NewQuotation) -> RepositoryResult<Quotation> {
        self.insert(new)
    }

    async fn list_quotations(&self) -> RepositoryResult<Vec<QuotationSummary>> {
        self.summaries()
    }

    async fn next_quotation_number(&self, prefix: &str, width: usize) -> RepositoryResult<String> {
        let next = self.max_sequence(prefix)? + 1;
        Ok(format!("{prefix}{next:0width$}"))
    }
}
