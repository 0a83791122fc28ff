// ==========================================
// 家具订单报价系统 - 报价单存储 Trait
// ==========================================
// 职责: 定义报价文档的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含成本计算，只做文档读写
// ==========================================

use crate::domain::quotation::{Item, NewQuotation, Quotation, QuotationSummary};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// QuotationStore Trait
// ==========================================
// 实现者: QuotationRepository（使用 rusqlite）
#[async_trait]
pub trait QuotationStore: Send + Sync {
    /// 按 ID 读取报价单
    ///
    /// # 返回
    /// - Ok(Quotation): 报价单（含费率表与条目树）
    /// - Err(NotFound): 不存在
    async fn fetch_quotation(&self, id: &str) -> RepositoryResult<Quotation>;

    /// 整体替换条目树（PUT 语义）
    ///
    /// # 参数
    /// - id: 报价单 ID
    /// - items: 新的条目树
    async fn replace_items(&self, id: &str, items: Vec<Item>) -> RepositoryResult<()>;

    /// 新建报价单，返回持久化后的完整文档
    async fn create_quotation(&self, new: NewQuotation) -> RepositoryResult<Quotation>;

    /// 报价单摘要列表（按创建时间倒序）
    async fn list_quotations(&self) -> RepositoryResult<Vec<QuotationSummary>>;

    /// 生成下一个报价单号
    ///
    /// # 参数
    /// - prefix: 单号前缀，如 "QTN-"
    /// - width: 序号补零宽度
    ///
    /// # 返回
    /// - 同前缀下最大序号 + 1，例如 "QTN-0007"
    async fn next_quotation_number(&self, prefix: &str, width: usize) -> RepositoryResult<String>;
}
