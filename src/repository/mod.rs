// ==========================================
// 家具订单报价系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod quotation_repo;
pub mod quotation_store;
pub mod rate_material_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use quotation_repo::QuotationRepository;
pub use quotation_store::QuotationStore;
pub use rate_material_repo::RateMaterialRepository;
