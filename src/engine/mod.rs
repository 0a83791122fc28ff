// ==========================================
// 家具订单报价系统 - 核算引擎层
// ==========================================
// 职责: 材料公式 → 单行成本 → 覆写 → 逐级汇总
// 红线: Engine 不拼 SQL；所有数值异常按 0 处理，不向上抛错
// ==========================================

pub mod aggregator;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod overrides;
pub mod rate_catalog;
pub mod session;
pub mod view;

// 重导出核心引擎
pub use aggregator::{Aggregator, ItemTotals, QuotationTotals};
pub use error::{CostingError, CostingResult};
pub use evaluator::{format_cost, CostEvaluator};
pub use formula::{FormulaId, FormulaRegistry};
pub use overrides::OverrideStore;
pub use rate_catalog::RateCatalog;
pub use session::CostingSession;
pub use view::{ItemView, OwnerView, QuotationView, SlotView, SubmissionPayload};
