// ==========================================
// 家具订单报价系统 - API 层
// ==========================================
// 职责: 对外业务接口,组合仓储、配置与核算引擎
// ==========================================

pub mod error;
pub mod quotation_api;
pub mod rate_library_api;

pub use error::{ApiError, ApiResult};
pub use quotation_api::QuotationApi;
pub use rate_library_api::{RateImportReport, RateLibraryApi};
