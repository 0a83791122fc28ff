// ==========================================
// 家具订单报价系统 - 导入层
// ==========================================
// 职责: 外部数据导入（费率库 CSV）
// ==========================================

pub mod error;
pub mod rate_library;

pub use error::{ImportError, ImportResult};
pub use rate_library::{RateLibraryImport, RateLibraryImporter};
