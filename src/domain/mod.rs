// ==========================================
// 家具订单报价系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含成本计算逻辑
// ==========================================

pub mod quotation;
pub mod rate;
pub mod types;

// 重导出核心类型
pub use quotation::{
    reconcile_items, BoEntry, Component, Item, MaterialGroup, MaterialSlot, NewQuotation,
    Quotation, QuotationSummary, RateRow,
};
pub use rate::{RateMaterial, RateOption};
pub use types::{
    parse_number, value_or_zero, BoField, ComponentField, Geometry, SlotKey, SlotOwner,
};
