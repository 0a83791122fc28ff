// ==========================================
// 家具订单报价系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 家具报价单的材料成本核算
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 成本核算
pub mod engine;

// 导入层 - 费率库 CSV
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    BoEntry, Component, Item, MaterialGroup, MaterialSlot, Quotation, RateMaterial, SlotKey,
    SlotOwner,
};

// 引擎
pub use engine::{
    Aggregator, CostEvaluator, CostingError, CostingSession, FormulaId, FormulaRegistry,
    OverrideStore, RateCatalog,
};

// API
pub use api::{ApiError, QuotationApi, RateLibraryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "家具订单报价系统";
