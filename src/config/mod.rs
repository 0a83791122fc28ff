// ==========================================
// 家具订单报价系统 - 配置层
// ==========================================
// 职责: 系统配置管理（报价单号规则、材料公式别名）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod quote_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ConfigResult};
pub use quote_config_trait::QuoteConfigReader;
