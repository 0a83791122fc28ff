// ==========================================
// 家具订单报价系统 - 报价配置读取 Trait
// ==========================================
// 职责: 定义报价流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::ConfigResult;
use crate::engine::formula::FormulaId;
use async_trait::async_trait;

// ==========================================
// QuoteConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait QuoteConfigReader: Send + Sync {
    /// 报价单号前缀
    ///
    /// # 默认值
    /// - "QTN-"
    async fn get_quotation_number_prefix(&self) -> ConfigResult<String>;

    /// 报价单号序号补零宽度
    ///
    /// # 默认值
    /// - 4（QTN-0001）
    async fn get_quotation_number_width(&self) -> ConfigResult<usize>;

    /// 额外的 材料名 → 公式 映射
    ///
    /// # 说明
    /// - 存储键: formula_alias/<材料名>，值为公式 ID（如 "board"）
    /// - 无法识别的公式 ID 跳过并告警
    /// - 只调整名称映射，公式系数不可配置
    async fn get_formula_aliases(&self) -> ConfigResult<Vec<(String, FormulaId)>>;
}
