// ==========================================
// 家具订单报价系统 - 报价单 API
// ==========================================
// 职责: 报价单创建、载入核算会话、提交 / 保存条目树
// 红线: 提交失败不改动内存中的会话
// ==========================================

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::QuoteConfigReader;
use crate::domain::quotation::{MaterialGroup, NewQuotation, Quotation, QuotationSummary};
use crate::engine::{CostEvaluator, CostingSession, FormulaRegistry, RateCatalog, SubmissionPayload};
use crate::repository::QuotationStore;

// ==========================================
// QuotationApi - 报价单 API
// ==========================================
pub struct QuotationApi {
    store: Arc<dyn QuotationStore>,
    config: Arc<dyn QuoteConfigReader>,
}

impl QuotationApi {
    /// 创建新的QuotationApi实例
    ///
    /// # 参数
    /// - store: 报价文档存储
    /// - config: 报价配置读取（单号规则、公式别名）
    pub fn new(store: Arc<dyn QuotationStore>, config: Arc<dyn QuoteConfigReader>) -> Self {
        Self { store, config }
    }

    /// 按当前配置构造成本计算器（内置公式表 + 配置别名）
    async fn evaluator(&self) -> ApiResult<CostEvaluator> {
        let aliases = self
            .config
            .get_formula_aliases()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(CostEvaluator::new(Arc::new(FormulaRegistry::with_aliases(aliases))))
    }

    // ==========================================
    // 报价单
    // ==========================================

    /// 新建报价单
    ///
    /// # 参数
    /// - client_name: 客户名称（必填）
    /// - client_code: 客户编码
    /// - materials: 本报价单使用的费率表
    ///
    /// # 返回
    /// - Ok(Quotation): 已分配单号并持久化的报价单（条目为空）
    #[instrument(skip(self, materials), fields(groups = materials.len()))]
    pub async fn create_quotation(
        &self,
        client_name: &str,
        client_code: &str,
        materials: Vec<MaterialGroup>,
    ) -> ApiResult<Quotation> {
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return Err(ApiError::InvalidInput("客户名称不能为空".to_string()));
        }

        let prefix = self
            .config
            .get_quotation_number_prefix()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let width = self
            .config
            .get_quotation_number_width()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let quotation_number = self.store.next_quotation_number(&prefix, width).await?;

        let quotation = self
            .store
            .create_quotation(NewQuotation {
                quotation_number,
                client_name: client_name.to_string(),
                client_code: client_code.trim().to_string(),
                materials,
                items: Vec::new(),
            })
            .await?;

        info!(
            id = %quotation.id,
            quotation_number = %quotation.quotation_number,
            "新建报价单"
        );
        Ok(quotation)
    }

    pub async fn get_quotation(&self, id: &str) -> ApiResult<Quotation> {
        Ok(self.store.fetch_quotation(id).await?)
    }

    pub async fn list_quotations(&self) -> ApiResult<Vec<QuotationSummary>> {
        Ok(self.store.list_quotations().await?)
    }

    // ==========================================
    // 核算会话
    // ==========================================

    /// 载入报价单并打开核算会话
    ///
    /// 流程: 读取文档 → 构造费率表 → 补齐材料行 → 识别覆写 → 全量重算
    #[instrument(skip(self))]
    pub async fn open_session(&self, id: &str) -> ApiResult<CostingSession> {
        let quotation = self.store.fetch_quotation(id).await.map_err(|e| {
            warn!(id, error = %e, "载入报价单失败");
            ApiError::from(e)
        })?;

        let rates = RateCatalog::from_groups(&quotation.materials);
        let evaluator = self.evaluator().await?;
        let session = CostingSession::open(quotation.id, quotation.items, rates, evaluator);

        info!(
            id,
            items = session.items().len(),
            overrides = session.overrides().len(),
            total = %session.totals().formatted_total(),
            "核算会话已打开"
        );
        Ok(session)
    }

    /// 提交：过滤空材料行、写入条目合计后整体替换条目树
    ///
    /// # 返回
    /// - Ok(SubmissionPayload): 已持久化的载荷
    /// - Err: 存储失败（会话保持原样，可重试）
    #[instrument(skip(self, session))]
    pub async fn submit_session(&self, id: &str, session: &CostingSession) -> ApiResult<SubmissionPayload> {
        Self::ensure_same_quotation(id, session)?;

        let payload = session.submission_payload();
        self.store.replace_items(id, payload.items.clone()).await.map_err(|e| {
            warn!(id, error = %e, "提交条目失败");
            ApiError::from(e)
        })?;

        info!(id, items = payload.items.len(), total = %session.totals().formatted_total(), "条目已提交");
        Ok(payload)
    }

    /// 保存当前条目树（不过滤空行，覆写值写入材料行）
    #[instrument(skip(self, session))]
    pub async fn save_item_details(&self, id: &str, session: &CostingSession) -> ApiResult<()> {
        Self::ensure_same_quotation(id, session)?;

        self.store.replace_items(id, session.resolved_items()).await?;
        info!(id, items = session.items().len(), "条目明细已保存");
        Ok(())
    }

    fn ensure_same_quotation(id: &str, session: &CostingSession) -> ApiResult<()> {
        if session.quotation_id() != id {
            return Err(ApiError::InvalidInput(format!(
                "会话属于报价单 {}，不能写入 {}",
                session.quotation_id(),
                id
            )));
        }
        Ok(())
    }
}
