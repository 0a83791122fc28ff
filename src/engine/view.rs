// ==========================================
// 家具订单报价系统 - 报价展示模型
// ==========================================
// 用途: 供界面 / PDF 渲染的只读视图，金额均为 4 位小数文本
// ==========================================

use crate::domain::quotation::Item;
use crate::domain::types::SlotOwner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 材料行视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub material: String,
    /// 展示值（覆写优先）
    pub value: String,
    /// 计算值
    pub computed: String,
    pub overridden: bool,
}

/// 部件 / 外购件视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub owner: SlotOwner,
    pub label: String,
    pub slots: Vec<SlotView>,
    pub total: String,
}

/// 条目视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub item_select: String,
    pub components: Vec<OwnerView>,
    pub bo: Vec<OwnerView>,
    pub total: String,
}

/// 报价单视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationView {
    pub quotation_id: String,
    pub items: Vec<ItemView>,
    pub item_wise_totals: BTreeMap<String, String>,
    pub total: String,
}

/// 归属显示名：部件取名称（缺省取单元号），外购件取物料名
pub fn owner_label(item: &Item, owner: &SlotOwner) -> String {
    match owner {
        SlotOwner::Component { component, .. } => item
            .components
            .get(*component)
            .map(|c| {
                if c.component_name.is_empty() {
                    c.unit.clone()
                } else {
                    c.component_name.clone()
                }
            })
            .unwrap_or_default(),
        SlotOwner::Bo { bo, .. } => item
            .bo
            .get(*bo)
            .map(|b| b.materialname.clone())
            .unwrap_or_default(),
    }
}

/// 提交载荷：{ items: [...] }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub items: Vec<Item>,
}
