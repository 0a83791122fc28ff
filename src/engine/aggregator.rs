// ==========================================
// 家具订单报价系统 - 成本汇总
// ==========================================
// 职责: 材料行 → 部件/外购件 → 条目 → 报价单 逐级求和
// 规则: 一律使用覆写优先的取值；无法解析的值按 0 计
//       每次变更后全量重算，不做增量缓存
// ==========================================

use crate::domain::quotation::Item;
use crate::domain::types::{parse_number, SlotOwner};
use crate::engine::evaluator::format_cost;
use crate::engine::overrides::OverrideStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 材料行取值解析（空白/非法 → 0；带尾随字符的 "12abc" 整体视为非法）
pub fn parse_value(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// 条目汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTotals {
    pub item_select: String,
    /// 各部件合计（与 components 顺序一致）
    pub components: Vec<f64>,
    /// 各外购件合计（与 bo 顺序一致）
    pub bo: Vec<f64>,
    pub total: f64,
}

/// 报价单汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationTotals {
    pub items: Vec<ItemTotals>,
    pub total: f64,
}

impl QuotationTotals {
    pub fn formatted_total(&self) -> String {
        format_cost(self.total)
    }

    /// 按条目名称汇总（同名条目累加）
    pub fn item_wise(&self) -> BTreeMap<String, String> {
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for item in &self.items {
            *sums.entry(item.item_select.clone()).or_insert(0.0) += item.total;
        }
        sums.into_iter().map(|(k, v)| (k, format_cost(v))).collect()
    }

    /// 指定归属的合计
    pub fn owner_total(&self, owner: &SlotOwner) -> Option<f64> {
        let item = self.items.get(owner.item())?;
        match owner {
            SlotOwner::Component { component, .. } => item.components.get(*component).copied(),
            SlotOwner::Bo { bo, .. } => item.bo.get(*bo).copied(),
        }
    }
}

// ==========================================
// Aggregator - 汇总器
// ==========================================
pub struct Aggregator;

impl Aggregator {
    /// 全量汇总
    pub fn aggregate(items: &[Item], overrides: &OverrideStore) -> QuotationTotals {
        let mut totals = QuotationTotals::default();

        for (item_index, item) in items.iter().enumerate() {
            let mut item_totals = ItemTotals {
                item_select: item.item_select.clone(),
                ..Default::default()
            };

            for owner in item.owners(item_index) {
                let owner_total = Self::owner_sum(item, &owner, overrides);
                if owner.is_bo() {
                    item_totals.bo.push(owner_total);
                } else {
                    item_totals.components.push(owner_total);
                }
                item_totals.total += owner_total;
            }

            totals.total += item_totals.total;
            totals.items.push(item_totals);
        }

        totals
    }

    fn owner_sum(item: &Item, owner: &SlotOwner, overrides: &OverrideStore) -> f64 {
        item.slots(owner)
            .map(|slots| {
                slots
                    .iter()
                    .enumerate()
                    .map(|(m, slot)| parse_value(overrides.resolve(&owner.slot(m), &slot.value)))
                    .sum()
            })
            .unwrap_or(0.0)
    }
}
