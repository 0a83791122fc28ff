// ==========================================
// 家具订单报价系统 - 报价单领域模型
// ==========================================
// 职责: 报价单 / 条目 / 部件 / 外购件 / 材料行
// 对齐: 外部存储中的报价文档（camelCase 字段）
// 红线: 每个部件、外购件至少保留一条材料行
// ==========================================

use crate::domain::types::{
    lenient_amount, lenient_number, lenient_text, value_or_zero, Geometry, SlotOwner,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialSlot - 材料行
// ==========================================
// value: 计算值（4 位小数文本）；人工覆写值由 OverrideStore 单独保存
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlot {
    #[serde(default)]
    pub material: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,
}

impl MaterialSlot {
    /// 空材料行（新建部件/外购件时使用）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(material: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            value: value.into(),
        }
    }

    /// 材料与数值均已填写（提交时只保留这类行）
    pub fn is_filled(&self) -> bool {
        !self.material.is_empty() && !self.value.is_empty()
    }
}

// ==========================================
// Component - 自制部件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub component_name: String,
    #[serde(default, with = "lenient_number")]
    pub length: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub breadth: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub depth: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub cutsize: Option<f64>,
    #[serde(default)]
    pub materials: Vec<MaterialSlot>,
}

impl Component {
    pub fn new(unit: impl Into<String>, component_name: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            component_name: component_name.into(),
            materials: vec![MaterialSlot::empty()],
            ..Default::default()
        }
    }

    /// 公式输入（空值按 0）
    pub fn geometry(&self) -> Geometry {
        Geometry::new(
            value_or_zero(self.quantity),
            value_or_zero(self.cutsize),
            value_or_zero(self.length),
            value_or_zero(self.breadth),
        )
    }
}

// ==========================================
// BoEntry - 外购件 (Bought-Out)
// ==========================================
// 无长/宽/深，公式中按 0 处理
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoEntry {
    #[serde(default)]
    pub materialname: String,
    #[serde(default, with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub cutsize: Option<f64>,
    #[serde(default)]
    pub materials: Vec<MaterialSlot>,
}

impl BoEntry {
    pub fn new(materialname: impl Into<String>) -> Self {
        Self {
            materialname: materialname.into(),
            materials: vec![MaterialSlot::empty()],
            ..Default::default()
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(
            value_or_zero(self.quantity),
            value_or_zero(self.cutsize),
            0.0,
            0.0,
        )
    }
}

// ==========================================
// Item - 报价条目（一件家具）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub item_select: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub bo: Vec<BoEntry>,
    /// 派生值，仅在提交时写入
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: f64,
}

impl Item {
    pub fn new(item_select: impl Into<String>) -> Self {
        Self {
            item_select: item_select.into(),
            ..Default::default()
        }
    }

    /// 按归属取材料行（归属下标越界返回 None）
    pub fn slots(&self, owner: &SlotOwner) -> Option<&Vec<MaterialSlot>> {
        match owner {
            SlotOwner::Component { component, .. } => {
                self.components.get(*component).map(|c| &c.materials)
            }
            SlotOwner::Bo { bo, .. } => self.bo.get(*bo).map(|b| &b.materials),
        }
    }

    pub fn slots_mut(&mut self, owner: &SlotOwner) -> Option<&mut Vec<MaterialSlot>> {
        match owner {
            SlotOwner::Component { component, .. } => {
                self.components.get_mut(*component).map(|c| &mut c.materials)
            }
            SlotOwner::Bo { bo, .. } => self.bo.get_mut(*bo).map(|b| &mut b.materials),
        }
    }

    pub fn geometry(&self, owner: &SlotOwner) -> Option<Geometry> {
        match owner {
            SlotOwner::Component { component, .. } => {
                self.components.get(*component).map(Component::geometry)
            }
            SlotOwner::Bo { bo, .. } => self.bo.get(*bo).map(BoEntry::geometry),
        }
    }

    /// 本条目下所有材料行归属（部件在前，外购件在后）
    pub fn owners(&self, item_index: usize) -> Vec<SlotOwner> {
        (0..self.components.len())
            .map(|c| SlotOwner::component(item_index, c))
            .chain((0..self.bo.len()).map(|b| SlotOwner::bo(item_index, b)))
            .collect()
    }

    /// 补齐空材料行，返回补齐的数量
    pub fn ensure_slots(&mut self) -> usize {
        let mut synthesized = 0;
        for component in &mut self.components {
            if component.materials.is_empty() {
                component.materials.push(MaterialSlot::empty());
                synthesized += 1;
            }
        }
        for bo in &mut self.bo {
            if bo.materials.is_empty() {
                bo.materials.push(MaterialSlot::empty());
                synthesized += 1;
            }
        }
        synthesized
    }
}

/// 载入时对条目树做补齐
pub fn reconcile_items(items: &mut [Item]) -> usize {
    let synthesized: usize = items.iter_mut().map(Item::ensure_slots).sum();
    if synthesized > 0 {
        tracing::debug!(synthesized, "补齐空材料行");
    }
    synthesized
}

// ==========================================
// 报价单费率表（创建报价单时录入）
// ==========================================

/// 费率行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRow {
    #[serde(default)]
    pub material_name: String,
    #[serde(default)]
    pub uom: String,
    #[serde(default, with = "lenient_number")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub size: String,
}

impl RateRow {
    pub fn new(material_name: impl Into<String>, rate: f64, uom: impl Into<String>) -> Self {
        Self {
            material_name: material_name.into(),
            uom: uom.into(),
            rate: Some(rate),
            size: String::new(),
        }
    }
}

/// 费率分组（按材料类别）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialGroup {
    #[serde(default)]
    pub material_type: String,
    #[serde(default)]
    pub rows: Vec<RateRow>,
}

// ==========================================
// Quotation - 报价单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: String,
    pub quotation_number: String,
    pub client_name: String,
    pub client_code: String,
    pub materials: Vec<MaterialGroup>,
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建报价单输入
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuotation {
    pub quotation_number: String,
    pub client_name: String,
    pub client_code: String,
    pub materials: Vec<MaterialGroup>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// 报价单列表摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSummary {
    pub id: String,
    pub quotation_number: String,
    pub client_name: String,
    pub client_code: String,
    pub item_count: usize,
    /// 已提交条目 totalAmount 之和
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}
