// ==========================================
// 家具订单报价系统 - 报价单费率表
// ==========================================
// 来源: 报价单 materials[].rows[]，载入时展平为 材料名 → 费率
// 红线: 未登记材料费率按 0 处理，不阻断核算
// ==========================================

use crate::domain::quotation::{MaterialGroup, RateRow};
use crate::domain::types::value_or_zero;
use std::collections::HashMap;

/// 费率表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCatalog {
    rates: HashMap<String, f64>,
}

impl RateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 展平费率分组；同名材料后出现者覆盖先出现者
    pub fn from_groups(groups: &[MaterialGroup]) -> Self {
        let mut catalog = Self::new();
        for row in groups.iter().flat_map(|g| g.rows.iter()) {
            catalog.insert_row(row);
        }
        tracing::debug!(materials = catalog.len(), "费率表已展平");
        catalog
    }

    fn insert_row(&mut self, row: &RateRow) {
        if row.material_name.is_empty() {
            return;
        }
        self.rates
            .insert(row.material_name.clone(), value_or_zero(row.rate));
    }

    pub fn insert(&mut self, material_name: impl Into<String>, rate: f64) {
        self.rates.insert(material_name.into(), rate);
    }

    /// 精确查找费率，未登记返回 0
    pub fn rate(&self, material_name: &str) -> f64 {
        self.rates.get(material_name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, material_name: &str) -> bool {
        self.rates.contains_key(material_name)
    }

    /// 材料名列表（已排序，供下拉选择）
    pub fn material_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rates.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateCatalog {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
