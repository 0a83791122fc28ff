// ==========================================
// 家具订单报价系统 - 费率库领域模型
// ==========================================
// 用途: 全局材料费率库（按材料类别维护），创建报价单时从中选取
// 对齐: rate_material 表
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 费率选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateOption {
    pub rate: f64,
    pub uom: String,
}

/// 费率库条目：一个材料类别及其下所有可选材料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateMaterial {
    pub material_type: String,
    /// 材料名 → 费率/单位
    pub options: BTreeMap<String, RateOption>,
}

impl RateMaterial {
    pub fn new(material_type: impl Into<String>) -> Self {
        Self {
            material_type: material_type.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, rate: f64, uom: impl Into<String>) -> Self {
        self.options.insert(
            name.into(),
            RateOption {
                rate,
                uom: uom.into(),
            },
        );
        self
    }

    /// 合并选项（同名覆盖）
    pub fn merge(&mut self, other: RateMaterial) {
        self.options.extend(other.options);
    }
}
