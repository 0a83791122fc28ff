// ==========================================
// 家具订单报价系统 - 人工覆写值存储
// ==========================================
// 职责: 记录人工录入的材料行数值，优先于计算值
// 规则:
// - 写入时不校验是否为数字（汇总时再按 0 处理）
// - 仅"更换材料"会清除覆写；几何参数变化不清除
// - 删除材料行/部件/条目时，后续下标的覆写随之前移
// ==========================================

use crate::domain::types::{SlotKey, SlotOwner};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideStore {
    values: BTreeMap<SlotKey, String>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: SlotKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// 清除覆写，返回被清除的值
    pub fn clear(&mut self, key: &SlotKey) -> Option<String> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.values.contains_key(key)
    }

    /// 覆写值优先，否则返回计算值
    pub fn resolve<'a>(&'a self, key: &SlotKey, computed: &'a str) -> &'a str {
        self.get(key).unwrap_or(computed)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &str)> {
        self.values.iter().map(|(k, v)| (k, v.as_str()))
    }

    // ==========================================
    // 结构变化后的重新编号
    // ==========================================

    /// 删除材料行：丢弃该行覆写，同一归属下后续行前移
    pub fn remove_slot(&mut self, removed: &SlotKey) {
        self.rekey(|key| {
            if key.owner != removed.owner {
                Some(key)
            } else if key.material == removed.material {
                None
            } else if key.material > removed.material {
                Some(key.owner.slot(key.material - 1))
            } else {
                Some(key)
            }
        });
    }

    /// 删除部件/外购件：丢弃其全部覆写，同一集合内后续归属前移
    pub fn remove_owner(&mut self, removed: &SlotOwner) {
        self.rekey(|key| {
            if !key.owner.same_collection(removed) {
                Some(key)
            } else if key.owner.index() == removed.index() {
                None
            } else if key.owner.index() > removed.index() {
                Some(key.owner.with_index(key.owner.index() - 1).slot(key.material))
            } else {
                Some(key)
            }
        });
    }

    /// 清除某归属下全部覆写（不重新编号）
    pub fn clear_owner(&mut self, owner: &SlotOwner) {
        self.values.retain(|key, _| key.owner != *owner);
    }

    /// 删除条目：丢弃其全部覆写，后续条目前移
    pub fn remove_item(&mut self, removed_item: usize) {
        self.rekey(|key| {
            let item = key.owner.item();
            if item == removed_item {
                None
            } else if item > removed_item {
                Some(key.owner.with_item(item - 1).slot(key.material))
            } else {
                Some(key)
            }
        });
    }

    fn rekey<F>(&mut self, f: F)
    where
        F: Fn(SlotKey) -> Option<SlotKey>,
    {
        let old = std::mem::take(&mut self.values);
        self.values = old
            .into_iter()
            .filter_map(|(key, value)| f(key).map(|k| (k, value)))
            .collect();
    }
}
