// ==========================================
// 家具订单报价系统 - 核算会话
// ==========================================
// 职责: 持有一张报价单的条目树、费率表、覆写值与最新汇总
// 规则: 所有修改都经由命令方法；每个命令结束前同步全量重算
//       (计算值 → 覆写取值 → 汇总)，重算完成前不接受下一条命令
// ==========================================

use crate::domain::quotation::{reconcile_items, BoEntry, Component, Item, MaterialSlot};
use crate::domain::types::{parse_number, BoField, ComponentField, SlotKey, SlotOwner};
use crate::engine::aggregator::{parse_value, Aggregator, QuotationTotals};
use crate::engine::error::{CostingError, CostingResult};
use crate::engine::evaluator::{format_cost, CostEvaluator};
use crate::engine::overrides::OverrideStore;
use crate::engine::rate_catalog::RateCatalog;
use crate::engine::view::{owner_label, ItemView, OwnerView, QuotationView, SlotView, SubmissionPayload};
use tracing::instrument;

/// 载入的持久化值与计算值是否一致（按 4 位小数比较）
fn persisted_matches(persisted: &str, computed: &str) -> bool {
    persisted == computed || parse_number(persisted).map(format_cost).as_deref() == Some(computed)
}

fn slot_mut<'a>(items: &'a mut [Item], key: &SlotKey) -> CostingResult<&'a mut MaterialSlot> {
    let item_index = key.owner.item();
    let item = items
        .get_mut(item_index)
        .ok_or(CostingError::ItemNotFound(item_index))?;
    let slots = item
        .slots_mut(&key.owner)
        .ok_or(CostingError::OwnerNotFound(key.owner))?;
    slots
        .get_mut(key.material)
        .ok_or(CostingError::SlotNotFound(*key))
}

// ==========================================
// CostingSession - 核算会话
// ==========================================
#[derive(Debug, Clone)]
pub struct CostingSession {
    quotation_id: String,
    items: Vec<Item>,
    rates: RateCatalog,
    evaluator: CostEvaluator,
    overrides: OverrideStore,
    totals: QuotationTotals,
}

impl CostingSession {
    /// 打开会话
    ///
    /// 载入流程:
    /// 1. 补齐空材料行
    /// 2. 逐行重新计算；持久化值与计算值不一致的，视为人工覆写
    /// 3. 全量汇总
    #[instrument(skip(items, rates, evaluator), fields(items = items.len(), rates = rates.len()))]
    pub fn open(
        quotation_id: impl Into<String> + std::fmt::Debug,
        mut items: Vec<Item>,
        rates: RateCatalog,
        evaluator: CostEvaluator,
    ) -> Self {
        reconcile_items(&mut items);

        let mut overrides = OverrideStore::new();
        for (item_index, item) in items.iter_mut().enumerate() {
            for owner in item.owners(item_index) {
                let geometry = item.geometry(&owner).unwrap_or_default();
                let Some(slots) = item.slots_mut(&owner) else {
                    continue;
                };
                for (m, slot) in slots.iter_mut().enumerate() {
                    let computed = evaluator.slot_value(&slot.material, &geometry, &rates);
                    if !slot.value.is_empty() && !persisted_matches(&slot.value, &computed) {
                        overrides.set(owner.slot(m), slot.value.clone());
                    }
                    slot.value = computed;
                }
            }
        }

        if !overrides.is_empty() {
            tracing::info!(count = overrides.len(), "载入时识别到人工覆写值");
        }

        let mut session = Self {
            quotation_id: quotation_id.into(),
            items,
            rates,
            evaluator,
            overrides,
            totals: QuotationTotals::default(),
        };
        session.recompute();
        session
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn quotation_id(&self) -> &str {
        &self.quotation_id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn rates(&self) -> &RateCatalog {
        &self.rates
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn totals(&self) -> &QuotationTotals {
        &self.totals
    }

    /// 材料行展示值（覆写优先）
    pub fn resolved_value(&self, key: &SlotKey) -> CostingResult<&str> {
        let slot = self
            .items
            .get(key.owner.item())
            .ok_or(CostingError::ItemNotFound(key.owner.item()))?
            .slots(&key.owner)
            .ok_or(CostingError::OwnerNotFound(key.owner))?
            .get(key.material)
            .ok_or(CostingError::SlotNotFound(*key))?;
        Ok(self.overrides.resolve(key, &slot.value))
    }

    // ==========================================
    // 材料行命令
    // ==========================================

    /// 选择材料：重新计算该行并清除其覆写
    #[instrument(skip(self), fields(slot = %key))]
    pub fn select_material(&mut self, key: SlotKey, material: &str) -> CostingResult<()> {
        let geometry = self
            .items
            .get(key.owner.item())
            .ok_or(CostingError::ItemNotFound(key.owner.item()))?
            .geometry(&key.owner)
            .ok_or(CostingError::OwnerNotFound(key.owner))?;

        let slot = slot_mut(&mut self.items, &key)?;
        slot.material = material.to_string();
        slot.value = self.evaluator.slot_value(material, &geometry, &self.rates);

        if self.overrides.clear(&key).is_some() {
            tracing::debug!(slot = %key, "更换材料，清除人工覆写");
        }
        self.recompute();
        Ok(())
    }

    /// 人工录入数值（不校验是否为数字）
    #[instrument(skip(self), fields(slot = %key))]
    pub fn set_override(&mut self, key: SlotKey, raw: &str) -> CostingResult<()> {
        slot_mut(&mut self.items, &key)?;
        self.overrides.set(key, raw);
        self.recompute();
        Ok(())
    }

    #[instrument(skip(self), fields(slot = %key))]
    pub fn clear_override(&mut self, key: SlotKey) -> CostingResult<()> {
        slot_mut(&mut self.items, &key)?;
        self.overrides.clear(&key);
        self.recompute();
        Ok(())
    }

    /// 新增空材料行
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn add_slot(&mut self, owner: SlotOwner) -> CostingResult<SlotKey> {
        let slots = self.slots_mut(&owner)?;
        slots.push(MaterialSlot::empty());
        let key = owner.slot(slots.len() - 1);
        self.recompute();
        Ok(key)
    }

    /// 删除材料行，返回该行删除前的展示值（数值）
    ///
    /// 每个部件/外购件至少保留一条材料行。
    #[instrument(skip(self), fields(slot = %key))]
    pub fn remove_slot(&mut self, key: SlotKey) -> CostingResult<f64> {
        let removed_value = parse_value(self.resolved_value(&key)?);

        let slots = self.slots_mut(&key.owner)?;
        if slots.len() <= 1 {
            return Err(CostingError::LastSlot(key.owner));
        }
        slots.remove(key.material);

        self.overrides.remove_slot(&key);
        self.recompute();
        Ok(removed_value)
    }

    /// 清空归属下全部材料行，只留一条空行
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn reset_owner_materials(&mut self, owner: SlotOwner) -> CostingResult<()> {
        let slots = self.slots_mut(&owner)?;
        *slots = vec![MaterialSlot::empty()];
        self.overrides.clear_owner(&owner);
        self.recompute();
        Ok(())
    }

    // ==========================================
    // 部件 / 外购件字段命令
    // ==========================================

    /// 编辑部件字段；几何字段变化时重算该部件全部材料行，覆写保留
    #[instrument(skip(self, raw))]
    pub fn edit_component_field(
        &mut self,
        item: usize,
        component: usize,
        field: ComponentField,
        raw: &str,
    ) -> CostingResult<()> {
        let owner = SlotOwner::component(item, component);
        let target = self
            .items
            .get_mut(item)
            .ok_or(CostingError::ItemNotFound(item))?
            .components
            .get_mut(component)
            .ok_or(CostingError::OwnerNotFound(owner))?;

        match field {
            ComponentField::Unit => target.unit = raw.to_string(),
            ComponentField::ComponentName => target.component_name = raw.to_string(),
            ComponentField::Length => target.length = parse_number(raw),
            ComponentField::Breadth => target.breadth = parse_number(raw),
            ComponentField::Depth => target.depth = parse_number(raw),
            ComponentField::Quantity => target.quantity = parse_number(raw),
            ComponentField::Cutsize => target.cutsize = parse_number(raw),
        }

        if field.is_geometry() {
            self.refresh_owner(&owner)?;
        }
        self.recompute();
        Ok(())
    }

    /// 编辑外购件字段
    #[instrument(skip(self, raw))]
    pub fn edit_bo_field(&mut self, item: usize, bo: usize, field: BoField, raw: &str) -> CostingResult<()> {
        let owner = SlotOwner::bo(item, bo);
        let target = self
            .items
            .get_mut(item)
            .ok_or(CostingError::ItemNotFound(item))?
            .bo
            .get_mut(bo)
            .ok_or(CostingError::OwnerNotFound(owner))?;

        match field {
            BoField::MaterialName => target.materialname = raw.to_string(),
            BoField::Quantity => target.quantity = parse_number(raw),
            BoField::Cutsize => target.cutsize = parse_number(raw),
        }

        if field.is_geometry() {
            self.refresh_owner(&owner)?;
        }
        self.recompute();
        Ok(())
    }

    // ==========================================
    // 结构命令
    // ==========================================

    /// 新增条目，返回下标
    #[instrument(skip(self))]
    pub fn add_item(&mut self, item_select: &str) -> usize {
        self.items.push(Item::new(item_select));
        self.recompute();
        self.items.len() - 1
    }

    #[instrument(skip(self))]
    pub fn rename_item(&mut self, item: usize, item_select: &str) -> CostingResult<()> {
        self.items
            .get_mut(item)
            .ok_or(CostingError::ItemNotFound(item))?
            .item_select = item_select.to_string();
        self.recompute();
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn remove_item(&mut self, item: usize) -> CostingResult<Item> {
        if item >= self.items.len() {
            return Err(CostingError::ItemNotFound(item));
        }
        let removed = self.items.remove(item);
        self.overrides.remove_item(item);
        self.recompute();
        Ok(removed)
    }

    /// 新增部件（无材料行时补一条空行），返回其归属
    #[instrument(skip(self, component), fields(name = %component.component_name))]
    pub fn add_component(&mut self, item: usize, mut component: Component) -> CostingResult<SlotOwner> {
        if component.materials.is_empty() {
            component.materials.push(MaterialSlot::empty());
        }
        let target = self.items.get_mut(item).ok_or(CostingError::ItemNotFound(item))?;
        target.components.push(component);
        let owner = SlotOwner::component(item, target.components.len() - 1);

        self.refresh_owner(&owner)?;
        self.recompute();
        Ok(owner)
    }

    /// 新增外购件，返回其归属
    #[instrument(skip(self, bo), fields(name = %bo.materialname))]
    pub fn add_bo(&mut self, item: usize, mut bo: BoEntry) -> CostingResult<SlotOwner> {
        if bo.materials.is_empty() {
            bo.materials.push(MaterialSlot::empty());
        }
        let target = self.items.get_mut(item).ok_or(CostingError::ItemNotFound(item))?;
        target.bo.push(bo);
        let owner = SlotOwner::bo(item, target.bo.len() - 1);

        self.refresh_owner(&owner)?;
        self.recompute();
        Ok(owner)
    }

    /// 删除部件或外购件
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn remove_owner(&mut self, owner: SlotOwner) -> CostingResult<()> {
        let item = self
            .items
            .get_mut(owner.item())
            .ok_or(CostingError::ItemNotFound(owner.item()))?;

        match owner {
            SlotOwner::Component { component, .. } if component < item.components.len() => {
                item.components.remove(component);
            }
            SlotOwner::Bo { bo, .. } if bo < item.bo.len() => {
                item.bo.remove(bo);
            }
            _ => return Err(CostingError::OwnerNotFound(owner)),
        }

        self.overrides.remove_owner(&owner);
        self.recompute();
        Ok(())
    }

    pub fn remove_component(&mut self, item: usize, component: usize) -> CostingResult<()> {
        self.remove_owner(SlotOwner::component(item, component))
    }

    pub fn remove_bo(&mut self, item: usize, bo: usize) -> CostingResult<()> {
        self.remove_owner(SlotOwner::bo(item, bo))
    }

    /// 替换费率表并重算全部材料行（覆写保留）
    #[instrument(skip(self, rates), fields(rates = rates.len()))]
    pub fn update_rates(&mut self, rates: RateCatalog) {
        self.rates = rates;
        self.refresh_all();
        self.recompute();
    }

    // ==========================================
    // 输出
    // ==========================================

    /// 展示视图
    pub fn view(&self) -> QuotationView {
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(item_index, item)| {
                let mut components = Vec::new();
                let mut bo = Vec::new();
                for owner in item.owners(item_index) {
                    let view = self.owner_view(item, &owner);
                    if owner.is_bo() {
                        bo.push(view);
                    } else {
                        components.push(view);
                    }
                }
                let total = self
                    .totals
                    .items
                    .get(item_index)
                    .map(|t| t.total)
                    .unwrap_or(0.0);
                ItemView {
                    item_select: item.item_select.clone(),
                    components,
                    bo,
                    total: format_cost(total),
                }
            })
            .collect();

        QuotationView {
            quotation_id: self.quotation_id.clone(),
            items,
            item_wise_totals: self.totals.item_wise(),
            total: self.totals.formatted_total(),
        }
    }

    fn owner_view(&self, item: &Item, owner: &SlotOwner) -> OwnerView {
        let slots = item
            .slots(owner)
            .map(|slots| {
                slots
                    .iter()
                    .enumerate()
                    .map(|(m, slot)| {
                        let key = owner.slot(m);
                        SlotView {
                            material: slot.material.clone(),
                            value: self.overrides.resolve(&key, &slot.value).to_string(),
                            computed: slot.value.clone(),
                            overridden: self.overrides.contains(&key),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        OwnerView {
            owner: *owner,
            label: owner_label(item, owner),
            slots,
            total: format_cost(self.totals.owner_total(owner).unwrap_or(0.0)),
        }
    }

    /// 当前条目树（材料行写入展示值，不过滤空行）
    pub fn resolved_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .enumerate()
            .map(|(item_index, item)| {
                let mut resolved = item.clone();
                for owner in item.owners(item_index) {
                    if let Some(slots) = resolved.slots_mut(&owner) {
                        for (m, slot) in slots.iter_mut().enumerate() {
                            if let Some(value) = self.overrides.get(&owner.slot(m)) {
                                slot.value = value.to_string();
                            }
                        }
                    }
                }
                resolved
            })
            .collect()
    }

    /// 提交载荷：写入条目合计，过滤未填写完整的材料行
    pub fn submission_payload(&self) -> SubmissionPayload {
        let mut items = self.resolved_items();
        for (item_index, item) in items.iter_mut().enumerate() {
            item.total_amount = self
                .totals
                .items
                .get(item_index)
                .map(|t| t.total)
                .unwrap_or(0.0);
            for component in &mut item.components {
                component.materials.retain(MaterialSlot::is_filled);
            }
            for bo in &mut item.bo {
                bo.materials.retain(MaterialSlot::is_filled);
            }
        }
        SubmissionPayload { items }
    }

    // ==========================================
    // 内部
    // ==========================================

    fn slots_mut(&mut self, owner: &SlotOwner) -> CostingResult<&mut Vec<MaterialSlot>> {
        self.items
            .get_mut(owner.item())
            .ok_or(CostingError::ItemNotFound(owner.item()))?
            .slots_mut(owner)
            .ok_or(CostingError::OwnerNotFound(*owner))
    }

    /// 重新计算归属下全部材料行的计算值
    fn refresh_owner(&mut self, owner: &SlotOwner) -> CostingResult<()> {
        let item = self
            .items
            .get_mut(owner.item())
            .ok_or(CostingError::ItemNotFound(owner.item()))?;
        let geometry = item
            .geometry(owner)
            .ok_or(CostingError::OwnerNotFound(*owner))?;
        let slots = item
            .slots_mut(owner)
            .ok_or(CostingError::OwnerNotFound(*owner))?;

        for slot in slots.iter_mut() {
            slot.value = self.evaluator.slot_value(&slot.material, &geometry, &self.rates);
        }
        Ok(())
    }

    /// 重新计算全部材料行的计算值
    fn refresh_all(&mut self) {
        let evaluator = &self.evaluator;
        let rates = &self.rates;
        for item in &mut self.items {
            let components = item
                .components
                .iter_mut()
                .map(|c| (c.geometry(), &mut c.materials));
            let bo = item.bo.iter_mut().map(|b| (b.geometry(), &mut b.materials));
            for (geometry, slots) in components.chain(bo) {
                for slot in slots.iter_mut() {
                    slot.value = evaluator.slot_value(&slot.material, &geometry, rates);
                }
            }
        }
    }

    /// 全量汇总，并回写条目合计
    fn recompute(&mut self) {
        self.totals = Aggregator::aggregate(&self.items, &self.overrides);
        for (item, totals) in self.items.iter_mut().zip(&self.totals.items) {
            item.total_amount = totals.total;
        }
        tracing::debug!(
            quotation_id = %self.quotation_id,
            items = self.items.len(),
            overrides = self.overrides.len(),
            total = %self.totals.formatted_total(),
            "全量重算完成"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::value_or_zero;

    fn rates() -> RateCatalog {
        vec![("OSL - 18mm", 100.0), ("BO", 10.0), ("Foil", 2.0), ("Hardware", 1.0)]
            .into_iter()
            .collect()
    }

    fn panel(quantity: f64, cutsize: f64) -> Component {
        let mut c = Component::new("U1", "Top Panel");
        c.quantity = Some(quantity);
        c.cutsize = Some(cutsize);
        c
    }

    fn hinge(quantity: f64, cutsize: f64) -> BoEntry {
        let mut b = BoEntry::new("Hinge");
        b.quantity = Some(quantity);
        b.cutsize = Some(cutsize);
        b
    }

    fn session_with_one_item() -> CostingSession {
        let mut item = Item::new("Wardrobe");
        item.components.push(panel(2.0, 3.0));
        item.bo.push(hinge(4.0, 5.0));
        CostingSession::open("Q1", vec![item], rates(), CostEvaluator::default())
    }

    #[test]
    fn test_select_material_computes_and_aggregates() {
        let mut session = session_with_one_item();
        assert_eq!(session.totals().total, 0.0);

        session.select_material(SlotKey::component(0, 0, 0), "OSL - 18mm").unwrap();
        session.select_material(SlotKey::bo(0, 0, 0), "BO").unwrap();

        assert_eq!(session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(), "1004.2500");
        assert_eq!(session.resolved_value(&SlotKey::bo(0, 0, 0)).unwrap(), "230.0000");
        assert_eq!(session.totals().formatted_total(), "1234.2500");
        assert_eq!(format_cost(session.items()[0].total_amount), "1234.2500");
    }

    #[test]
    fn test_override_survives_geometry_edit_but_not_material_change() {
        let mut session = session_with_one_item();
        let key = SlotKey::component(0, 0, 0);
        session.select_material(key, "OSL - 18mm").unwrap();
        session.set_override(key, "500").unwrap();
        assert_eq!(session.totals().total, 500.0);

        session
            .edit_component_field(0, 0, ComponentField::Quantity, "4")
            .unwrap();
        assert_eq!(session.resolved_value(&key).unwrap(), "500");
        // 计算值已随几何参数更新
        assert_eq!(session.items()[0].components[0].materials[0].value, "2008.5000");

        session.select_material(key, "Foil").unwrap();
        assert!(!session.overrides().contains(&key));
        assert_ne!(session.resolved_value(&key).unwrap(), "500");
    }

    #[test]
    fn test_remove_slot_decreases_total_by_prior_value() {
        let mut session = session_with_one_item();
        let owner = SlotOwner::component(0, 0);
        session.select_material(owner.slot(0), "OSL - 18mm").unwrap();
        let second = session.add_slot(owner).unwrap();
        session.select_material(second, "Hardware").unwrap();
        session.set_override(second, "12.5").unwrap();

        let before = session.totals().total;
        let removed = session.remove_slot(second).unwrap();

        assert_eq!(removed, 12.5);
        assert!((before - session.totals().total - 12.5).abs() < 1e-9);
        assert!(session.overrides().is_empty());
    }

    #[test]
    fn test_cannot_remove_last_slot() {
        let mut session = session_with_one_item();
        let err = session.remove_slot(SlotKey::bo(0, 0, 0)).unwrap_err();
        assert_eq!(err, CostingError::LastSlot(SlotOwner::bo(0, 0)));
        assert_eq!(session.items()[0].bo[0].materials.len(), 1);
    }

    #[test]
    fn test_remove_slot_keeps_override_with_its_slot() {
        let mut session = session_with_one_item();
        let owner = SlotOwner::component(0, 0);
        session.add_slot(owner).unwrap();
        session.add_slot(owner).unwrap();
        session.set_override(owner.slot(2), "42").unwrap();

        session.remove_slot(owner.slot(0)).unwrap();

        assert_eq!(session.resolved_value(&owner.slot(1)).unwrap(), "42");
        assert_eq!(session.totals().total, 42.0);
    }

    #[test]
    fn test_invalid_geometry_is_zero_not_error() {
        let mut session = session_with_one_item();
        session.select_material(SlotKey::component(0, 0, 0), "OSL - 18mm").unwrap();
        session
            .edit_component_field(0, 0, ComponentField::Cutsize, "abc")
            .unwrap();
        assert_eq!(session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(), "0.0000");
        assert_eq!(value_or_zero(session.items()[0].components[0].cutsize), 0.0);
    }

    #[test]
    fn test_unknown_indices_are_errors() {
        let mut session = session_with_one_item();
        assert_eq!(
            session.select_material(SlotKey::component(5, 0, 0), "BO"),
            Err(CostingError::ItemNotFound(5))
        );
        assert_eq!(
            session.set_override(SlotKey::component(0, 3, 0), "1"),
            Err(CostingError::OwnerNotFound(SlotOwner::component(0, 3)))
        );
        assert_eq!(
            session.clear_override(SlotKey::bo(0, 0, 9)),
            Err(CostingError::SlotNotFound(SlotKey::bo(0, 0, 9)))
        );
    }

    #[test]
    fn test_open_seeds_overrides_from_persisted_values() {
        let mut item = Item::new("Wardrobe");
        let mut c = panel(2.0, 3.0);
        c.materials = vec![
            MaterialSlot::new("OSL - 18mm", "1004.25"),
            MaterialSlot::new("OSL - 18mm", "900"),
        ];
        item.components.push(c);

        let session = CostingSession::open("Q1", vec![item], rates(), CostEvaluator::default());

        assert!(!session.overrides().contains(&SlotKey::component(0, 0, 0)));
        assert_eq!(session.overrides().get(&SlotKey::component(0, 0, 1)), Some("900"));
        assert_eq!(session.totals().formatted_total(), "1904.2500");
    }

    #[test]
    fn test_submission_payload_filters_empty_slots() {
        let mut session = session_with_one_item();
        session.select_material(SlotKey::component(0, 0, 0), "OSL - 18mm").unwrap();
        session.add_slot(SlotOwner::component(0, 0)).unwrap();

        let payload = session.submission_payload();
        let item = &payload.items[0];

        assert_eq!(item.components[0].materials.len(), 1);
        assert!(item.bo[0].materials.is_empty());
        assert_eq!(format_cost(item.total_amount), "1004.2500");
    }

    #[test]
    fn test_submission_payload_writes_override_values() {
        let mut session = session_with_one_item();
        let key = SlotKey::bo(0, 0, 0);
        session.select_material(key, "BO").unwrap();
        session.set_override(key, "99.5").unwrap();

        let payload = session.submission_payload();
        assert_eq!(payload.items[0].bo[0].materials[0].value, "99.5");
        assert_eq!(payload.items[0].total_amount, 99.5);
    }

    #[test]
    fn test_structural_commands_rekey_overrides() {
        let mut session = session_with_one_item();
        let second_item = session.add_item("Desk");
        session.add_component(second_item, panel(1.0, 1.0)).unwrap();
        session.set_override(SlotKey::component(1, 0, 0), "10").unwrap();

        session.remove_item(0).unwrap();

        assert_eq!(session.items().len(), 1);
        assert_eq!(session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(), "10");
        assert_eq!(session.totals().total, 10.0);

        session.remove_component(0, 0).unwrap();
        assert!(session.overrides().is_empty());
        assert_eq!(session.totals().total, 0.0);
        assert_eq!(
            session.remove_owner(SlotOwner::component(0, 0)),
            Err(CostingError::OwnerNotFound(SlotOwner::component(0, 0)))
        );
    }

    #[test]
    fn test_reset_owner_materials() {
        let mut session = session_with_one_item();
        let owner = SlotOwner::component(0, 0);
        session.select_material(owner.slot(0), "OSL - 18mm").unwrap();
        session.add_slot(owner).unwrap();
        session.set_override(owner.slot(1), "3").unwrap();

        session.reset_owner_materials(owner).unwrap();

        assert_eq!(session.items()[0].components[0].materials, vec![MaterialSlot::empty()]);
        assert!(session.overrides().is_empty());
        assert_eq!(session.totals().total, 0.0);
    }

    #[test]
    fn test_update_rates_recomputes_values() {
        let mut session = session_with_one_item();
        session.select_material(SlotKey::bo(0, 0, 0), "BO").unwrap();

        session.update_rates(vec![("BO", 20.0)].into_iter().collect());

        assert_eq!(session.resolved_value(&SlotKey::bo(0, 0, 0)).unwrap(), "460.0000");
    }

    #[test]
    fn test_update_rates_refreshes_every_item_and_keeps_overrides() {
        let mut first = Item::new("Wardrobe");
        first.components.push(panel(2.0, 3.0));
        let mut second = Item::new("Desk");
        second.components.push(panel(1.0, 1.0));
        second.bo.push(hinge(4.0, 5.0));
        let mut session = CostingSession::open("Q1", vec![first, second], rates(), CostEvaluator::default());
        session.select_material(SlotKey::component(0, 0, 0), "OSL - 18mm").unwrap();
        session.select_material(SlotKey::component(1, 0, 0), "OSL - 18mm").unwrap();
        session.select_material(SlotKey::bo(1, 0, 0), "BO").unwrap();
        session.set_override(SlotKey::component(1, 0, 0), "99").unwrap();

        session.update_rates(vec![("OSL - 18mm", 200.0), ("BO", 20.0)].into_iter().collect());

        assert_eq!(session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(), "2008.5000");
        assert_eq!(session.items()[1].components[0].materials[0].value, "334.7500");
        assert_eq!(session.resolved_value(&SlotKey::component(1, 0, 0)).unwrap(), "99");
        assert_eq!(session.resolved_value(&SlotKey::bo(1, 0, 0)).unwrap(), "460.0000");
        assert_eq!(session.totals().formatted_total(), "2567.5000");
    }

    #[test]
    fn test_view_reports_overrides_and_labels() {
        let mut session = session_with_one_item();
        session.select_material(SlotKey::bo(0, 0, 0), "BO").unwrap();
        session.set_override(SlotKey::bo(0, 0, 0), "7").unwrap();

        let view = session.view();
        let bo = &view.items[0].bo[0];

        assert_eq!(bo.label, "Hinge");
        assert_eq!(bo.slots[0].value, "7");
        assert_eq!(bo.slots[0].computed, "230.0000");
        assert!(bo.slots[0].overridden);
        assert_eq!(bo.total, "7.0000");
        assert_eq!(view.items[0].components[0].label, "Top Panel");
        assert_eq!(view.item_wise_totals["Wardrobe"], "7.0000");
        assert_eq!(view.total, "7.0000");
    }
}
