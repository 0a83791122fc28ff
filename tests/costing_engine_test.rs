// ==========================================
// 核算引擎集成测试
// ==========================================
// 测试目标: 公式 → 单行成本 → 覆写 → 汇总 全链路
// ==========================================


use furniture_quote::domain::{ComponentField, Item, MaterialSlot, SlotKey, SlotOwner};
use furniture_quote::engine::{
    format_cost, CostEvaluator, CostingError, CostingSession, FormulaId, FormulaRegistry,
    RateCatalog,
};
use std::sync::Arc;
use test_helpers::{hinge, sample_rate_groups, top_panel, wardrobe_item};

fn open(items: Vec<Item>) -> CostingSession {
    CostingSession::open(
        "Q-TEST",
        items,
        RateCatalog::from_groups(&sample_rate_groups()),
        CostEvaluator::default(),
    )
}

#[test]
fn test_board_and_bought_out_examples() {
    furniture_quote::logging::init_test();

    let mut item = Item::new("Wardrobe");
    item.components.push(top_panel());
    item.bo.push(hinge());
    let mut session = open(vec![item]);

    session
        .select_material(SlotKey::component(0, 0, 0), "OSL - 18mm")
        .unwrap();
    session.select_material(SlotKey::bo(0, 0, 0), "BO").unwrap();

    let view = session.view();
    assert_eq!(view.items[0].components[0].slots[0].value, "1004.2500");
    assert_eq!(view.items[0].bo[0].slots[0].value, "230.0000");
    assert_eq!(view.items[0].total, "1234.2500");
    assert_eq!(view.total, "1234.2500");
}

#[test]
fn test_zero_rate_material_costs_nothing() {
    let mut item = Item::new("Desk");
    item.components.push(top_panel());
    let mut session = CostingSession::open(
        "Q-TEST",
        vec![item],
        RateCatalog::new(),
        CostEvaluator::default(),
    );

    for material in ["OSL - 18mm", "Foil", "Machine", "BSR - 18mm", "Unlisted"] {
        session
            .select_material(SlotKey::component(0, 0, 0), material)
            .unwrap();
        assert_eq!(
            session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(),
            "0.0000",
            "{}",
            material
        );
    }
}

#[test]
fn test_override_persists_until_material_changes() {
    let mut session = open(vec![wardrobe_item()]);
    let key = SlotKey::component(0, 0, 0);

    session.set_override(key, "750").unwrap();
    for raw in ["5", "", "abc", "2"] {
        session
            .edit_component_field(0, 0, ComponentField::Quantity, raw)
            .unwrap();
        assert_eq!(session.resolved_value(&key).unwrap(), "750");
    }
    assert_eq!(session.totals().formatted_total(), "980.0000");

    session.select_material(key, "OSL - 18mm").unwrap();
    assert_eq!(session.resolved_value(&key).unwrap(), "1004.2500");
}

#[test]
fn test_non_numeric_override_counts_as_zero() {
    let mut session = open(vec![wardrobe_item()]);
    session.set_override(SlotKey::bo(0, 0, 0), "n/a").unwrap();

    let view = session.view();
    assert_eq!(view.items[0].bo[0].slots[0].value, "n/a");
    assert_eq!(view.items[0].bo[0].total, "0.0000");
    assert_eq!(view.total, "1004.2500");
}

#[test]
fn test_removing_slot_lowers_total_by_its_value() {
    let mut session = open(vec![wardrobe_item()]);
    let owner = SlotOwner::component(0, 0);
    let extra = session.add_slot(owner).unwrap();
    session.select_material(extra, "Hardware").unwrap();

    let before = session.totals().total;
    let removed = session.remove_slot(extra).unwrap();

    assert_eq!(format_cost(removed), "65.0000");
    assert_eq!(format_cost(before - session.totals().total), "65.0000");
    assert_eq!(
        session.remove_slot(owner.slot(0)),
        Err(CostingError::LastSlot(owner))
    );
}

#[test]
fn test_empty_material_lists_are_synthesized_and_filtered_on_submit() {
    let mut item = Item::new("Bed");
    let mut panel = top_panel();
    panel.materials.clear();
    item.components.push(panel);
    let mut bo = hinge();
    bo.materials.clear();
    item.bo.push(bo);

    let session = open(vec![item]);
    assert_eq!(session.items()[0].components[0].materials, vec![MaterialSlot::empty()]);
    assert_eq!(session.items()[0].bo[0].materials, vec![MaterialSlot::empty()]);

    let payload = session.submission_payload();
    assert!(payload.items[0].components[0].materials.is_empty());
    assert!(payload.items[0].bo[0].materials.is_empty());
    assert_eq!(payload.items[0].total_amount, 0.0);
}

#[test]
fn test_item_wise_totals_and_rename() {
    let mut session = open(vec![wardrobe_item(), wardrobe_item()]);
    assert_eq!(session.view().item_wise_totals["Wardrobe"], "2468.5000");

    session.rename_item(1, "Wardrobe B").unwrap();
    let totals = session.view().item_wise_totals;
    assert_eq!(totals["Wardrobe"], "1234.2500");
    assert_eq!(totals["Wardrobe B"], "1234.2500");
}

#[test]
fn test_configured_alias_changes_formula() {
    let registry = FormulaRegistry::with_aliases(vec![("Teak Panel".to_string(), FormulaId::Board)]);
    let rates: RateCatalog = vec![("Teak Panel", 100.0)].into_iter().collect();

    let mut item = Item::new("Table");
    item.components.push(top_panel());
    let mut session = CostingSession::open("Q", vec![item], rates, CostEvaluator::new(Arc::new(registry)));

    session
        .select_material(SlotKey::component(0, 0, 0), "Teak Panel")
        .unwrap();
    assert_eq!(
        session.resolved_value(&SlotKey::component(0, 0, 0)).unwrap(),
        "1004.2500"
    );
}

#[test]
fn test_payload_serializes_camel_case_document() {
    let session = open(vec![wardrobe_item()]);
    let json = serde_json::to_value(session.submission_payload()).unwrap();

    let item = &json["items"][0];
    assert_eq!(item["itemSelect"], "Wardrobe");
    assert_eq!(item["totalAmount"], 1234.25);
    assert_eq!(item["components"][0]["componentName"], "Top Panel");
    assert_eq!(item["components"][0]["materials"][0]["value"], "1004.2500");
    assert_eq!(item["bo"][0]["materialname"], "Hinge");
}
