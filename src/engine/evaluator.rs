// ==========================================
// 家具订单报价系统 - 成本计算器
// ==========================================
// 职责: 成本基数 × 费率 × 加价系数 → 4 位小数文本
// 红线: 外购件 "BO" 加价 1.15；其余材料 1.3 × 1.25，两组系数不可合并
//       任何输入都必须得到数值结果，非有限值按 0 输出
// ==========================================

use crate::domain::types::Geometry;
use crate::engine::formula::FormulaRegistry;
use crate::engine::rate_catalog::RateCatalog;
use std::sync::Arc;

/// 享受外购件加价的材料名（精确匹配）
pub const BOUGHT_OUT_MATERIAL: &str = "BO";
/// 外购件加价系数
pub const BOUGHT_OUT_MARKUP: f64 = 1.15;
/// 自制材料损耗/管理系数
pub const FABRICATION_OVERHEAD: f64 = 1.3;
/// 自制材料利润系数
pub const FABRICATION_MARGIN: f64 = 1.25;

/// 成本值格式化：固定 4 位小数，非有限值与负零统一为 "0.0000"
///
/// 恰好落在两档中间的值（如 0.03125）远离 0 进位，而不是银行家舍入。
pub fn format_cost(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0.0000".to_string();
    }
    let scaled = value * 10_000.0;
    let value = if (scaled - scaled.trunc()).abs() == 0.5 {
        scaled.round() / 10_000.0
    } else {
        value
    };
    format!("{:.4}", value)
}

// ==========================================
// CostEvaluator - 成本计算器
// ==========================================
#[derive(Debug, Clone)]
pub struct CostEvaluator {
    registry: Arc<FormulaRegistry>,
}

impl CostEvaluator {
    pub fn new(registry: Arc<FormulaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormulaRegistry {
        &self.registry
    }

    /// 数值结果（非有限值按 0）
    pub fn evaluate(&self, material_name: &str, geometry: &Geometry, rate: f64) -> f64 {
        let base = self.registry.base_value(material_name, geometry);
        let cost = if material_name == BOUGHT_OUT_MATERIAL {
            base * rate * BOUGHT_OUT_MARKUP
        } else {
            base * rate * FABRICATION_OVERHEAD * FABRICATION_MARGIN
        };

        if cost.is_finite() {
            cost
        } else {
            tracing::debug!(material = material_name, "成本计算结果非有限值，按 0 处理");
            0.0
        }
    }

    /// 格式化结果
    pub fn evaluate_formatted(&self, material_name: &str, geometry: &Geometry, rate: f64) -> String {
        format_cost(self.evaluate(material_name, geometry, rate))
    }

    /// 从费率表取费率后计算；未选择材料时返回空文本
    pub fn slot_value(&self, material_name: &str, geometry: &Geometry, rates: &RateCatalog) -> String {
        if material_name.is_empty() {
            return String::new();
        }
        self.evaluate_formatted(material_name, geometry, rates.rate(material_name))
    }
}

impl Default for CostEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(FormulaRegistry::builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::formula::FormulaId;

    #[test]
    fn test_board_example() {
        let evaluator = CostEvaluator::default();
        let g = Geometry::new(2.0, 3.0, 0.0, 0.0);
        assert_eq!(evaluator.evaluate_formatted("OSL - 18mm", &g, 100.0), "1004.2500");
    }

    #[test]
    fn test_bought_out_example() {
        let evaluator = CostEvaluator::default();
        let g = Geometry::new(4.0, 5.0, 0.0, 0.0);
        assert_eq!(evaluator.evaluate_formatted("BO", &g, 10.0), "230.0000");
    }

    #[test]
    fn test_lowercase_bo_uses_fabrication_markup() {
        let evaluator = CostEvaluator::default();
        let g = Geometry::new(4.0, 5.0, 0.0, 0.0);
        // 20 * 10 * 1.3 * 1.25
        assert_eq!(evaluator.evaluate_formatted("Bo", &g, 10.0), "325.0000");
    }

    #[test]
    fn test_zero_rate_yields_zero_for_every_formula() {
        let evaluator = CostEvaluator::default();
        let g = Geometry::new(3.0, 2.0, 1.5, 0.7);
        for name in ["OSL - 18mm", "Foil", "Installation", "Machine", "BO", "BSR - 18mm", "Unknown"] {
            assert_eq!(evaluator.evaluate_formatted(name, &g, 0.0), "0.0000", "{}", name);
        }
    }

    #[test]
    fn test_markup_matches_rounded_formula() {
        let evaluator = CostEvaluator::default();
        let registry = FormulaRegistry::builtin();
        let g = Geometry::new(3.0, 1.7, 2.2, 0.9);
        let rate = 37.5;
        for name in ["Foil", "Lipping", "Machine", "Hardware", "Sal Wood"] {
            let base = registry.base_value(name, &g);
            let expected = format_cost(base * rate * 1.3 * 1.25);
            assert_eq!(evaluator.evaluate_formatted(name, &g, rate), expected);
        }
        let expected = format_cost(registry.base_value("BO", &g) * rate * 1.15);
        assert_eq!(evaluator.evaluate_formatted("BO", &g, rate), expected);
    }

    #[test]
    fn test_exact_half_rounds_away_from_zero() {
        assert_eq!(format_cost(0.03125), "0.0313");
        assert_eq!(format_cost(1.03125), "1.0313");
        assert_eq!(format_cost(-0.03125), "-0.0313");
        assert_eq!(format_cost(0.03124), "0.0312");
        assert_eq!(format_cost(1004.25), "1004.2500");
    }

    #[test]
    fn test_non_finite_formatted_as_zero() {
        assert_eq!(format_cost(f64::NAN), "0.0000");
        assert_eq!(format_cost(f64::INFINITY), "0.0000");
        assert_eq!(format_cost(-0.0), "0.0000");
        assert_eq!(format_cost(1.23456), "1.2346");
    }

    #[test]
    fn test_slot_value_with_catalog() {
        let mut registry = FormulaRegistry::builtin();
        registry.register("Custom Panel", FormulaId::Board);
        let evaluator = CostEvaluator::new(Arc::new(registry));
        let rates: RateCatalog = vec![("Custom Panel", 100.0)].into_iter().collect();
        let g = Geometry::new(2.0, 3.0, 0.0, 0.0);

        assert_eq!(evaluator.slot_value("Custom Panel", &g, &rates), "1004.2500");
        assert_eq!(evaluator.slot_value("Not Rated", &g, &rates), "0.0000");
        assert_eq!(evaluator.slot_value("", &g, &rates), "");
    }
}
