// ==========================================
// 家具订单报价系统 - 成本公式注册表
// ==========================================
// 职责: 材料名 → 公式编号 → 纯函数（几何参数 → 成本基数）
// 红线: 系数为固定业务常量，运行时不可配置；
//       可配置的只有"材料名 → 公式编号"映射
// ==========================================

use crate::domain::types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ==========================================
// FormulaId - 公式编号
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaId {
    /// 板材: quantity * cutsize * 1.03
    Board,
    /// 贴皮: quantity * (l*b + 0.018*(l+b)*2) * 1.3
    Foil,
    /// 木料切割: quantity * length / 60
    WoodCutting,
    /// 板材切割: quantity * (l+b) * 2 / 60
    BoardCutting,
    /// 实木方料: quantity * 0.05 * 0.05 * 1.2
    SolidWood,
    /// 固定计 1（安装、拼装）
    Fixed,
    /// 外购件: quantity * cutsize
    BoughtOut,
    /// 五金: quantity * 4 * 5
    Hardware,
    /// 封边: quantity * (l+b) * 2 * 1.05
    Lipping,
    /// 机加工工时
    Machine,
    /// 背板 BSR - 18mm
    BackShutter,
    /// 缺省: quantity * cutsize
    Default,
}

impl FormulaId {
    pub const ALL: [FormulaId; 12] = [
        FormulaId::Board,
        FormulaId::Foil,
        FormulaId::WoodCutting,
        FormulaId::BoardCutting,
        FormulaId::SolidWood,
        FormulaId::Fixed,
        FormulaId::BoughtOut,
        FormulaId::Hardware,
        FormulaId::Lipping,
        FormulaId::Machine,
        FormulaId::BackShutter,
        FormulaId::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaId::Board => "board",
            FormulaId::Foil => "foil",
            FormulaId::WoodCutting => "wood_cutting",
            FormulaId::BoardCutting => "board_cutting",
            FormulaId::SolidWood => "solid_wood",
            FormulaId::Fixed => "fixed",
            FormulaId::BoughtOut => "bought_out",
            FormulaId::Hardware => "hardware",
            FormulaId::Lipping => "lipping",
            FormulaId::Machine => "machine",
            FormulaId::BackShutter => "back_shutter",
            FormulaId::Default => "default",
        }
    }

    /// 计算成本基数（不含费率与加价）
    pub fn apply(&self, g: &Geometry) -> f64 {
        let Geometry {
            quantity: q,
            cutsize: c,
            length: l,
            breadth: b,
        } = *g;

        match self {
            FormulaId::Board => q * c * 1.03,
            FormulaId::Foil => q * (l * b + 0.018 * (l + b) * 2.0) * 1.3,
            FormulaId::WoodCutting => q * l / 60.0,
            FormulaId::BoardCutting => q * (l + b) * 2.0 / 60.0,
            FormulaId::SolidWood => q * 0.05 * 0.05 * 1.2,
            FormulaId::Fixed => 1.0,
            FormulaId::BoughtOut => q * c,
            FormulaId::Hardware => q * 4.0 * 5.0,
            FormulaId::Lipping => q * (l + b) * 2.0 * 1.05,
            FormulaId::Machine => {
                (q * (l + b) * 2.0 * 2.0) / 60.0
                    + (q * 4.0 * 3.0 * 0.5) / 60.0
                    + (q * l * 2.5) / 60.0
            }
            FormulaId::BackShutter => {
                q * ((l * b * 2.0 * 1.2) + (b * 2.0 + l) * 0.05 * 1.2)
            }
            FormulaId::Default => q * c,
        }
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        FormulaId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| format!("未知公式编号: {}", s))
    }
}

// ==========================================
// 内置材料名映射
// ==========================================
// 简称在前，完整商品名在后；同一公式形态复用同一编号
const BUILTIN_ALIASES: &[(&str, FormulaId)] = &[
    // ===== 简称 =====
    ("OSL - 18mm", FormulaId::Board),
    ("OSR - 18mm", FormulaId::Board),
    ("OSL - 8mm", FormulaId::Board),
    ("OSR - 8mm", FormulaId::Board),
    ("OSL - 6mm", FormulaId::Board),
    ("OSL - 25mm", FormulaId::Board),
    ("OSR - 25mm", FormulaId::Board),
    ("BSL - 18mm", FormulaId::Board),
    ("BSR - 18mm", FormulaId::BackShutter),
    ("Foil", FormulaId::Foil),
    ("Wood cutting", FormulaId::WoodCutting),
    ("Board cutting", FormulaId::BoardCutting),
    ("Sal Wood", FormulaId::SolidWood),
    ("Installation", FormulaId::Fixed),
    ("Joinery", FormulaId::Fixed),
    ("BO", FormulaId::BoughtOut),
    ("Bo", FormulaId::BoughtOut),
    ("Hardware", FormulaId::Hardware),
    ("Lipping", FormulaId::Lipping),
    ("Machine", FormulaId::Machine),
    // ===== 板材 =====
    ("MDF MEL B/S SANTAREM OAK 4x8x18 MM (#95)", FormulaId::Board),
    ("FLEXIBLE PLY 4x8x8 MM VERTICAL", FormulaId::Board),
    ("MDF PALIN 61212MM M/R", FormulaId::Board),
    ("CHIPBOARD TUBULAR 900x2090x33MM (C)", FormulaId::Board),
    ("MDF PALIN 4x8x06MM M/R", FormulaId::Board),
    ("MDF MEL B/S WHITE 4x8x18MM M/R", FormulaId::Board),
    ("MDF PLAIN 4 x 8 x 06MM M/R", FormulaId::Board),
    ("MDF PLAIN 4 x 8 x 12MM", FormulaId::Board),
    ("MDF PLAIN 4 x 8 x 09MM", FormulaId::Board),
    ("MDF PLAIN 4 x 8 x 18MM (PRIME)", FormulaId::Board),
    ("MARINE PLYWOOD-12MM", FormulaId::Board),
    ("PLYWOOD WHITE 6MM", FormulaId::Board),
    ("12MM PLAIN MDF 4x8FT THAILAND", FormulaId::Board),
    ("18MM PLAIN 4x8FT THAILAND", FormulaId::Board),
    ("MDF MEL B/S BLACK MATT 4x8x18MM MDF -21-18-M-2F", FormulaId::Board),
    ("LAM.4x8FTx0.9MM CROWN 9005 OR CLOUDY CEMENT", FormulaId::Board),
    ("MDF PLAIN 4x8x3MM", FormulaId::Board),
    ("MDF PLAIN 4x8x18MM", FormulaId::Board),
    ("PURE HIGH GLOSS MDF O/S UV COATED 4x8x18MM- BEIGE PUGL 3081", FormulaId::Board),
    ("PURE BABY SKIN MATT MDF O/S EXCIMER FINISH 4x9x18MM BEIGE PUMT3081", FormulaId::Board),
    ("MDF MEL B/S MIDNIGHT GREY 4x8x18MM", FormulaId::Board),
    ("PURE HIGH GLOSS MDF O/S UV COATED 4x8x18MM INDUSTRIAL WHITE PUGL 3083", FormulaId::Board),
    ("MDF MEL B/S MANGOLIA CREAM 4x8x18MM", FormulaId::Board),
    // ===== 实木方料 =====
    ("BEECHWOOD 2\" KD SUPER GRADE", FormulaId::SolidWood),
    ("RED MERANTI WOOD 2\" x 10\" (AAA GRADE)", FormulaId::SolidWood),
    ("WHITE WOOD 2x3x13", FormulaId::SolidWood),
    ("WHITE WOOD 1x2x13", FormulaId::SolidWood),
    // ===== 饰面 / 封边 =====
    ("LAM. 4x8FTx0.9MM CROWN 8109 SF ARMAGNA RUSTER MEDIUM", FormulaId::Lipping),
    ("PVC EDGE/ BNDG 22 x 0.4MM SANTAREM OAK PVC95", FormulaId::Lipping),
    ("PVC EDGE/ BNDG 22 x 0.4MM NEW METALLIC SILVER PVC7", FormulaId::Lipping),
    ("PVC LIPPING 1MM X22MM SF 1493", FormulaId::Lipping),
    ("PVC LIPPING 1MM X22MM SF 1492", FormulaId::Lipping),
    ("PVC EDGE BNDG 22x 0.4MM COOL WHITE", FormulaId::Lipping),
    (".55MM GI, PP,RAL 9002 OFFWHITE 18/76 S-TYPE PROFILE SHEET", FormulaId::Lipping),
    ("LAM.4x8FTx0.9MM CROWN 7068 SF CHOCO BROWNY", FormulaId::Lipping),
    ("LAM 4x8FTx.9MM CROWN 1002 SF OFFWHITE", FormulaId::Lipping),
    ("PVC EDGE/BNDG 22x1.2MM BEIGE PUMT 3081", FormulaId::Lipping),
    ("PVC EDG/BNDG 22x1.2MM BEIGE PUGL 3081", FormulaId::Lipping),
    ("PVC EDGE/BNDG 22x1.2MM INDUSTRIAL WHITE PUGL 3083", FormulaId::Lipping),
    // ===== 五金及杂项（按件计）=====
    ("DOOR STOPPER HALF ROUND SS RED-ANT CS9259(DS013)", FormulaId::Default),
    ("0.40MM GI, PP, RAL 9002 OFFWHITE 18/76 PROFILE SHEET", FormulaId::Default),
    ("HINGES SOFT CLOSING A", FormulaId::Default),
    ("SOFT CLOSING HINGES B", FormulaId::Default),
    ("SOFT CLOSING HINGES C", FormulaId::Default),
    ("DOOR LOCK (DORMA DOOR LOCK BODY)", FormulaId::Default),
    ("DOOR HANDLE (DORMA DOOR HANDLE)", FormulaId::Default),
    ("DOOR CYLINDER (DORMA DOOR CYLINDER)", FormulaId::Default),
    ("HINGES4\" (DORMA DOOR HINGES 4\"x3\"x3\")", FormulaId::Default),
    ("DOOR CLOSED (DORMA)", FormulaId::Default),
    ("BATHROOM INDICATOR LOCK", FormulaId::Default),
    ("BATHROOM INDICATOR LOCK (LOCK BODY)", FormulaId::Default),
    ("RUBBER DOOR SEAL (BLACK)", FormulaId::Default),
    ("SOFT CLOSING CHANNEL 500MM (BLACK)", FormulaId::Default),
    ("KINGSA NFR DOOR CORE (LIGHT CORE) 915x2135x44MM", FormulaId::Default),
    ("CHIPBOARD TUBULAR 33MM", FormulaId::Default),
    ("MILANO TROM HINGE 110 DEG SOFT CLOSING CLIP ON 4 HOLE PLATE FULL OVERLAY", FormulaId::Default),
    ("UKEN TRY SQUARE 12\" PLASTIC HANDLE", FormulaId::Default),
    ("SOFT CLOSING CHANNEL 400MM (BLACK)", FormulaId::Default),
    ("PROFILE HANDLE C TYPE 160MM BLACK", FormulaId::Default),
    ("DRAWER SLIDE SOFT CLOSE 12\" (RUBY)", FormulaId::Default),
    ("SHELF SUPPORTER CLEAR", FormulaId::Default),
    ("MAGNETIC PENCIL CONCEALED PUSH CATCHER LONG H/D GREY", FormulaId::Default),
    ("PROFILE HANDLE C TYPE 192MM BLACK", FormulaId::Default),
    ("F1007-416MM BLACK DRAWER HANDLE", FormulaId::Default),
    ("30053-500MM CABINET HANDLE BLK", FormulaId::Default),
    ("F1006-300MM BLACK DRAWER HANDLE", FormulaId::Default),
    ("F1006-400MM BLACK DRAWER HANDLE", FormulaId::Default),
    ("TOOL BOX", FormulaId::Default),
    ("DOOR GASKET", FormulaId::Default),
    ("DOOR CLOSER", FormulaId::Default),
    ("HINGES 3\" S.S", FormulaId::Default),
    ("PULLEY SYSTEM", FormulaId::Default),
    ("DOOR HANDLE (PVC DOOR HANDLE)", FormulaId::Default),
    ("BATHROOM LOCK (PIN LOCK)", FormulaId::Default),
    ("DOOR LOCK (KEYLOCK)", FormulaId::Default),
];

// ==========================================
// FormulaRegistry - 公式注册表
// ==========================================
/// 唯一权威的材料公式表
///
/// 按材料名精确匹配；未登记的材料名回落到缺省公式 `quantity * cutsize`。
#[derive(Debug, Clone)]
pub struct FormulaRegistry {
    aliases: HashMap<String, FormulaId>,
}

impl FormulaRegistry {
    /// 仅含内置映射
    pub fn builtin() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(name, id)| (name.to_string(), *id))
            .collect();
        Self { aliases }
    }

    /// 内置映射 + 配置映射（配置同名覆盖内置）
    pub fn with_aliases<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, FormulaId)>,
    {
        let mut registry = Self::builtin();
        for (name, id) in extra {
            registry.register(name, id);
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, id: FormulaId) {
        self.aliases.insert(name.into(), id);
    }

    /// 精确查找（不回落）
    pub fn resolve(&self, material_name: &str) -> Option<FormulaId> {
        self.aliases.get(material_name).copied()
    }

    /// 查找公式，未登记时回落到缺省公式
    pub fn lookup(&self, material_name: &str) -> FormulaId {
        match self.resolve(material_name) {
            Some(id) => id,
            None => {
                tracing::debug!(material = material_name, "材料未登记公式，使用缺省公式");
                FormulaId::Default
            }
        }
    }

    /// 成本基数
    pub fn base_value(&self, material_name: &str, geometry: &Geometry) -> f64 {
        self.lookup(material_name).apply(geometry)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for FormulaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_short_name_formulas() {
        let registry = FormulaRegistry::builtin();
        let g = Geometry::new(2.0, 3.0, 4.0, 5.0);

        assert!(approx(registry.base_value("OSL - 18mm", &g), 2.0 * 3.0 * 1.03));
        assert!(approx(
            registry.base_value("Foil", &g),
            2.0 * (4.0 * 5.0 + 0.018 * 9.0 * 2.0) * 1.3
        ));
        assert!(approx(registry.base_value("Wood cutting", &g), 2.0 * 4.0 / 60.0));
        assert!(approx(registry.base_value("Board cutting", &g), 2.0 * 9.0 * 2.0 / 60.0));
        assert!(approx(registry.base_value("Sal Wood", &g), 2.0 * 0.05 * 0.05 * 1.2));
        assert!(approx(registry.base_value("Installation", &g), 1.0));
        assert!(approx(registry.base_value("Joinery", &g), 1.0));
        assert!(approx(registry.base_value("BO", &g), 6.0));
        assert!(approx(registry.base_value("Bo", &g), 6.0));
        assert!(approx(registry.base_value("Hardware", &g), 40.0));
        assert!(approx(registry.base_value("Lipping", &g), 2.0 * 9.0 * 2.0 * 1.05));
        assert!(approx(
            registry.base_value("Machine", &g),
            (2.0 * 9.0 * 4.0) / 60.0 + (2.0 * 6.0) / 60.0 + (2.0 * 4.0 * 2.5) / 60.0
        ));
        assert!(approx(
            registry.base_value("BSR - 18mm", &g),
            2.0 * ((4.0 * 5.0 * 2.0 * 1.2) + (5.0 * 2.0 + 4.0) * 0.05 * 1.2)
        ));
    }

    #[test]
    fn test_unknown_material_falls_back_to_default() {
        let registry = FormulaRegistry::builtin();
        let g = Geometry::new(3.0, 7.0, 100.0, 100.0);
        assert_eq!(registry.resolve("Unobtainium"), None);
        assert_eq!(registry.lookup("Unobtainium"), FormulaId::Default);
        assert!(approx(registry.base_value("Unobtainium", &g), 21.0));
        // 大小写敏感：精确匹配
        assert_eq!(registry.resolve("foil"), None);
    }

    #[test]
    fn test_catalog_names_share_formula_shapes() {
        let registry = FormulaRegistry::builtin();
        assert_eq!(registry.lookup("MDF PLAIN 4x8x18MM"), FormulaId::Board);
        assert_eq!(registry.lookup("WHITE WOOD 2x3x13"), FormulaId::SolidWood);
        assert_eq!(registry.lookup("PVC LIPPING 1MM X22MM SF 1493"), FormulaId::Lipping);
        assert_eq!(registry.lookup("TOOL BOX"), FormulaId::Default);
    }

    #[test]
    fn test_configured_alias_overrides_builtin() {
        let registry = FormulaRegistry::with_aliases(vec![
            ("Sal Wood".to_string(), FormulaId::Board),
            ("Teak Veneer".to_string(), FormulaId::Foil),
        ]);
        assert_eq!(registry.lookup("Sal Wood"), FormulaId::Board);
        assert_eq!(registry.lookup("Teak Veneer"), FormulaId::Foil);
        assert_eq!(registry.len(), FormulaRegistry::builtin().len() + 1);
    }

    #[test]
    fn test_formula_id_round_trip_names() {
        for id in FormulaId::ALL {
            assert_eq!(id.as_str().parse::<FormulaId>(), Ok(id));
        }
        assert_eq!(" Board ".parse::<FormulaId>(), Ok(FormulaId::Board));
        assert!("glue".parse::<FormulaId>().is_err());
    }

    #[test]
    fn test_zero_geometry_only_fixed_is_nonzero() {
        let g = Geometry::default();
        for id in FormulaId::ALL {
            let v = id.apply(&g);
            if id == FormulaId::Fixed {
                assert_eq!(v, 1.0);
            } else {
                assert_eq!(v, 0.0, "{} 在零几何参数下应为 0", id);
            }
        }
    }
}
