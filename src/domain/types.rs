// ==========================================
// 家具订单报价系统 - 领域类型定义
// ==========================================
// 职责: 数值字段的宽松解析、材料行标识（SlotKey）
// 红线: 数值解析永不报错，空白/非法一律视为 0
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ==========================================
// 数值字段解析
// ==========================================

/// 宽松解析用户输入的数值文本
///
/// 规则:
/// - 去除首尾空白后为空 → None
/// - 可解析为有限浮点数 → Some(value)
/// - 其他（非数字、NaN、inf）→ None
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 空值按 0 处理（公式计算统一入口）
pub fn value_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// 数值转回文本（用于持久化，整数不带小数点）
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 外部文档中的数值：数字或文本
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// 材料行 value 反序列化：文本原样保留，数字转为文本，null → ""
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) if n.is_finite() => format_number(n),
        Some(RawNumber::Number(_)) | None => String::new(),
        Some(RawNumber::Text(text)) => text,
    })
}

/// 金额字段反序列化：数字或文本均可，null/非法 → 0
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_or_zero(lenient_number::deserialize(deserializer)?))
}

/// 兼容外部数据的数值字段 serde 适配
///
/// 外部文档中几何字段可能是字符串（"12"）、数字（12）或缺失，
/// 统一读成 Option<f64>；写出时按字符串输出，空值写成 ""。
pub mod lenient_number {
    use super::{format_number, parse_number, RawNumber};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&format_number(*v)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawNumber>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawNumber::Number(n)) => Some(n).filter(|v| v.is_finite()),
            Some(RawNumber::Text(text)) => parse_number(&text),
            None => None,
        })
    }
}

// ==========================================
// 几何参数 (Geometry)
// ==========================================
// 公式输入，已完成空值 → 0 的转换
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub quantity: f64,
    pub cutsize: f64,
    pub length: f64,
    pub breadth: f64,
}

impl Geometry {
    pub fn new(quantity: f64, cutsize: f64, length: f64, breadth: f64) -> Self {
        Self {
            quantity,
            cutsize,
            length,
            breadth,
        }
    }
}

// ==========================================
// 材料行归属 (SlotOwner)
// ==========================================
// 部件材料行与外购件材料行分开标识，避免下标冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotOwner {
    /// 自制部件
    Component { item: usize, component: usize },
    /// 外购件 (Bought-Out)
    Bo { item: usize, bo: usize },
}

impl SlotOwner {
    pub fn component(item: usize, component: usize) -> Self {
        SlotOwner::Component { item, component }
    }

    pub fn bo(item: usize, bo: usize) -> Self {
        SlotOwner::Bo { item, bo }
    }

    /// 所属条目下标
    pub fn item(&self) -> usize {
        match self {
            SlotOwner::Component { item, .. } | SlotOwner::Bo { item, .. } => *item,
        }
    }

    /// 条目内的部件/外购件下标
    pub fn index(&self) -> usize {
        match self {
            SlotOwner::Component { component, .. } => *component,
            SlotOwner::Bo { bo, .. } => *bo,
        }
    }

    pub fn is_bo(&self) -> bool {
        matches!(self, SlotOwner::Bo { .. })
    }

    /// 同类型、同条目，仅替换下标
    pub fn with_item(&self, item: usize) -> Self {
        match *self {
            SlotOwner::Component { component, .. } => SlotOwner::Component { item, component },
            SlotOwner::Bo { bo, .. } => SlotOwner::Bo { item, bo },
        }
    }

    pub fn with_index(&self, index: usize) -> Self {
        match *self {
            SlotOwner::Component { item, .. } => SlotOwner::Component {
                item,
                component: index,
            },
            SlotOwner::Bo { item, .. } => SlotOwner::Bo { item, bo: index },
        }
    }

    /// 判断两个归属是否为同一条目下的同类集合
    pub fn same_collection(&self, other: &SlotOwner) -> bool {
        self.item() == other.item() && self.is_bo() == other.is_bo()
    }

    pub fn slot(&self, material: usize) -> SlotKey {
        SlotKey {
            owner: *self,
            material,
        }
    }
}

impl fmt::Display for SlotOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotOwner::Component { item, component } => write!(f, "component[{}-{}]", item, component),
            SlotOwner::Bo { item, bo } => write!(f, "bo[{}-{}]", item, bo),
        }
    }
}

// ==========================================
// 材料行标识 (SlotKey)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub owner: SlotOwner,
    pub material: usize,
}

impl SlotKey {
    pub fn component(item: usize, component: usize, material: usize) -> Self {
        SlotOwner::component(item, component).slot(material)
    }

    pub fn bo(item: usize, bo: usize, material: usize) -> Self {
        SlotOwner::bo(item, bo).slot(material)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.material)
    }
}

// ==========================================
// 可编辑字段
// ==========================================

/// 部件可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentField {
    Unit,
    ComponentName,
    Length,
    Breadth,
    Depth,
    Quantity,
    Cutsize,
}

impl ComponentField {
    /// 是否影响成本计算
    pub fn is_geometry(&self) -> bool {
        !matches!(self, ComponentField::Unit | ComponentField::ComponentName)
    }
}

/// 外购件可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoField {
    MaterialName,
    Quantity,
    Cutsize,
}

impl BoField {
    pub fn is_geometry(&self) -> bool {
        !matches!(self, BoField::MaterialName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_lenient() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(value_or_zero(parse_number("x")), 0.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_slot_owner_kinds_do_not_collide() {
        let component = SlotKey::component(0, 1, 2);
        let bo = SlotKey::bo(0, 1, 2);
        assert_ne!(component, bo);
        assert_eq!(component.owner.item(), 0);
        assert_eq!(bo.owner.index(), 1);
        assert!(bo.owner.is_bo());
        assert!(!component.owner.same_collection(&bo.owner));
    }

    #[test]
    fn test_lenient_number_serde() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            #[serde(default, with = "lenient_number")]
            v: Option<f64>,
        }

        let p: Holder = serde_json::from_str(r#"{"v":"3"}"#).unwrap();
        assert_eq!(p.v, Some(3.0));
        let p: Holder = serde_json::from_str(r#"{"v":4.5}"#).unwrap();
        assert_eq!(p.v, Some(4.5));
        let p: Holder = serde_json::from_str(r#"{"v":""}"#).unwrap();
        assert_eq!(p.v, None);
        let p: Holder = serde_json::from_str(r#"{"v":null}"#).unwrap();
        assert_eq!(p.v, None);
        let p: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.v, None);

        let out = serde_json::to_string(&Holder { v: Some(7.0) }).unwrap();
        assert_eq!(out, r#"{"v":"7"}"#);
    }

    #[test]
    fn test_lenient_text_and_amount() {
        #[derive(Deserialize)]
        struct Stored {
            #[serde(default, deserialize_with = "lenient_text")]
            value: String,
            #[serde(default, deserialize_with = "lenient_amount")]
            amount: f64,
        }

        let s: Stored = serde_json::from_str(r#"{"value":1004.25,"amount":"12.5"}"#).unwrap();
        assert_eq!((s.value.as_str(), s.amount), ("1004.25", 12.5));
        let s: Stored = serde_json::from_str(r#"{"value":null,"amount":null}"#).unwrap();
        assert_eq!((s.value.as_str(), s.amount), ("", 0.0));
        let s: Stored = serde_json::from_str(r#"{"value":"n/a","amount":"abc"}"#).unwrap();
        assert_eq!((s.value.as_str(), s.amount), ("n/a", 0.0));
        let s: Stored = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!((s.value.as_str(), s.amount), ("", 0.0));
    }
}
