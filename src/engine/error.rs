// ==========================================
// 家具订单报价系统 - 核算引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 数值问题不报错（按 0 处理），这里只有结构性错误
// ==========================================

use crate::domain::types::{SlotKey, SlotOwner};
use thiserror::Error;

/// 核算引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostingError {
    #[error("条目不存在: item={0}")]
    ItemNotFound(usize),

    #[error("材料归属不存在: {0}")]
    OwnerNotFound(SlotOwner),

    #[error("材料行不存在: {0}")]
    SlotNotFound(SlotKey),

    #[error("至少保留一条材料行: {0}")]
    LastSlot(SlotOwner),
}

/// Result 类型别名
pub type CostingResult<T> = Result<T, CostingError>;
