//! 标识符类型
//!
//! 定义道路、路口和车辆的唯一标识符。

use serde::{Deserialize, Serialize};

/// 道路标识符（即配置中道路的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadId(pub usize);

/// 路口标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntersectionId(pub usize);

/// 车辆标识符（按生成顺序递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u64);
