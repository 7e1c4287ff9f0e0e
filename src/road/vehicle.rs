//! 车辆类型

use super::id::{RoadId, VehicleId};
use crate::sim::SimTime;

/// 车辆：到达时由生成器创建，驶离后归档进统计。
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    /// 生成该车辆的道路
    pub origin: RoadId,
    /// 占用的容量单位
    pub weight: u32,
    pub arrival: SimTime,
    /// 被策略分配的道路（延迟/行驶中才有）
    pub road: Option<RoadId>,
    /// 实际驶入道路的时刻
    pub entered: Option<SimTime>,
    /// 已调度的驶离时刻；停在停止线前时为 None
    pub departure: Option<SimTime>,
    /// 已走完全程、只等绿灯通过路口
    pub at_stop_line: bool,
}

impl Vehicle {
    pub fn new(id: VehicleId, origin: RoadId, weight: u32, arrival: SimTime) -> Self {
        Self {
            id,
            origin,
            weight,
            arrival,
            road: None,
            entered: None,
            departure: None,
            at_stop_line: false,
        }
    }
}
