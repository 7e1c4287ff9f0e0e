//! 道路类型
//!
//! 定义道路容量、占用以及拥堵导致的行驶时间变化。

use std::collections::VecDeque;

use super::id::{RoadId, VehicleId};
use crate::queue::HoldingQueue;
use crate::sim::SimTime;

/// 拥堵时的最低速度比例（满载时按自由流速度的 1/5 行驶）
pub const MIN_SPEED_FACTOR: f64 = 0.2;

/// 道路
#[derive(Debug, Clone)]
pub struct Road {
    pub id: RoadId,
    pub name: String,
    /// 同时在路上的最大容量单位
    pub capacity: u32,
    /// 当前占用（容量单位，包含停止线前等待的车辆）
    pub occupancy: u32,
    /// 自由流行驶时间
    pub base_travel: SimTime,
    /// 以本路为起点生成的车辆数
    pub arrivals: u64,
    /// 驶入本路的车辆数
    pub admissions: u64,
    /// 驶离本路的车辆数
    pub departures: u64,
    /// 红灯时在停止线前等待的车辆（已计入占用）
    pub(crate) stop_line: VecDeque<VehicleId>,
    /// 道路满载时等待驶入的车辆（未计入占用）
    pub(crate) holding: HoldingQueue,
}

impl Road {
    pub fn new(
        id: RoadId,
        name: impl Into<String>,
        capacity: u32,
        base_travel: SimTime,
        queue_capacity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            occupancy: 0,
            base_travel,
            arrivals: 0,
            admissions: 0,
            departures: 0,
            stop_line: VecDeque::new(),
            holding: HoldingQueue::new(queue_capacity),
        }
    }

    /// 拥堵率 = 占用 / 容量
    pub fn congestion(&self) -> f64 {
        ratio(self.occupancy, self.capacity)
    }

    /// 再驶入 `weight` 个单位后的拥堵率
    pub fn congestion_after(&self, weight: u32) -> f64 {
        ratio(self.occupancy.saturating_add(weight), self.capacity)
    }

    pub fn spare(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    pub fn fits(&self, weight: u32) -> bool {
        weight <= self.spare()
    }

    /// 速度比例：随拥堵单调递减，下限为 `MIN_SPEED_FACTOR`
    pub fn speed_factor(&self) -> f64 {
        (1.0 - self.congestion()).max(MIN_SPEED_FACTOR)
    }

    /// 按当前拥堵计算的实际行驶时间
    pub fn travel_time(&self) -> SimTime {
        let ms = self.base_travel.0 as f64 / self.speed_factor();
        SimTime(ms.ceil() as u64)
    }

    pub fn holding_len(&self) -> usize {
        self.holding.len()
    }

    pub fn holding_free_slots(&self) -> u32 {
        self.holding.free_slots()
    }

    pub fn stopped_len(&self) -> usize {
        self.stop_line.len()
    }
}

fn ratio(occupancy: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 1.0;
    }
    occupancy as f64 / capacity as f64
}
