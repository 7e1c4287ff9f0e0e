//! 路口等候区（尾丢弃）
//!
//! 道路满载时被延迟的车辆在此排队；等候区已满则直接拒绝新车辆。

use std::collections::VecDeque;

use crate::road::VehicleId;

#[derive(Debug, Clone)]
pub struct HoldingQueue {
    max_vehicles: u32,
    q: VecDeque<(VehicleId, u32)>,
}

impl HoldingQueue {
    pub fn new(max_vehicles: u32) -> Self {
        Self {
            max_vehicles,
            q: VecDeque::new(),
        }
    }

    /// 入队：成功返回 Ok；等候区已满则返回 Err(vehicle)
    pub fn enqueue(&mut self, vehicle: VehicleId, weight: u32) -> Result<(), VehicleId> {
        if !self.has_room() {
            return Err(vehicle);
        }
        self.q.push_back((vehicle, weight));
        Ok(())
    }

    /// 队首车辆及其占用单位
    pub fn front(&self) -> Option<(VehicleId, u32)> {
        self.q.front().copied()
    }

    pub fn dequeue(&mut self) -> Option<VehicleId> {
        self.q.pop_front().map(|(id, _)| id)
    }

    pub fn has_room(&self) -> bool {
        self.free_slots() > 0
    }

    pub fn free_slots(&self) -> u32 {
        self.max_vehicles.saturating_sub(self.len() as u32)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
}
