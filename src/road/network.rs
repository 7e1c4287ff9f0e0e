//! 路网状态
//!
//! 持有道路、路口与在网车辆；所有占用变化都经由这里，保证 0 <= 占用 <= 容量。

use std::collections::BTreeMap;

use super::id::{IntersectionId, RoadId, VehicleId};
use super::intersection::{Intersection, LightState, PhaseTiming};
use super::road::Road;
use super::vehicle::Vehicle;
use crate::config::SimConfig;
use crate::sim::SimTime;
use tracing::{debug, trace, warn};

/// 绿灯后停止线前车辆依次通过路口的间隔
pub const DISCHARGE_HEADWAY: SimTime = SimTime(2_000);

/// 车辆驶入道路后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// 绿灯放行，已确定驶离时刻
    Moving { departure: SimTime },
    /// 红灯，停在停止线前
    Stopped,
}

/// 驶离事件的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum DepartOutcome {
    /// 车辆驶离并归档
    Departed(Vehicle),
    /// 到点时遇红灯，转入停止线等待
    Held,
    /// 过期事件（车辆已不在该路或驶离时刻已变），忽略
    Stale,
}

/// 路网
#[derive(Debug, Default)]
pub struct RoadNetwork {
    roads: Vec<Road>,
    intersections: Vec<Intersection>,
    light_of: Vec<Option<IntersectionId>>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    next_vehicle_id: u64,
}

impl RoadNetwork {
    /// 按（已校验的）配置构建路网
    pub fn from_config(cfg: &SimConfig) -> Self {
        let mut net = RoadNetwork::default();
        for spec in &cfg.roads {
            net.add_road(
                spec.name.clone(),
                spec.capacity,
                SimTime::from_secs_f64(spec.travel_minutes * 60.0),
                spec.queue_capacity,
            );
        }
        for spec in &cfg.intersections {
            let groups = spec
                .groups
                .iter()
                .map(|g| g.iter().filter_map(|name| net.road_id(name)).collect())
                .collect();
            net.add_intersection(
                spec.name.clone(),
                groups,
                spec.timing,
                SimTime::from_secs(spec.red_secs),
            );
        }
        net
    }

    /// 添加道路
    pub fn add_road(
        &mut self,
        name: impl Into<String>,
        capacity: u32,
        base_travel: SimTime,
        queue_capacity: u32,
    ) -> RoadId {
        let id = RoadId(self.roads.len());
        self.roads
            .push(Road::new(id, name, capacity, base_travel, queue_capacity));
        self.light_of.push(None);
        id
    }

    /// 添加路口；组内道路归该路口信号灯控制
    pub fn add_intersection(
        &mut self,
        name: impl Into<String>,
        groups: Vec<Vec<RoadId>>,
        timing: PhaseTiming,
        clearance: SimTime,
    ) -> IntersectionId {
        let id = IntersectionId(self.intersections.len());
        for &r in groups.iter().flatten() {
            self.light_of[r.0] = Some(id);
        }
        self.intersections
            .push(Intersection::new(id, name, groups, timing, clearance));
        id
    }

    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.0]
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road_ids(&self) -> Vec<RoadId> {
        self.roads.iter().map(|r| r.id).collect()
    }

    pub fn road_id(&self, name: &str) -> Option<RoadId> {
        self.roads.iter().find(|r| r.name == name).map(|r| r.id)
    }

    pub fn intersection(&self, id: IntersectionId) -> &Intersection {
        &self.intersections[id.0]
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// 仍在网内的车辆数（路上、停止线前、等候区中）
    pub fn vehicles_in_flight(&self) -> u64 {
        self.vehicles.len() as u64
    }

    /// 没有信号灯控制的道路恒为绿灯
    pub fn is_green(&self, road: RoadId) -> bool {
        self.light_of[road.0].is_none_or(|ix| self.intersections[ix.0].is_green(road))
    }

    pub fn light(&self, road: RoadId) -> LightState {
        if self.is_green(road) {
            LightState::Green
        } else {
            LightState::Red
        }
    }

    /// 所有道路满足 0 <= 占用 <= 容量
    pub fn occupancy_within_capacity(&self) -> bool {
        self.roads.iter().all(|r| r.occupancy <= r.capacity)
    }

    /// 生成一辆车
    pub fn spawn_vehicle(&mut self, origin: RoadId, weight: u32, now: SimTime) -> VehicleId {
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;
        self.roads[origin.0].arrivals += 1;
        self.vehicles
            .insert(id, Vehicle::new(id, origin, weight, now));
        trace!(vehicle = id.0, origin = origin.0, weight, "生成车辆");
        id
    }

    /// 车辆驶入道路。容量不足时返回 None，车辆保持原状。
    pub fn admit(&mut self, vehicle: VehicleId, road: RoadId, now: SimTime) -> Option<Entry> {
        let green = self.is_green(road);
        let r = &mut self.roads[road.0];
        let v = self.vehicles.get_mut(&vehicle)?;
        if !r.fits(v.weight) {
            warn!(vehicle = vehicle.0, road = r.name.as_str(), "容量不足，无法驶入");
            return None;
        }

        // 行驶时间取驶入前的拥堵
        let travel = r.travel_time();
        r.occupancy += v.weight;
        r.admissions += 1;
        v.road = Some(road);
        v.entered = Some(now);

        let entry = if green {
            let departure = now.saturating_add(travel);
            v.departure = Some(departure);
            Entry::Moving { departure }
        } else {
            v.departure = None;
            r.stop_line.push_back(vehicle);
            Entry::Stopped
        };
        debug!(
            vehicle = vehicle.0,
            road = r.name.as_str(),
            occupancy = r.occupancy,
            capacity = r.capacity,
            ?entry,
            "🚗 车辆驶入"
        );
        Some(entry)
    }

    /// 把车辆放进道路等候区；等候区已满返回 false。
    pub fn defer(&mut self, vehicle: VehicleId, road: RoadId) -> bool {
        let Some(v) = self.vehicles.get_mut(&vehicle) else {
            return false;
        };
        let r = &mut self.roads[road.0];
        if r.holding.enqueue(vehicle, v.weight).is_err() {
            return false;
        }
        v.road = Some(road);
        debug!(
            vehicle = vehicle.0,
            road = r.name.as_str(),
            waiting = r.holding.len(),
            "⏳ 车辆进入等候区"
        );
        true
    }

    /// 拒绝车辆并把它移出路网
    pub fn reject(&mut self, vehicle: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(&vehicle)
    }

    /// 处理驶离事件
    pub fn depart(&mut self, vehicle: VehicleId, road: RoadId, now: SimTime) -> DepartOutcome {
        let scheduled = self
            .vehicles
            .get(&vehicle)
            .filter(|v| v.road == Some(road) && v.departure == Some(now));
        if scheduled.is_none() {
            return DepartOutcome::Stale;
        }

        if !self.is_green(road) {
            let r = &mut self.roads[road.0];
            r.stop_line.push_back(vehicle);
            if let Some(v) = self.vehicles.get_mut(&vehicle) {
                v.departure = None;
                v.at_stop_line = true;
            }
            return DepartOutcome::Held;
        }

        let Some(mut v) = self.vehicles.remove(&vehicle) else {
            return DepartOutcome::Stale;
        };
        let r = &mut self.roads[road.0];
        r.occupancy = r.occupancy.saturating_sub(v.weight);
        r.departures += 1;
        v.departure = Some(now);
        debug!(
            vehicle = vehicle.0,
            road = r.name.as_str(),
            occupancy = r.occupancy,
            "🏁 车辆驶离"
        );
        DepartOutcome::Departed(v)
    }

    /// 道路变绿：为停止线前的车辆安排驶离时刻。
    ///
    /// 已走完全程的车辆按 `DISCHARGE_HEADWAY` 依次通过路口；
    /// 红灯时才驶入、尚未行驶的车辆按当前拥堵重新计算行驶时间。
    pub fn release_stop_line(&mut self, road: RoadId, now: SimTime) -> Vec<(VehicleId, SimTime)> {
        let r = &mut self.roads[road.0];
        let fresh = now.saturating_add(r.travel_time());
        let mut discharge = now;
        let mut released = Vec::with_capacity(r.stop_line.len());
        while let Some(id) = r.stop_line.pop_front() {
            let Some(v) = self.vehicles.get_mut(&id) else {
                continue;
            };
            let departure = if v.at_stop_line {
                let at = discharge;
                discharge = discharge.saturating_add(DISCHARGE_HEADWAY);
                at
            } else {
                fresh
            };
            v.departure = Some(departure);
            released.push((id, departure));
        }
        if !released.is_empty() {
            debug!(road = r.name.as_str(), released = released.len(), "🟢 停止线放行");
        }
        released
    }

    /// 道路有空余容量时，让等候区队首车辆依次驶入
    pub fn admit_from_holding(&mut self, road: RoadId, now: SimTime) -> Vec<(Vehicle, Entry)> {
        let mut admitted = Vec::new();
        loop {
            let r = &self.roads[road.0];
            let Some((id, weight)) = r.holding.front() else {
                break;
            };
            if !r.fits(weight) {
                break;
            }
            self.roads[road.0].holding.dequeue();
            if let Some(entry) = self.admit(id, road, now) {
                if let Some(v) = self.vehicles.get(&id) {
                    admitted.push((v.clone(), entry));
                }
            }
        }
        admitted
    }

    /// 切换路口相位，返回（新变绿的道路，本相位时长）
    pub fn advance_phase(&mut self, ix: IntersectionId, now: SimTime) -> (Vec<RoadId>, SimTime) {
        let roads = &self.roads;
        let light = &mut self.intersections[ix.0];
        let newly_green = light.advance(now, |r| roads[r.0].congestion());
        (newly_green, light.phase_duration)
    }
}
