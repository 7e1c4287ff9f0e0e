//! 交通世界实现
//!
//! 仿真上下文：路网、策略、生成器与统计都挂在这里，经由事件处理函数修改。
//! 不使用全局状态，多个仿真可以在不同线程上独立运行。

use super::id::{RoadId, VehicleId};
use super::network::RoadNetwork;
use crate::arrivals::VehicleGenerator;
use crate::metrics::MetricsCollector;
use crate::policy::AdmissionPolicy;
use crate::sim::{DispatchRecord, SimTime, Simulator, World};
use crate::viz::{Frame, FrameLog};
use std::any::Any;

pub struct TrafficWorld {
    pub net: RoadNetwork,
    pub policy: Box<dyn AdmissionPolicy>,
    pub generator: VehicleGenerator,
    pub metrics: MetricsCollector,
    /// 仿真终止时刻
    pub horizon: SimTime,
    /// 每辆车的候选道路（按 id 升序）
    pub candidates: Vec<RoadId>,
    frames: Option<FrameLog>,
    dispatch_log: Option<Vec<DispatchRecord>>,
}

impl TrafficWorld {
    pub fn new(
        net: RoadNetwork,
        policy: Box<dyn AdmissionPolicy>,
        generator: VehicleGenerator,
        horizon: SimTime,
    ) -> Self {
        let metrics = MetricsCollector::new(&net, policy.kind());
        let candidates = net.road_ids();
        Self {
            net,
            policy,
            generator,
            metrics,
            horizon,
            candidates,
            frames: None,
            dispatch_log: None,
        }
    }

    /// 开始记录派发的事件
    pub fn record_dispatches(&mut self) {
        self.dispatch_log.get_or_insert_with(Vec::new);
    }

    /// 已派发事件的有序记录；未开启记录时为空
    pub fn dispatch_log(&self) -> &[DispatchRecord] {
        self.dispatch_log.as_deref().unwrap_or_default()
    }

    /// 记录道路状态：更新统计，开启帧记录时产出一帧
    pub fn observe(&mut self, road: RoadId, now: SimTime) {
        let r = self.net.road(road);
        let (occupancy, capacity) = (r.occupancy, r.capacity);
        self.metrics.on_occupancy(road, occupancy, now);
        let light = self.net.light(road);
        if let Some(log) = self.frames.as_mut() {
            log.push(Frame {
                t_ms: now.0,
                road: road.0,
                occupancy,
                capacity,
                light,
            });
        }
    }

    /// 拒绝车辆并计数
    pub fn reject(&mut self, vehicle: VehicleId, now: SimTime) {
        if let Some(v) = self.net.reject(vehicle) {
            self.metrics.on_rejected(&v, now);
        }
    }

    pub(crate) fn enable_frames(&mut self) {
        self.frames.get_or_insert_with(FrameLog::default);
    }

    pub(crate) fn disable_frames(&mut self) {
        self.frames = None;
    }

    pub(crate) fn take_frames(&mut self) -> Vec<Frame> {
        self.frames.as_mut().map(FrameLog::take).unwrap_or_default()
    }
}

impl World for TrafficWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_dispatch(&mut self, _sim: &Simulator, record: &DispatchRecord) {
        debug_assert!(
            self.net.occupancy_within_capacity(),
            "occupancy exceeded capacity after {record:?}"
        );
        if let Some(log) = self.dispatch_log.as_mut() {
            log.push(*record);
        }
    }
}
