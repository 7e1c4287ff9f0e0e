//! 只读统计快照（交给外部的图表/报告层）

use serde::{Deserialize, Serialize};

use crate::policy::PolicyKind;
use crate::road::RoadId;
use crate::sim::SimTime;

/// 一次占用变化后的拥堵采样
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongestionSample {
    pub at: SimTime,
    pub occupancy: u32,
    pub congestion: f64,
}

/// 按小时聚合的道路统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub hour: u64,
    pub arrivals: u64,
    pub departures: u64,
    pub rejected: u64,
    pub peak_congestion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSummary {
    pub road: RoadId,
    pub name: String,
    pub capacity: u32,
    pub occupancy: u32,
    /// 以本路为起点生成的车辆
    pub arrivals: u64,
    pub admitted: u64,
    pub departed: u64,
    /// 以本路为起点被拒绝的车辆
    pub rejected: u64,
    pub deferred: u64,
    pub peak_congestion: f64,
    pub min_congestion: f64,
    /// 按时间加权的平均拥堵率
    pub average_congestion: f64,
    /// 峰值拥堵超过 70% 的小时数
    pub high_congestion_hours: u64,
    pub history: Vec<CongestionSample>,
    pub buckets: Vec<TimeBucket>,
}

/// 统计快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub at: SimTime,
    pub policy: PolicyKind,
    pub generated: u64,
    /// 已驶离的车辆数
    pub throughput: u64,
    pub rejected: u64,
    pub deferred: u64,
    /// 仍在网内（路上、停止线前、等候区）的车辆
    pub unfinished: u64,
    /// 平均延误（分钟）：行程时间减去自由流行驶时间
    pub average_wait_minutes: f64,
    pub phase_changes: u64,
    /// 到达 horizon 时未执行而被丢弃的事件
    pub drained_events: u64,
    pub roads: Vec<RoadSummary>,
}

impl MetricsSnapshot {
    pub fn road(&self, name: &str) -> Option<&RoadSummary> {
        self.roads.iter().find(|r| r.name == name)
    }
}
