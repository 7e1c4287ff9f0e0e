//! 统计收集器
//!
//! 观察每一次占用变化、相位切换与拒绝，按道路和小时累积。

use tracing::debug;

use super::snapshot::{CongestionSample, MetricsSnapshot, RoadSummary, TimeBucket};
use crate::policy::PolicyKind;
use crate::road::{RoadId, RoadNetwork, Vehicle};
use crate::sim::SimTime;

/// 峰值拥堵超过该值的小时计为高拥堵时段
pub const HIGH_CONGESTION: f64 = 0.7;

const BUCKET: SimTime = SimTime(3_600_000);

#[derive(Debug, Clone)]
struct RoadStats {
    name: String,
    capacity: u32,
    arrivals: u64,
    admitted: u64,
    departed: u64,
    rejected: u64,
    deferred: u64,
    peak: f64,
    min: f64,
    /// 占用对时间的积分（单位·毫秒）
    area: f64,
    last_at: SimTime,
    last_occupancy: u32,
    history: Vec<CongestionSample>,
    buckets: Vec<TimeBucket>,
}

impl RoadStats {
    fn bucket(&mut self, at: SimTime) -> &mut TimeBucket {
        bucket_at(&mut self.buckets, at)
    }

    fn congestion(&self, occupancy: u32) -> f64 {
        occupancy as f64 / self.capacity.max(1) as f64
    }
}

fn bucket_at(buckets: &mut Vec<TimeBucket>, at: SimTime) -> &mut TimeBucket {
    let idx = (at.0 / BUCKET.0) as usize;
    while buckets.len() <= idx {
        let hour = buckets.len() as u64;
        buckets.push(TimeBucket {
            hour,
            ..TimeBucket::default()
        });
    }
    &mut buckets[idx]
}

/// 占用在 [from, to) 内保持不变：把它的拥堵率计入经过的每个小时
fn carry(buckets: &mut Vec<TimeBucket>, from: SimTime, to: SimTime, congestion: f64) {
    if to <= from {
        return;
    }
    let first = from.0 / BUCKET.0;
    let last = (to.0 - 1) / BUCKET.0;
    for hour in first..=last {
        let b = bucket_at(buckets, SimTime(hour * BUCKET.0));
        b.peak_congestion = b.peak_congestion.max(congestion);
    }
}

#[derive(Debug, Clone)]
pub struct MetricsCollector {
    policy: PolicyKind,
    roads: Vec<RoadStats>,
    generated: u64,
    throughput: u64,
    rejected: u64,
    deferred: u64,
    /// 累计延误（毫秒）
    total_wait_ms: u128,
    phase_changes: u64,
    drained_events: u64,
}

impl MetricsCollector {
    pub fn new(net: &RoadNetwork, policy: PolicyKind) -> Self {
        let roads = net
            .roads()
            .iter()
            .map(|r| RoadStats {
                name: r.name.clone(),
                capacity: r.capacity,
                arrivals: 0,
                admitted: 0,
                departed: 0,
                rejected: 0,
                deferred: 0,
                peak: 0.0,
                min: 0.0,
                area: 0.0,
                last_at: SimTime::ZERO,
                last_occupancy: 0,
                history: vec![CongestionSample {
                    at: SimTime::ZERO,
                    occupancy: 0,
                    congestion: 0.0,
                }],
                buckets: Vec::new(),
            })
            .collect();
        Self {
            policy,
            roads,
            generated: 0,
            throughput: 0,
            rejected: 0,
            deferred: 0,
            total_wait_ms: 0,
            phase_changes: 0,
            drained_events: 0,
        }
    }

    pub fn on_generated(&mut self, origin: RoadId, now: SimTime) {
        self.generated += 1;
        let s = &mut self.roads[origin.0];
        s.arrivals += 1;
        s.bucket(now).arrivals += 1;
    }

    pub fn on_admitted(&mut self, road: RoadId) {
        self.roads[road.0].admitted += 1;
    }

    pub fn on_deferred(&mut self, road: RoadId) {
        self.deferred += 1;
        self.roads[road.0].deferred += 1;
    }

    pub fn on_rejected(&mut self, vehicle: &Vehicle, now: SimTime) {
        self.rejected += 1;
        let s = &mut self.roads[vehicle.origin.0];
        s.rejected += 1;
        s.bucket(now).rejected += 1;
        debug!(vehicle = vehicle.id.0, origin = s.name.as_str(), "❌ 车辆被拒绝");
    }

    /// 车辆驶离：`base_travel` 为所在道路的自由流行驶时间
    pub fn on_departed(&mut self, vehicle: &Vehicle, road: RoadId, base_travel: SimTime, now: SimTime) {
        self.throughput += 1;
        let journey = now.saturating_sub(vehicle.arrival);
        self.total_wait_ms += journey.saturating_sub(base_travel).0 as u128;
        let s = &mut self.roads[road.0];
        s.departed += 1;
        s.bucket(now).departures += 1;
    }

    pub fn on_phase_change(&mut self) {
        self.phase_changes += 1;
    }

    pub fn on_drained(&mut self, events: usize) {
        self.drained_events += events as u64;
    }

    /// 记录道路当前占用（占用未变时只更新时间积分）
    pub fn on_occupancy(&mut self, road: RoadId, occupancy: u32, now: SimTime) {
        let s = &mut self.roads[road.0];
        let dt = now.saturating_sub(s.last_at).0 as f64;
        s.area += s.last_occupancy as f64 * dt;
        let held = s.congestion(s.last_occupancy);
        carry(&mut s.buckets, s.last_at, now, held);
        s.last_at = now;
        if occupancy == s.last_occupancy {
            return;
        }
        s.last_occupancy = occupancy;

        let congestion = s.congestion(occupancy);
        s.peak = s.peak.max(congestion);
        s.min = s.min.min(congestion);
        let b = s.bucket(now);
        b.peak_congestion = b.peak_congestion.max(congestion);
        s.history.push(CongestionSample {
            at: now,
            occupancy,
            congestion,
        });
    }

    /// 生成 `now` 时刻的快照；不修改任何状态。
    pub fn snapshot(&self, now: SimTime, net: &RoadNetwork) -> MetricsSnapshot {
        let roads = self
            .roads
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let tail = now.saturating_sub(s.last_at).0 as f64 * s.last_occupancy as f64;
                let mut buckets = s.buckets.clone();
                carry(&mut buckets, s.last_at, now, s.congestion(s.last_occupancy));
                let average_congestion = if now > SimTime::ZERO {
                    (s.area + tail) / now.0 as f64 / s.capacity.max(1) as f64
                } else {
                    s.congestion(s.last_occupancy)
                };
                RoadSummary {
                    road: RoadId(i),
                    name: s.name.clone(),
                    capacity: s.capacity,
                    occupancy: s.last_occupancy,
                    arrivals: s.arrivals,
                    admitted: s.admitted,
                    departed: s.departed,
                    rejected: s.rejected,
                    deferred: s.deferred,
                    peak_congestion: s.peak,
                    min_congestion: s.min,
                    average_congestion,
                    high_congestion_hours: buckets
                        .iter()
                        .filter(|b| b.peak_congestion > HIGH_CONGESTION)
                        .count() as u64,
                    history: s.history.clone(),
                    buckets,
                }
            })
            .collect();

        let average_wait_minutes = if self.throughput > 0 {
            (self.total_wait_ms / self.throughput as u128) as f64 / 60_000.0
        } else {
            0.0
        };

        MetricsSnapshot {
            at: now,
            policy: self.policy,
            generated: self.generated,
            throughput: self.throughput,
            rejected: self.rejected,
            deferred: self.deferred,
            unfinished: net.vehicles_in_flight(),
            average_wait_minutes,
            phase_changes: self.phase_changes,
            drained_events: self.drained_events,
            roads,
        }
    }
}
