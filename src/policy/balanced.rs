//! 均衡分配
//!
//! 选驶入后拥堵率最小的道路；拥堵率相同的道路之间用轮转指针保证公平，
//! 每次分配（驶入或进入等候区）后指针移到被选道路之后。

use super::{AdmissionPolicy, Assignment, PolicyKind, accept};
use crate::road::{RoadId, RoadNetwork, Vehicle};
use crate::sim::SimTime;

#[derive(Debug, Default, Clone)]
pub struct BalancedPolicy {
    /// 轮转指针：候选列表中的下标
    cursor: usize,
}

impl BalancedPolicy {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 从指针开始按轮转顺序遍历，返回使 `score` 最小的下标（严格更小才替换）。
    fn pick(&self, n: usize, mut score: impl FnMut(usize) -> Option<f64>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for offset in 0..n {
            let idx = (self.cursor + offset) % n;
            let Some(s) = score(idx) else {
                continue;
            };
            if best.is_none_or(|(_, bs)| s < bs) {
                best = Some((idx, s));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

impl AdmissionPolicy for BalancedPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Balanced
    }

    fn decide(
        &mut self,
        vehicle: &Vehicle,
        candidates: &[RoadId],
        net: &RoadNetwork,
        now: SimTime,
    ) -> Assignment {
        let n = candidates.len();
        if n == 0 {
            return Assignment::Reject;
        }

        let chosen = self.pick(n, |idx| {
            let road = net.road(candidates[idx]);
            road.fits(vehicle.weight)
                .then(|| road.congestion_after(vehicle.weight))
        });
        if let Some(idx) = chosen {
            self.cursor = (idx + 1) % n;
            return accept(net.road(candidates[idx]), now);
        }

        // 空位越多得分越低；道路容纳不下的车辆不进等候区
        let deferred = self.pick(n, |idx| {
            let road = net.road(candidates[idx]);
            let free = road.holding_free_slots();
            (free > 0 && road.capacity >= vehicle.weight).then(|| -(free as f64))
        });
        match deferred {
            Some(idx) => {
                self.cursor = (idx + 1) % n;
                Assignment::Defer {
                    road: candidates[idx],
                }
            }
            None => Assignment::Reject,
        }
    }
}
