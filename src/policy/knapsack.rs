//! 背包式分配
//!
//! 每条候选道路的剩余容量是“承重预算”，一次准入是一件物品：
//! 重量为车辆占用单位，价值为 1 / (1 + 驶入后的拥堵率)。
//! 一辆车只能去一条路，因此在不超重的物品中取价值最大者，平局取最小道路 id。

use super::{AdmissionPolicy, Assignment, PolicyKind, accept};
use crate::road::{Road, RoadId, RoadNetwork, Vehicle};
use crate::sim::SimTime;
use tracing::trace;

#[derive(Debug, Default, Clone, Copy)]
pub struct KnapsackPolicy;

/// 准入价值
pub fn admission_value(road: &Road, weight: u32) -> f64 {
    1.0 / (1.0 + road.congestion_after(weight))
}

impl AdmissionPolicy for KnapsackPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Knapsack
    }

    fn decide(
        &mut self,
        vehicle: &Vehicle,
        candidates: &[RoadId],
        net: &RoadNetwork,
        now: SimTime,
    ) -> Assignment {
        let mut best: Option<(&Road, f64)> = None;
        for &id in candidates {
            let road = net.road(id);
            if !road.fits(vehicle.weight) {
                continue;
            }
            let value = admission_value(road, vehicle.weight);
            trace!(road = id.0, value, "背包物品");
            let better = match best {
                None => true,
                Some((b, bv)) => value > bv || (value == bv && road.id < b.id),
            };
            if better {
                best = Some((road, value));
            }
        }
        if let Some((road, _)) = best {
            return accept(road, now);
        }

        // 全部满载：去空位最多、且道路容纳得下该车的等候区
        let mut defer: Option<&Road> = None;
        for &id in candidates {
            let road = net.road(id);
            let free = road.holding_free_slots();
            if free == 0 || road.capacity < vehicle.weight {
                continue;
            }
            let better = match defer {
                None => true,
                Some(b) => {
                    let bf = b.holding_free_slots();
                    free > bf || (free == bf && road.id < b.id)
                }
            };
            if better {
                defer = Some(road);
            }
        }
        match defer {
            Some(road) => Assignment::Defer { road: road.id },
            None => Assignment::Reject,
        }
    }
}
