//! 车辆到达事件

use super::id::RoadId;
use super::network::Entry;
use super::departure::VehicleDeparture;
use super::traffic_world::TrafficWorld;
use crate::policy::Assignment;
use crate::sim::{Event, EventKind, SchedulingError, Simulator, World};
use tracing::{debug, trace};

/// 事件：某条道路上生成一辆车，交给策略决定去向。
#[derive(Debug)]
pub struct VehicleArrival {
    pub road: RoadId,
}

impl Event for VehicleArrival {
    fn kind(&self) -> EventKind {
        EventKind::VehicleArrival { road: self.road.0 }
    }

    #[tracing::instrument(skip(self, sim, world), fields(road = self.road.0))]
    fn execute(
        self: Box<Self>,
        sim: &mut Simulator,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError> {
        let VehicleArrival { road } = *self;
        let now = sim.now();
        let w = world
            .as_any_mut()
            .downcast_mut::<TrafficWorld>()
            .expect("world must be TrafficWorld");

        // 先安排同一道路的下一次到达，事件流自我延续到 horizon
        if let Some(next) = w.generator.next_arrival(road, now) {
            sim.schedule(next, VehicleArrival { road })?;
        }

        let weight = w.generator.draw_weight(road);
        let id = w.net.spawn_vehicle(road, weight, now);
        w.metrics.on_generated(road, now);

        let assignment = match w.net.vehicle(id) {
            Some(v) => w.policy.decide(v, &w.candidates, &w.net, now),
            None => Assignment::Reject,
        };
        debug!(vehicle = id.0, weight, ?assignment, now = ?now, "📥 车辆到达");

        match assignment {
            Assignment::Accept { road: target, .. } => match w.net.admit(id, target, now) {
                Some(entry) => {
                    w.metrics.on_admitted(target);
                    if let Entry::Moving { departure } = entry {
                        sim.schedule(departure, VehicleDeparture { road: target, vehicle: id })?;
                    }
                    w.observe(target, now);
                }
                None => w.reject(id, now),
            },
            Assignment::Defer { road: target } => {
                if w.net.defer(id, target) {
                    w.metrics.on_deferred(target);
                } else {
                    w.reject(id, now);
                }
            }
            Assignment::Reject => w.reject(id, now),
        }

        trace!("VehicleArrival::execute 完成");
        Ok(())
    }
}
