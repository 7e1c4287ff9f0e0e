//! 车辆驶离事件

use super::id::{RoadId, VehicleId};
use super::network::{DepartOutcome, Entry};
use super::traffic_world::TrafficWorld;
use crate::sim::{Event, EventKind, SchedulingError, Simulator, World};
use tracing::{debug, trace};

/// 事件：车辆行驶完毕，尝试通过路口离开道路。
///
/// 事件可能已过期（车辆被改为红灯等待），派发时检查后忽略。
#[derive(Debug)]
pub struct VehicleDeparture {
    pub road: RoadId,
    pub vehicle: VehicleId,
}

impl Event for VehicleDeparture {
    fn kind(&self) -> EventKind {
        EventKind::VehicleDeparture {
            road: self.road.0,
            vehicle: self.vehicle.0,
        }
    }

    #[tracing::instrument(skip(self, sim, world), fields(road = self.road.0, vehicle = self.vehicle.0))]
    fn execute(
        self: Box<Self>,
        sim: &mut Simulator,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError> {
        let VehicleDeparture { road, vehicle } = *self;
        let now = sim.now();
        let w = world
            .as_any_mut()
            .downcast_mut::<TrafficWorld>()
            .expect("world must be TrafficWorld");

        match w.net.depart(vehicle, road, now) {
            DepartOutcome::Departed(v) => {
                let base = w.net.road(road).base_travel;
                w.metrics.on_departed(&v, road, base, now);

                // 腾出的容量让给等候区
                for (next, entry) in w.net.admit_from_holding(road, now) {
                    w.metrics.on_admitted(road);
                    if let Entry::Moving { departure } = entry {
                        sim.schedule(departure, VehicleDeparture { road, vehicle: next.id })?;
                    }
                }
                w.observe(road, now);
            }
            DepartOutcome::Held => {
                debug!(now = ?now, "🔴 红灯，车辆停在停止线前");
            }
            DepartOutcome::Stale => {
                trace!("忽略过期的驶离事件");
            }
        }
        Ok(())
    }
}
