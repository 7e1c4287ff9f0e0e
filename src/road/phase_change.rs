//! 信号灯相位切换事件

use super::departure::VehicleDeparture;
use super::id::IntersectionId;
use super::traffic_world::TrafficWorld;
use crate::sim::{Event, EventKind, SchedulingError, SimTime, Simulator, World};
use tracing::debug;

/// 事件：路口切换到下一相位，并安排再下一次切换。
#[derive(Debug)]
pub struct LightPhaseChange {
    pub intersection: IntersectionId,
}

impl Event for LightPhaseChange {
    fn kind(&self) -> EventKind {
        EventKind::LightPhaseChange {
            intersection: self.intersection.0,
        }
    }

    #[tracing::instrument(skip(self, sim, world), fields(intersection = self.intersection.0))]
    fn execute(
        self: Box<Self>,
        sim: &mut Simulator,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError> {
        let LightPhaseChange { intersection } = *self;
        let now = sim.now();
        let w = world
            .as_any_mut()
            .downcast_mut::<TrafficWorld>()
            .expect("world must be TrafficWorld");

        let (newly_green, duration) = w.net.advance_phase(intersection, now);
        w.metrics.on_phase_change();

        for &road in &newly_green {
            for (vehicle, departure) in w.net.release_stop_line(road, now) {
                sim.schedule(departure, VehicleDeparture { road, vehicle })?;
            }
        }

        let next = now.saturating_add(duration.max(SimTime(1)));
        if next <= w.horizon {
            sim.schedule(next, LightPhaseChange { intersection })?;
        }

        let roads: Vec<_> = w.net.intersection(intersection).roads().collect();
        for road in roads {
            w.observe(road, now);
        }
        debug!(
            phase = ?w.net.intersection(intersection).phase,
            released_roads = newly_green.len(),
            now = ?now,
            "🚦 信号灯切换"
        );
        Ok(())
    }
}
