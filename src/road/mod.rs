//! 路网模型
//!
//! 此模块包含道路、路口信号灯、车辆、路网状态，以及驱动它们的三类事件。

// 子模块声明
mod arrival;
mod departure;
mod id;
mod intersection;
mod network;
mod phase_change;
mod road;
mod traffic_world;
mod vehicle;

// 重新导出公共接口
pub use arrival::VehicleArrival;
pub use departure::VehicleDeparture;
pub use id::{IntersectionId, RoadId, VehicleId};
pub use intersection::{Intersection, LightState, Phase, PhaseTiming};
pub use network::{DISCHARGE_HEADWAY, DepartOutcome, Entry, RoadNetwork};
pub use phase_change::LightPhaseChange;
pub use road::{MIN_SPEED_FACTOR, Road};
pub use traffic_world::TrafficWorld;
pub use vehicle::Vehicle;
