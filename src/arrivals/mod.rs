//! 车辆到达过程

mod generator;
mod rate_profile;

pub use generator::VehicleGenerator;
pub use rate_profile::{PeakSegment, RateProfile};
