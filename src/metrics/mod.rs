//! 拥堵、吞吐与等待时间统计

mod collector;
mod snapshot;

pub use collector::{HIGH_CONGESTION, MetricsCollector};
pub use snapshot::{CongestionSample, MetricsSnapshot, RoadSummary, TimeBucket};
