//! 事件 trait
//!
//! 定义仿真事件接口以及派发记录。

use super::simulator::{SchedulingError, Simulator};
use super::time::SimTime;
use super::world::World;
use serde::{Deserialize, Serialize};

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移。
pub trait Event: Send + 'static {
    /// 事件种类及其负载（用于派发日志与确定性比对）
    fn kind(&self) -> EventKind;

    fn execute(
        self: Box<Self>,
        sim: &mut Simulator,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError>;
}

/// 事件种类，携带负载中的标识符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    VehicleArrival { road: usize },
    VehicleDeparture { road: usize, vehicle: u64 },
    LightPhaseChange { intersection: usize },
}

/// 一次事件派发的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub at: SimTime,
    pub seq: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}
