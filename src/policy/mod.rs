//! 交通管理策略
//!
//! 车辆到达时由策略决定驶入哪条道路、进入等候区还是被拒绝。
//! 策略只读路网状态，不修改它；引擎根据返回的 `Assignment` 执行。

mod balanced;
mod knapsack;

pub use balanced::BalancedPolicy;
pub use knapsack::KnapsackPolicy;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::road::{Road, RoadId, RoadNetwork, Vehicle};
use crate::sim::SimTime;

/// 策略的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// 驶入 `road`；`estimated_departure` 为按当前拥堵估算的驶离时刻（不考虑信号灯）
    Accept {
        road: RoadId,
        estimated_departure: SimTime,
    },
    /// 所有候选道路满载，进入 `road` 的等候区
    Defer { road: RoadId },
    /// 无处可去：车辆损失，计入拒绝数（不是错误）
    Reject,
}

/// 准入策略
pub trait AdmissionPolicy: Send + fmt::Debug {
    fn kind(&self) -> PolicyKind;

    /// `candidates` 按道路 id 升序给出。
    fn decide(
        &mut self,
        vehicle: &Vehicle,
        candidates: &[RoadId],
        net: &RoadNetwork,
        now: SimTime,
    ) -> Assignment;
}

/// 策略选择
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// 容量约束下的背包式最优分配
    #[default]
    Knapsack,
    /// 均衡分配（最小拥堵率，轮转打破平局）
    Balanced,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn AdmissionPolicy> {
        match self {
            PolicyKind::Knapsack => Box::new(KnapsackPolicy),
            PolicyKind::Balanced => Box::new(BalancedPolicy::default()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Knapsack => f.write_str("knapsack"),
            PolicyKind::Balanced => f.write_str("balanced"),
        }
    }
}

fn accept(road: &Road, now: SimTime) -> Assignment {
    Assignment::Accept {
        road: road.id,
        estimated_departure: now.saturating_add(road.travel_time()),
    }
}
