use serde::{Deserialize, Serialize};

use crate::road::LightState;

/// 一条道路在某一时刻的状态（供实时渲染层使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 仿真时间（毫秒，和 `SimTime.0` 同口径）
    pub t_ms: u64,
    pub road: usize,
    pub occupancy: u32,
    pub capacity: u32,
    pub light: LightState,
}

/// 一个简单的帧收集器（存内存，由引擎逐事件取走）
#[derive(Debug, Default)]
pub struct FrameLog {
    pub frames: Vec<Frame>,
}

impl FrameLog {
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn take(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }
}
