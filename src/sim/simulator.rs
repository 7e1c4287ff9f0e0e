//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use thiserror::Error;
use tracing::{debug, info, trace};

/// 调度错误：说明事件生成方（信号灯/车辆生成器/策略）存在缺陷，属于致命错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("cannot schedule event at {at:?}: current time is already {now:?}")]
    PastTimestamp { at: SimTime, now: SimTime },
}

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未派发的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行；时间早于当前时刻则返回错误。
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> Result<(), SchedulingError> {
        if at < self.now {
            return Err(SchedulingError::PastTimestamp { at, now: self.now });
        }
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });

        debug!(queue_size = self.q.len(), "事件已加入队列");
        Ok(())
    }

    /// 弹出下一个不晚于 `until` 的事件并把当前时间推进到它的时间戳。
    ///
    /// 队列为空或下一个事件晚于 `until` 时返回 `None`，并把时间推进到 `until`。
    pub fn advance(&mut self, until: SimTime) -> Option<ScheduledEvent> {
        let due = self.q.peek().is_some_and(|top| top.at <= until);
        if !due {
            self.now = self.now.max(until);
            return None;
        }
        let item = self.q.pop()?;
        self.now = item.at;
        Some(item)
    }

    /// 执行一个已弹出的事件，并通知世界。
    pub fn dispatch(
        &mut self,
        item: ScheduledEvent,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError> {
        let record = item.record();
        trace!(?record, remaining_queue = self.q.len(), "执行事件");
        item.ev.execute(self, world)?;
        world.on_dispatch(self, &record);
        Ok(())
    }

    /// 运行直到事件队列为空或到达 `until`。
    pub fn run_until(
        &mut self,
        until: SimTime,
        world: &mut dyn World,
    ) -> Result<(), SchedulingError> {
        while let Some(item) = self.advance(until) {
            self.dispatch(item, world)?;
        }
        Ok(())
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) -> Result<(), SchedulingError> {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut event_count = 0u64;
        while let Some(item) = self.q.pop() {
            event_count += 1;
            self.now = item.at;
            self.dispatch(item, world)?;
        }

        info!(
            total_events = event_count,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
        Ok(())
    }

    /// 丢弃队列中剩余的全部事件（不执行），返回丢弃的数量。
    pub fn drain(&mut self) -> usize {
        let n = self.q.len();
        self.q.clear();
        debug!(drained = n, "清空剩余事件");
        n
    }
}
