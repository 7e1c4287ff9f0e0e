//! 仿真引擎
//!
//! 由配置构建路网、策略和生成器，驱动事件循环直到 horizon。
//! 到达 horizon 后剩余事件被丢弃，不产生副作用，对应车辆计为未完成。

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::arrivals::{RateProfile, VehicleGenerator};
use crate::config::{ConfigError, SimConfig};
use crate::metrics::MetricsSnapshot;
use crate::policy::AdmissionPolicy;
use crate::road::{LightPhaseChange, RoadNetwork, TrafficWorld, VehicleArrival};
use crate::sim::{DispatchRecord, SchedulingError, SimTime, Simulator};
use crate::viz::Frame;

/// 仿真错误
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// 一次仿真运行
pub struct Simulation {
    sim: Simulator,
    world: TrafficWorld,
    horizon: SimTime,
    finished: bool,
}

impl Simulation {
    /// 按配置中的策略构建
    pub fn new(cfg: &SimConfig) -> Result<Self, SimError> {
        Self::with_policy(cfg, cfg.policy.build())
    }

    /// 使用给定的策略对象构建（配置中的 `policy` 被忽略）
    pub fn with_policy(
        cfg: &SimConfig,
        policy: Box<dyn AdmissionPolicy>,
    ) -> Result<Self, SimError> {
        cfg.validate()?;

        let net = RoadNetwork::from_config(cfg);
        let profile = RateProfile::from_config(cfg);
        let horizon = profile.horizon();
        let rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        let generator = VehicleGenerator::new(profile, rng, cfg.vehicle_weights.clone());
        let mut world = TrafficWorld::new(net, policy, generator, horizon);
        let mut sim = Simulator::default();

        for road in world.net.road_ids() {
            if let Some(at) = world.generator.next_arrival(road, SimTime::ZERO) {
                sim.schedule(at, VehicleArrival { road })?;
            }
        }
        for ix in world.net.intersections() {
            let at = ix.next_change_at();
            if at <= horizon {
                sim.schedule(at, LightPhaseChange { intersection: ix.id })?;
            }
        }

        info!(
            roads = world.net.roads().len(),
            intersections = world.net.intersections().len(),
            policy = %world.policy.kind(),
            seed = cfg.seed,
            horizon = ?horizon,
            "🛣️  仿真初始化完成"
        );

        Ok(Self {
            sim,
            world,
            horizon,
            finished: false,
        })
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.world.net
    }

    /// 开始记录派发的事件（用于回放与确定性比对）
    pub fn record_dispatches(&mut self) {
        self.world.record_dispatches();
    }

    pub fn dispatch_log(&self) -> &[DispatchRecord] {
        self.world.dispatch_log()
    }

    /// 派发下一个事件；到达 horizon 时清空队列并返回 None。
    pub fn step(&mut self) -> Result<Option<DispatchRecord>, SimError> {
        if self.finished {
            return Ok(None);
        }
        match self.sim.advance(self.horizon) {
            Some(item) => {
                let record = item.record();
                self.sim.dispatch(item, &mut self.world)?;
                Ok(Some(record))
            }
            None => {
                let drained = self.sim.drain();
                self.world.metrics.on_drained(drained);
                self.finished = true;
                debug!(drained, now = ?self.sim.now(), "到达 horizon");
                Ok(None)
            }
        }
    }

    /// 运行到 horizon 并返回最终统计
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<MetricsSnapshot, SimError> {
        info!("▶️  开始运行仿真");
        let mut events = 0u64;
        while self.step()?.is_some() {
            events += 1;
        }
        let snapshot = self.snapshot();
        info!(
            total_events = events,
            generated = snapshot.generated,
            throughput = snapshot.throughput,
            rejected = snapshot.rejected,
            unfinished = snapshot.unfinished,
            "✅ 仿真完成"
        );
        Ok(snapshot)
    }

    /// 当前时刻的统计快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.world.metrics.snapshot(self.sim.now(), &self.world.net)
    }

    /// 把仿真转成逐事件推进的帧流
    pub fn frames(mut self) -> Frames {
        self.world.enable_frames();
        let now = self.sim.now();
        for road in self.world.net.road_ids() {
            self.world.observe(road, now);
        }
        let buf = self.world.take_frames().into();
        Frames {
            sim: self,
            buf,
            error: None,
        }
    }
}

/// 惰性、有限的帧流；耗尽后用 `finish` 取得最终统计。
pub struct Frames {
    sim: Simulation,
    buf: VecDeque<Frame>,
    error: Option<SimError>,
}

impl Frames {
    /// 跑完剩余事件（丢弃未取的帧）并返回最终统计或运行中遇到的错误
    pub fn finish(mut self) -> Result<MetricsSnapshot, SimError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.sim.world.disable_frames();
        self.sim.run()
    }
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            if let Some(frame) = self.buf.pop_front() {
                return Some(frame);
            }
            if self.error.is_some() {
                return None;
            }
            match self.sim.step() {
                Ok(Some(_)) => self.buf.extend(self.sim.world.take_frames()),
                Ok(None) => return None,
                Err(err) => {
                    self.error = Some(err);
                    return None;
                }
            }
        }
    }
}
