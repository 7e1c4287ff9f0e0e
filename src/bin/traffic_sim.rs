//! 交通流仿真
//!
//! 读取 JSON 配置（或使用内置的两条干道场景），运行到 horizon 并输出统计。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use trafsim_rs::config::SimConfig;
use trafsim_rs::engine::{SimError, Simulation};
use trafsim_rs::metrics::MetricsSnapshot;
use trafsim_rs::policy::PolicyKind;

#[derive(Debug, Parser)]
#[command(name = "traffic_sim", about = "交通流仿真：比较背包式与均衡式交通管理策略")]
struct Args {
    /// 配置文件（JSON）；缺省使用内置场景
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖配置中的策略
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,
    /// 覆盖随机种子
    #[arg(long)]
    seed: Option<u64>,
    /// 覆盖仿真时长（小时）
    #[arg(long)]
    hours: Option<f64>,
    /// 把最终统计写成 JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// 把帧流写成 JSON 数组
    #[arg(long)]
    frames_json: Option<PathBuf>,
    /// 用同一种子分别运行两种策略（两个线程）
    #[arg(long)]
    compare: bool,
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(policy) = args.policy {
        cfg.policy = policy;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if let Some(hours) = args.hours {
        cfg.time_window_hours = hours;
    }
    cfg.validate()?;

    let snapshots = if args.compare {
        let runs: Vec<Result<MetricsSnapshot, SimError>> = thread::scope(|s| {
            let handles: Vec<_> = [PolicyKind::Knapsack, PolicyKind::Balanced]
                .into_iter()
                .map(|policy| {
                    let mut cfg = cfg.clone();
                    cfg.policy = policy;
                    s.spawn(move || Simulation::new(&cfg)?.run())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("simulation thread panicked"))
                .collect()
        });
        runs.into_iter().collect::<Result<Vec<_>, _>>()?
    } else {
        let sim = Simulation::new(&cfg)?;
        let snapshot = match &args.frames_json {
            Some(path) => {
                let mut frames = sim.frames();
                let collected: Vec<_> = frames.by_ref().collect();
                fs::write(path, serde_json::to_vec(&collected)?)?;
                frames.finish()?
            }
            None => {
                let mut sim = sim;
                sim.run()?
            }
        };
        vec![snapshot]
    };

    for s in &snapshots {
        println!(
            "policy={} generated={} throughput={} rejected={} unfinished={} avg_wait_min={:.3} phase_changes={}",
            s.policy,
            s.generated,
            s.throughput,
            s.rejected,
            s.unfinished,
            s.average_wait_minutes,
            s.phase_changes
        );
    }

    if let Some(path) = &args.summary_json {
        let raw = match snapshots.as_slice() {
            [one] => serde_json::to_vec_pretty(one)?,
            many => serde_json::to_vec_pretty(many)?,
        };
        fs::write(path, raw)?;
    }
    Ok(())
}
