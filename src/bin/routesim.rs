//! 路由仿真命令行
//!
//! 在预置拓扑上按所选策略逐步推进仿真，打印每步事件日志与统计

use clap::Parser;
use routesim_rs::algorithm::RoutingAlgorithm;
use routesim_rs::net::Topology;
use routesim_rs::sim::{DEFAULT_UNDO_DEPTH, SimOpts, Simulation, Stats};
use routesim_rs::topo::TopologyPreset;
use routesim_rs::topo::grid::{GridOpts, build_grid};
use routesim_rs::topo::line::{LineOpts, build_line};
use routesim_rs::topo::mesh::{MeshOpts, build_mesh};
use routesim_rs::topo::ring::{RingOpts, build_ring};
use routesim_rs::topo::star::{StarOpts, build_star};
use routesim_rs::viz::VizLogger;
use routesim_rs::{Result, SimError};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "routesim", about = "逐步推进的路由仿真：洪泛 / 随机路径 / 最短路径")]
struct Args {
    /// 拓扑形状：line, ring, star, grid, mesh
    #[arg(long, default_value = "line")]
    topology: TopologyPreset,

    /// 路由器数量（grid 以外的形状）
    #[arg(long, default_value_t = 4)]
    routers: usize,

    /// 网格列数
    #[arg(long, default_value_t = 3)]
    width: usize,

    /// 网格行数
    #[arg(long, default_value_t = 3)]
    height: usize,

    /// 路由策略：flooding, random-path, shortest-path
    #[arg(long, default_value = "shortest-path")]
    algorithm: RoutingAlgorithm,

    /// 每隔多少步注入一个包
    #[arg(long, default_value_t = 1)]
    rate: u64,

    /// 随机数种子
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// 前进步数
    #[arg(long, default_value_t = 10)]
    steps: u64,

    /// 前进之后再撤销的步数
    #[arg(long, default_value_t = 0)]
    undo: u64,

    /// 最多可撤销的步数
    #[arg(long, default_value_t = DEFAULT_UNDO_DEPTH)]
    undo_depth: usize,

    /// Output viz JSON file
    #[arg(long)]
    viz_json: Option<PathBuf>,

    /// 只输出警告及以上日志
    #[arg(long)]
    quiet: bool,
}

fn build_topology(args: &Args) -> Result<Topology> {
    let mut topology = Topology::new();
    match args.topology {
        TopologyPreset::Line => {
            build_line(&mut topology, &LineOpts { routers: args.routers })?;
        }
        TopologyPreset::Ring => {
            build_ring(&mut topology, &RingOpts { routers: args.routers })?;
        }
        TopologyPreset::Star => {
            build_star(&mut topology, &StarOpts { routers: args.routers })?;
        }
        TopologyPreset::Mesh => {
            build_mesh(&mut topology, &MeshOpts { routers: args.routers })?;
        }
        TopologyPreset::Grid => {
            build_grid(
                &mut topology,
                &GridOpts {
                    width: args.width,
                    height: args.height,
                },
            )?;
        }
    }
    Ok(topology)
}

fn run(args: &Args) -> Result<()> {
    let mut sim = Simulation::new(&SimOpts {
        rate: args.rate,
        seed: args.seed,
        undo_depth: args.undo_depth,
    })?;
    let (_, rx) = sim.subscribe();

    sim.set_topology(build_topology(args)?);
    sim.set_routing_algorithm(args.algorithm);
    if !sim.is_ready() {
        return Err(SimError::NotReady);
    }

    let mut viz = args.viz_json.as_ref().map(|_| VizLogger::default());
    if let Some(v) = &mut viz {
        v.emit_meta(&sim);
    }
    // 元信息之前的配置通知不进入回放
    rx.try_iter().for_each(drop);

    let mut stats = Stats::with_history(args.undo_depth);
    info!(
        topology = %args.topology,
        routers = sim.topology().len(),
        edges = sim.topology().edge_count(),
        algorithm = %args.algorithm,
        "▶️  开始运行仿真"
    );

    for _ in 0..args.steps {
        let result = sim.step()?;
        println!("{result}");
    }
    for _ in 0..args.undo {
        if !sim.undo_step() {
            break;
        }
        println!("Undo -> step {}", sim.step_number());
    }

    for n in rx.try_iter() {
        stats.observe(&n);
        if let Some(v) = &mut viz {
            v.observe(&n);
        }
    }

    println!(
        "done @ step {}, injected_pkts={}, delivered_pkts={}, dropped_pkts={}, transmitted_pkts={}, in_flight={}",
        sim.step_number(),
        stats.injected_pkts,
        stats.delivered_pkts,
        stats.dropped_pkts,
        stats.transmitted_pkts,
        sim.topology().packet_count()
    );
    for (src, dst, avg) in stats.average_hops_table() {
        println!("avg_hops {src} -> {dst}: {avg:.3}");
    }

    if let (Some(path), Some(v)) = (&args.viz_json, viz) {
        let json = serde_json::to_string_pretty(&v.events).expect("serialize viz events");
        fs::write(path, json).expect("write viz json");
        eprintln!("wrote viz events to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    // 初始化 tracing
    let default_level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
