use clap::Parser;
use dcfsim_rs::dcf::{DcfNode, NodeSeed, StateKind};
use dcfsim_rs::phy::{NetworkType, Physical80211};
use dcfsim_rs::report;
use dcfsim_rs::sim::{ChannelObserver, ChannelSimulator, NodeId, TickOutcome};
use dcfsim_rs::traffic::TrafficKind;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "trace-node",
    about = "Trace one DCF node tick by tick against optional competitors"
)]
struct Args {
    #[arg(long, value_parser = TrafficKind::parse, default_value = "constant-stream")]
    preset: TrafficKind,

    /// Competing node preset; defaults to the traced preset
    #[arg(long, value_parser = TrafficKind::parse)]
    competing: Option<TrafficKind>,

    /// Number of competing nodes
    #[arg(long, default_value_t = 0)]
    nodes: u32,

    #[arg(long, value_parser = NetworkType::parse, default_value = "b")]
    network: NetworkType,

    #[arg(long, default_value_t = 1500)]
    payload_bytes: u32,

    /// Incoming traffic per node in Mbit/s
    #[arg(long, default_value_t = 0.5)]
    arrival_mbps: f64,

    #[arg(long, default_value_t = 0.1)]
    threshold: f64,

    #[arg(long, default_value_t = 2000)]
    steps: u64,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    seed: i64,

    /// Output per-tick state CSV of the traced node
    #[arg(long)]
    state_csv: Option<PathBuf>,

    /// Output sent-packet CSV of the traced node
    #[arg(long)]
    packet_csv: Option<PathBuf>,

    /// Output the traced node's result (with full trace) as JSON
    #[arg(long)]
    result_json: Option<PathBuf>,
}

/// 统计被追踪节点在各状态停留的步数
#[derive(Debug)]
struct Occupancy {
    traced: NodeId,
    by_state: HashMap<StateKind, u64>,
}

impl ChannelObserver for Occupancy {
    fn on_tick(&mut self, _outcome: &TickOutcome, nodes: &[DcfNode]) {
        if let Some(node) = nodes.get(self.traced.0) {
            *self.by_state.entry(node.state().kind()).or_default() += 1;
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let phy = Physical80211::from_payload_bytes(args.network, args.payload_bytes);
    let bps = args.arrival_mbps * 1e6;
    let main_profile = args
        .preset
        .preset(&phy, bps)
        .ok_or_else(|| format!("{} has no preset", args.preset.name()))?;
    let competing_kind = args.competing.unwrap_or(args.preset);
    let competing_profile = competing_kind
        .preset(&phy, bps)
        .ok_or_else(|| format!("{} has no preset", competing_kind.name()))?;

    let mut sim = ChannelSimulator::new(phy).with_name("trace", "trace", 0);
    let main = DcfNode::new(
        format!("main{}-1", args.preset.name()),
        main_profile,
        NodeSeed::for_run(args.seed, 0, 0),
    )?
    .with_quality_threshold(args.threshold)
    .with_trace(true);
    let traced = sim.add_node(main);

    for i in 1..=args.nodes {
        let node = DcfNode::new(
            format!("node{}-{i}", competing_kind.name()),
            competing_profile.clone(),
            NodeSeed::for_run(args.seed, 0, u64::from(i)),
        )?
        .with_quality_threshold(args.threshold);
        sim.add_node(node);
    }

    let mut occupancy = Occupancy {
        traced,
        by_state: HashMap::new(),
    };
    let result = sim.run_steps_with(args.steps, &mut occupancy);
    let main = result.main().ok_or("no traced node")?;

    println!(
        "node name={} sent={} unsent={} over_threshold={} collisions={} datarate_mbps={:.4}",
        main.name,
        main.packets_sent,
        main.packets_unsent,
        main.packets_over_threshold,
        main.collisions,
        main.datarate_mbps(),
    );
    let mut kinds: Vec<_> = occupancy.by_state.into_iter().collect();
    kinds.sort_by_key(|(kind, _)| kind.name());
    for (kind, ticks) in kinds {
        println!("state name={} ticks={ticks}", kind.name());
    }
    println!(
        "channel ticks={} idle={} busy={} collisions={}",
        result.channel.ticks,
        result.channel.idle_ticks,
        result.channel.busy_ticks,
        result.channel.collision_ticks
    );

    let trace = main.trace.clone().unwrap_or_default();
    if let Some(path) = &args.state_csv {
        let mut w = BufWriter::new(File::create(path)?);
        report::write_state_trace_csv(&mut w, &trace)?;
        w.flush()?;
        eprintln!("wrote state trace to {}", path.display());
    }
    if let Some(path) = &args.packet_csv {
        let mut w = BufWriter::new(File::create(path)?);
        report::write_packet_trace_csv(&mut w, &trace, &phy, 0, true)?;
        w.flush()?;
        eprintln!("wrote packet trace to {}", path.display());
    }
    if let Some(path) = &args.result_json {
        let mut w = BufWriter::new(File::create(path)?);
        report::write_summary_json(&mut w, main)?;
        w.flush()?;
        eprintln!("wrote result to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("trace-node: {err}");
            ExitCode::FAILURE
        }
    }
}
