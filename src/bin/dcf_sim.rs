use clap::Parser;
use dcfsim_rs::experiment::{
    ExperimentError, ExperimentResults, ExperimentRunner, ExperimentSpec, NodeGroupSpec, SweepMode,
};
use dcfsim_rs::phy::NetworkType;
use dcfsim_rs::report;
use dcfsim_rs::traffic::TrafficKind;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dcf-sim",
    about = "Run an 802.11 DCF channel contention experiment"
)]
struct Args {
    /// Path to experiment.json; overrides the single-scenario flags below
    #[arg(long)]
    experiment: Option<PathBuf>,

    /// Main node traffic preset (SkypeVideo, YouTube, BitTorrent, WebBrowsing, ConstantStream)
    #[arg(long, value_parser = TrafficKind::parse, default_value = "youtube")]
    preset: TrafficKind,

    /// Competing node traffic preset; defaults to the main preset
    #[arg(long, value_parser = TrafficKind::parse)]
    competing: Option<TrafficKind>,

    /// Number of competing nodes
    #[arg(long, default_value_t = 0)]
    nodes: u32,

    /// 802.11 variant: fhss, dhss, b, a, g-short, g-long, n24, n50, ac
    #[arg(long, value_parser = NetworkType::parse, default_value = "b")]
    network: NetworkType,

    /// Nominal payload size in bytes (one simulation step)
    #[arg(long, default_value_t = 1500)]
    payload_bytes: u32,

    /// Incoming traffic per node in Mbit/s
    #[arg(long, default_value_t = 0.5)]
    arrival_mbps: f64,

    /// Quality threshold in seconds
    #[arg(long, default_value_t = 0.1)]
    threshold: f64,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 32.0)]
    seconds: f64,

    /// Explicit step count (overrides --seconds)
    #[arg(long)]
    steps: Option<u64>,

    /// RNG seed; negative means non-reproducible
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    seed: i64,

    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// Output summary JSON file
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Output per-group aggregate CSV file
    #[arg(long)]
    overview_csv: Option<PathBuf>,

    /// Directory for main-node packet traces, one trace-<group>.csv per plan group
    #[arg(long)]
    trace_dir: Option<PathBuf>,

    /// Write summary.json, overview.csv and the trace-<group>.csv files into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn scenario_from_args(args: &Args) -> ExperimentSpec {
    let mut main = NodeGroupSpec::new(args.preset, 1, 1);
    main.arrival_bps = args.arrival_mbps * 1e6;
    main.quality_threshold = args.threshold;

    let mut competing = NodeGroupSpec::new(
        args.competing.unwrap_or(args.preset),
        args.nodes,
        args.nodes,
    );
    competing.arrival_bps = main.arrival_bps;
    competing.quality_threshold = args.threshold;

    let mut spec = ExperimentSpec::single(args.network, main);
    spec.mode = SweepMode::Cartesian;
    spec.competing = vec![competing];
    spec.payload_bytes = args.payload_bytes;
    spec.seconds = args.seconds;
    spec.steps = args.steps;
    spec.seed = args.seed;
    spec.repetitions = args.repetitions;
    spec.keep_trace = args.trace_dir.is_some() || args.out_dir.is_some();
    spec
}

fn write_outputs(args: &Args, results: &ExperimentResults) -> Result<(), ExperimentError> {
    let mut summary = args.summary_json.clone();
    let mut overview = args.overview_csv.clone();
    let mut trace_dir = args.trace_dir.clone();
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
        summary.get_or_insert_with(|| dir.join("summary.json"));
        overview.get_or_insert_with(|| dir.join("overview.csv"));
        trace_dir.get_or_insert_with(|| dir.clone());
    }

    if let Some(path) = &summary {
        let mut w = create(path)?;
        report::write_summary_json(&mut w, results)?;
        w.flush()?;
        eprintln!("wrote summary to {}", path.display());
    }
    if let Some(path) = &overview {
        let mut w = create(path)?;
        report::write_aggregate_csv(&mut w, &results.groups())?;
        w.flush()?;
        eprintln!("wrote overview to {}", path.display());
    }
    if let Some(dir) = &trace_dir {
        let phy = dcfsim_rs::phy::Physical80211::new(results.network, results.payload_bits);
        for (group, plans) in results.groups() {
            let path = dir.join(format!("trace-{group}.csv"));
            let mut w = create(&path)?;
            report::write_group_trace_csv(&mut w, &plans, &phy)?;
            w.flush()?;
            eprintln!("wrote packet trace to {}", path.display());
        }
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExperimentError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn run(args: &Args) -> Result<(), ExperimentError> {
    let spec = match &args.experiment {
        Some(path) => ExperimentSpec::from_path(path)?,
        None => scenario_from_args(args),
    };
    let runner = ExperimentRunner::new(spec)?;
    let results = runner.run()?;

    for plan in &results.plans {
        let agg = &plan.aggregate;
        println!(
            "plan name={} group={} index={} runs={} datarate_mbps={:.4} over_threshold={:.1} unsent={:.1} sent={:.1}",
            plan.name,
            plan.group,
            plan.index,
            agg.runs,
            agg.datarate / 1e6,
            agg.packets_over_threshold,
            agg.packets_unsent,
            agg.packets_sent,
        );
    }

    write_outputs(args, &results)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
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
            eprintln!("dcf-sim: {err}");
            ExitCode::FAILURE
        }
    }
}
