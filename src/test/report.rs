use crate::dcf::{DcfNode, NodeSeed, NodeState, NodeTrace, Packet, TickRecord};
use crate::experiment::{Aggregate, PlanResult};
use crate::phy::{NetworkType, Physical80211};
use crate::report::{
    PACKET_TRACE_HEADER, STATE_TRACE_HEADER, write_aggregate_csv, write_group_trace_csv,
    write_packet_trace_csv, write_state_trace_csv, write_summary_json,
};
use crate::sim::{ChannelSimulator, ChannelStats, RunResult};
use crate::traffic::{PayloadDistribution, TrafficProfile};

fn sent_packet(id: u64, arrival: u64, done: u64, steps: u32) -> Packet {
    Packet {
        id,
        queue_arrival: arrival,
        tx_attempt: Some(arrival + 1),
        tx_success: Some(done),
        payload_steps: steps,
    }
}

#[test]
fn packet_trace_csv_reports_time_and_bytes() {
    let phy = Physical80211::from_payload_bytes(NetworkType::B, 1500);
    let trace = NodeTrace {
        states: Vec::new(),
        sent: vec![sent_packet(0, 0, 10, 2), sent_packet(1, 4, 20, 1)],
        queued: vec![Packet::new(2, 21, 1)],
    };

    let mut out = Vec::new();
    write_packet_trace_csv(&mut out, &trace, &phy, 3, true).expect("write csv");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], PACKET_TRACE_HEADER);
    let cols: Vec<_> = lines[1].split(',').collect();
    assert_eq!(cols[0], "3");
    let secs: f64 = cols[1].parse().expect("seconds");
    let millis: f64 = cols[2].parse().expect("millis");
    assert!((secs - 10.0 * phy.seconds_per_step()).abs() < 1e-12);
    assert!((millis - secs * 1000.0).abs() < 1e-9);
    assert_eq!(cols[3], "3000");
    assert!(lines[2].ends_with(",1500"));

    let mut no_header = Vec::new();
    write_packet_trace_csv(&mut no_header, &trace, &phy, 0, false).expect("write csv");
    assert_eq!(String::from_utf8(no_header).expect("utf8").lines().count(), 2);
}

#[test]
fn state_trace_csv_has_one_row_per_tick() {
    let trace = NodeTrace {
        states: vec![
            TickRecord {
                state: NodeState::Backoff { stage: 1, timer: 3 },
                sleep_stage: 0,
            },
            TickRecord {
                state: NodeState::Transmit {
                    stage: 1,
                    payload_timer: 1,
                },
                sleep_stage: 0,
            },
            TickRecord {
                state: NodeState::BufferEmpty { sleep_timer: 5 },
                sleep_stage: 1,
            },
        ],
        sent: Vec::new(),
        queued: Vec::new(),
    };

    let mut out = Vec::new();
    write_state_trace_csv(&mut out, &trace).expect("write csv");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            STATE_TRACE_HEADER,
            "0,backoff,1,3,0",
            "1,transmit,1,1,0",
            "2,buffer_empty,,5,1",
        ]
    );
}

fn plan(group: &str, index: u32, datarate: f64) -> PlanResult {
    PlanResult {
        name: format!("{group}-{index}"),
        group: group.to_string(),
        index,
        aggregate: Aggregate {
            runs: 1,
            datarate,
            packets_over_threshold: 1.5,
            packets_unsent: 0.0,
            packets_sent: 10.0,
        },
        runs: Vec::new(),
    }
}

#[test]
fn aggregate_csv_writes_one_block_per_field() {
    let p0 = plan("YouTube", 0, 100.0);
    let p1 = plan("YouTube", 1, 50.0);
    let q0 = plan("BitTorrent", 0, 75.5);
    let groups = vec![("YouTube", vec![&p1, &p0]), ("BitTorrent", vec![&q0])];

    let mut out = Vec::new();
    write_aggregate_csv(&mut out, &groups).expect("write csv");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines[0], "datarate");
    assert_eq!(lines[1], "YouTube,100,50");
    assert_eq!(lines[2], "BitTorrent,75.5");
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], "packets_over_threshold");
    assert_eq!(lines[5], "YouTube,1.5,1.5");
    assert_eq!(lines.len(), 4 * Aggregate::FIELDS.len());
}

#[test]
fn summary_json_is_pretty_and_parseable() {
    let stats = ChannelStats {
        ticks: 10,
        idle_ticks: 7,
        busy_ticks: 2,
        collision_ticks: 1,
        max_concurrent: 2,
    };
    let mut out = Vec::new();
    write_summary_json(&mut out, &stats).expect("write json");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains('\n'));

    let v: serde_json::Value = serde_json::from_str(&text).expect("parse json");
    assert_eq!(v.get("ticks").and_then(|t| t.as_u64()), Some(10));
    assert_eq!(v.get("collision_ticks").and_then(|t| t.as_u64()), Some(1));
}

fn traced_run(run_index: u64, main_packets: u64, other_packets: u64) -> RunResult {
    let profile = TrafficProfile {
        arrival_rate: 0.0,
        payload: PayloadDistribution::single(1500),
        min_sleep: 0,
        max_sleep: 0,
        ..TrafficProfile::default()
    };
    let mut sim = ChannelSimulator::new(Physical80211::from_payload_bytes(NetworkType::B, 1500))
        .with_name("p", "g", run_index);
    for (name, packets, seed) in [("main", main_packets, 1), ("other", other_packets, 2)] {
        let mut n = DcfNode::new(name, profile.clone(), NodeSeed::Fixed(seed + run_index))
            .expect("valid profile")
            .with_trace(true);
        for _ in 0..packets {
            n.enqueue_packet(1);
        }
        sim.add_node(n);
    }
    sim.run_steps(3_000)
}

#[test]
fn group_trace_csv_holds_only_main_node_rows_tagged_by_run() {
    let phy = Physical80211::from_payload_bytes(NetworkType::B, 1500);
    let mut p = plan("g", 0, 0.0);
    p.runs = vec![traced_run(0, 2, 5), traced_run(1, 3, 5)];
    let main_sent: Vec<u64> = p
        .runs
        .iter()
        .map(|r| r.main().expect("main").packets_sent)
        .collect();
    assert_eq!(main_sent, vec![2, 3]);

    let mut out = Vec::new();
    write_group_trace_csv(&mut out, &[&p], &phy).expect("write csv");
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines[0], PACKET_TRACE_HEADER);
    assert_eq!(lines.len(), 1 + 2 + 3);
    let runs: Vec<_> = lines[1..].iter().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(runs, vec!["0", "0", "1", "1", "1"]);
}
