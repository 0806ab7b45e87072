use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "dcfsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.split_whitespace()
        .find_map(|kv| kv.strip_prefix(key)?.strip_prefix('='))
}

#[test]
fn trace_node_writes_state_packet_and_result_files() {
    let dir = unique_temp_dir("trace-node");
    let states = dir.join("states.csv");
    let packets = dir.join("packets.csv");
    let result = dir.join("result.json");

    let output = Command::new(env!("CARGO_BIN_EXE_trace_node"))
        .args([
            "--preset",
            "cs",
            "--nodes",
            "2",
            "--arrival-mbps",
            "2",
            "--steps",
            "300",
            "--seed",
            "5",
            "--state-csv",
            states.to_str().unwrap(),
            "--packet-csv",
            packets.to_str().unwrap(),
            "--result-json",
            result.to_str().unwrap(),
        ])
        .output()
        .expect("run trace_node");
    assert!(
        output.status.success(),
        "trace_node failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let node_line = stdout
        .lines()
        .find(|l| l.starts_with("node "))
        .expect("node summary line");
    assert_eq!(field(node_line, "name"), Some("mainConstantStream-1"));
    let sent: u64 = field(node_line, "sent")
        .and_then(|s| s.parse().ok())
        .expect("sent count");

    let state_ticks: u64 = stdout
        .lines()
        .filter(|l| l.starts_with("state "))
        .filter_map(|l| field(l, "ticks")?.parse::<u64>().ok())
        .sum();
    assert_eq!(state_ticks, 300);

    let channel = stdout
        .lines()
        .find(|l| l.starts_with("channel "))
        .expect("channel line");
    assert_eq!(field(channel, "ticks"), Some("300"));

    let state_csv = fs::read_to_string(&states).expect("read states.csv");
    let mut lines = state_csv.lines();
    assert_eq!(lines.next(), Some("tick,state,stage,timer,sleep_stage"));
    assert_eq!(lines.count(), 300);

    let packet_csv = fs::read_to_string(&packets).expect("read packets.csv");
    assert_eq!(packet_csv.lines().count() as u64, sent + 1);

    let raw = fs::read_to_string(&result).expect("read result.json");
    let v: Value = serde_json::from_str(&raw).expect("parse result.json");
    assert_eq!(v["packets_sent"].as_u64(), Some(sent));
    assert_eq!(v["kind"].as_str(), Some("constant_stream"));
    assert_eq!(
        v["trace"]["states"].as_array().map(|s| s.len()),
        Some(300)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn trace_node_rejects_unknown_preset() {
    let output = Command::new(env!("CARGO_BIN_EXE_trace_node"))
        .args(["--preset", "telnet"])
        .output()
        .expect("run trace_node");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown traffic kind"), "stderr={stderr}");
}
