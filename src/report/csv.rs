use std::io::{self, Write};

use crate::dcf::NodeTrace;
use crate::experiment::{Aggregate, PlanResult};
use crate::phy::Physical80211;

pub const PACKET_TRACE_HEADER: &str = "NodeIndex,Time (s),Time (ms),Payload (bytes)";
pub const STATE_TRACE_HEADER: &str = "tick,state,stage,timer,sleep_stage";

/// 每个已发送数据包一行：发送成功时刻与载荷字节数
///
/// 第一列 `NodeIndex` 写入 `run_index`，多次运行的轨迹可以拼到同一个文件里。
pub fn write_packet_trace_csv<W: Write>(
    w: &mut W,
    trace: &NodeTrace,
    phy: &Physical80211,
    run_index: u64,
    with_header: bool,
) -> io::Result<()> {
    if with_header {
        writeln!(w, "{PACKET_TRACE_HEADER}")?;
    }
    let seconds_per_step = phy.seconds_per_step();
    for pkt in &trace.sent {
        let Some(done) = pkt.tx_success else {
            continue;
        };
        let secs = done as f64 * seconds_per_step;
        let bytes = u64::from(pkt.payload_steps) * phy.payload_bits / 8;
        writeln!(w, "{run_index},{secs},{},{bytes}", secs * 1000.0)?;
    }
    Ok(())
}

/// 一个分组的主节点轨迹：分组内每个计划的每次运行各一段，没有轨迹的运行跳过
pub fn write_group_trace_csv<W: Write>(
    w: &mut W,
    plans: &[&PlanResult],
    phy: &Physical80211,
) -> io::Result<()> {
    writeln!(w, "{PACKET_TRACE_HEADER}")?;
    for plan in plans {
        for run in &plan.runs {
            let Some(trace) = run.main().and_then(|m| m.trace.as_ref()) else {
                continue;
            };
            write_packet_trace_csv(w, trace, phy, run.run_index, false)?;
        }
    }
    Ok(())
}

/// 逐步状态：`tick,state,stage,timer,sleep_stage`，非退避/发送状态的 stage 留空
pub fn write_state_trace_csv<W: Write>(w: &mut W, trace: &NodeTrace) -> io::Result<()> {
    writeln!(w, "{STATE_TRACE_HEADER}")?;
    for (tick, rec) in trace.states.iter().enumerate() {
        let stage = rec.state.stage().map(|s| s.to_string()).unwrap_or_default();
        writeln!(
            w,
            "{tick},{},{stage},{},{}",
            rec.state.kind().name(),
            rec.state.timer(),
            rec.sleep_stage
        )?;
    }
    Ok(())
}

/// 每个字段一个区块，区块内每个分组一行，列为该分组各计划（按 index 排序）的均值
pub fn write_aggregate_csv<W: Write>(
    w: &mut W,
    groups: &[(&str, Vec<&PlanResult>)],
) -> io::Result<()> {
    for field in Aggregate::FIELDS {
        writeln!(w, "{field}")?;
        for (group, plans) in groups {
            let mut plans = plans.clone();
            plans.sort_by_key(|p| p.index);
            write!(w, "{group}")?;
            for plan in plans {
                let value = plan.aggregate.field(field).unwrap_or_default();
                write!(w, ",{value}")?;
            }
            writeln!(w)?;
        }
        writeln!(w)?;
    }
    Ok(())
}
