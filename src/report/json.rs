use std::io::Write;

use serde::Serialize;

/// 以缩进格式写出任意可序列化的结果
pub fn write_summary_json<W: Write, T: Serialize + ?Sized>(
    w: &mut W,
    results: &T,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *w, results)?;
    w.write_all(b"\n").map_err(serde_json::Error::io)
}
