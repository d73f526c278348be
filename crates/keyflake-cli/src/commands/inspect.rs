use std::io::Write;

use anyhow::Context;
use keyflake::{RecordId, base32::Base32Ext};
use serde_json::json;

/// Parses `raw` as a decimal identifier, falling back to its base32 form.
pub fn parse_id(raw: &str) -> anyhow::Result<RecordId> {
    let raw = raw.trim();
    match raw.parse::<RecordId>() {
        Ok(id) => Ok(id),
        Err(decimal) => <RecordId as Base32Ext>::decode(raw)
            .with_context(|| format!("{raw:?} is not an identifier ({decimal})")),
    }
}

pub fn run<W: Write>(raw: &str, epoch_ms: u64, out: &mut W) -> anyhow::Result<()> {
    let id = parse_id(raw)?;
    let fields = json!({
        "id": id.to_string(),
        "timestamp": id.timestamp(),
        "unix_ms": id.unix_millis(epoch_ms),
        "machine_id": id.machine_id(),
        "sequence": id.sequence(),
        "base32": Base32Ext::encode(&id),
    });
    serde_json::to_writer_pretty(&mut *out, &fields)?;
    writeln!(out)?;
    Ok(())
}
