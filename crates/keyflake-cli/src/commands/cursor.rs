use std::io::Write;

use keyflake::Cursor;
use serde_json::json;

use crate::config::CursorCommand;

pub fn run<W: Write>(action: &CursorCommand, out: &mut W) -> anyhow::Result<()> {
    match action {
        CursorCommand::Encode {
            value_kind,
            value,
            id,
        } => {
            let cursor = Cursor::new(value_kind.parse_value(value)?, *id);
            writeln!(out, "{}", cursor.encode())?;
        }
        CursorCommand::Decode { token } => {
            let cursor = Cursor::decode(token.trim())?;
            let fields = json!({
                "kind": cursor.value.kind().to_string(),
                "value": cursor.value.to_string(),
                "id": cursor.id.to_string(),
            });
            serde_json::to_writer_pretty(&mut *out, &fields)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
