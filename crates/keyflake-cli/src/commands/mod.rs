mod cursor;
mod inspect;
mod mint;
mod page;

use std::{io::Write, time::Duration};

use keyflake::{AtomicSnowflakeGenerator, IdMinter, RecordId, SystemClock};

use crate::config::{Command, Config, GeneratorKind};

/// Runs the selected command, writing its output to `out`.
pub fn run<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    match &config.command {
        Command::Mint { count } => match config.generator {
            GeneratorKind::Lock => {
                let minter = IdMinter::from_config(&config.minter)?;
                mint::run(&minter, *count, out)
            }
            GeneratorKind::Atomic => {
                let clock = SystemClock::with_epoch(Duration::from_millis(config.minter.epoch_ms));
                let generator =
                    AtomicSnowflakeGenerator::<RecordId, _>::try_new(config.minter.machine_id, clock)?;
                let minter = IdMinter::new(generator, config.minter.rollback);
                mint::run(&minter, *count, out)
            }
        },
        Command::Inspect { id } => inspect::run(id, config.minter.epoch_ms, out),
        Command::Cursor { action } => cursor::run(action, out),
        Command::Page {
            file,
            sort_field,
            direction,
            cursor,
            last_id,
            conditions,
            ..
        } => {
            let args = page::PageArgs {
                sort_field,
                direction: *direction,
                cursor: cursor.as_ref(),
                last_id: *last_id,
                conditions,
                size: config.page_size,
            };
            let text = std::fs::read_to_string(file)
                .map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?;
            page::run(&text, &args, out)
        }
    }
}
