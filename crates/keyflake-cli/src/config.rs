use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use keyflake::{
    Cursor, MinterConfig, PageSize, RecordId, RollbackPolicy, SnowflakeId, SortDirection,
    page::ValueKind,
};

/// Runtime configuration for the `keyflake` binary.
///
/// Every setting can come from a flag or from the environment (a `.env` file
/// is loaded first), so the same binary can inspect IDs minted by any
/// deployment by pointing it at that deployment's epoch.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "keyflake",
    version,
    about = "Mint record IDs, encode cursors, and page through sorted collections"
)]
pub struct CliArgs {
    /// Machine ID packed into minted IDs.
    ///
    /// Must be unique among running processes that share an epoch, and fit
    /// the 10-bit machine field.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, global = true, env = "MACHINE_ID", default_value_t = 2)]
    pub machine_id: u64,

    /// Epoch of the timestamp field, in milliseconds since the Unix epoch.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, global = true, env = "EPOCH_MS", default_value_t = 1_700_000_000_000)]
    pub epoch_ms: u64,

    /// What to do when the wall clock moves backward.
    ///
    /// Environment variable: `ROLLBACK_POLICY`
    #[arg(long, global = true, env = "ROLLBACK_POLICY", value_enum, default_value_t = RollbackMode::Stall)]
    pub rollback_policy: RollbackMode,

    /// Longest backward clock step `stall` waits through before failing.
    ///
    /// Environment variable: `MAX_ROLLBACK_MS`
    #[arg(long, global = true, env = "MAX_ROLLBACK_MS", default_value_t = 5_000)]
    pub max_rollback_ms: u64,

    /// Generator implementation.
    ///
    /// Environment variable: `GENERATOR`
    #[arg(long, global = true, env = "GENERATOR", value_enum, default_value_t = GeneratorKind::Lock)]
    pub generator: GeneratorKind,

    /// Rows per page for `page`.
    ///
    /// Environment variable: `PAGE_SIZE`
    #[arg(long, global = true, env = "PAGE_SIZE", default_value_t = 50)]
    pub page_size: usize,

    /// Emit logs as JSON lines instead of human-readable text.
    ///
    /// Environment variable: `LOG_JSON`
    #[arg(long = "json", global = true, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mint identifiers, one per line.
    Mint {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Print the fields of an identifier as JSON.
    ///
    /// Accepts the decimal form or the 13-character base32 form.
    Inspect { id: String },

    /// Encode or decode pagination cursors.
    Cursor {
        #[command(subcommand)]
        action: CursorCommand,
    },

    /// Page through a JSON array of documents.
    Page {
        /// File holding a JSON array of objects, each with an `_id`.
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        sort_field: String,

        #[arg(long, default_value_t = SortDirection::Descending)]
        direction: SortDirection,

        /// Resume after this cursor token.
        #[arg(long, conflicts_with = "last_id")]
        cursor: Option<Cursor>,

        /// Resume after the document with this identifier.
        #[arg(long)]
        last_id: Option<RecordId>,

        /// Equality conditions, `field=value`. Repeatable.
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        conditions: Vec<String>,

        /// Return every matching document on one page.
        #[arg(long)]
        unbounded: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CursorCommand {
    Encode {
        #[arg(long)]
        value_kind: ValueKind,
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        #[arg(long)]
        id: RecordId,
    },
    Decode { token: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackMode {
    Stall,
    Reject,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Lock,
    Atomic,
}

/// Validated settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub minter: MinterConfig,
    pub generator: GeneratorKind,
    pub page_size: PageSize,
    pub log_json: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let max_machine_id = RecordId::max_machine_id();
        if args.machine_id > max_machine_id {
            bail!(
                "MACHINE_ID ({}) exceeds the machine ID space (max = {})",
                args.machine_id,
                max_machine_id
            );
        }

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        if u128::from(args.epoch_ms) > now_ms {
            bail!("EPOCH_MS ({}) is in the future", args.epoch_ms);
        }

        let page_size = match &args.command {
            Command::Page { unbounded: true, .. } => PageSize::unbounded(),
            _ => match PageSize::new(args.page_size) {
                Ok(size) => size,
                Err(e) => bail!("PAGE_SIZE: {e}"),
            },
        };

        let rollback = match args.rollback_policy {
            RollbackMode::Stall => RollbackPolicy::Stall {
                max_ms: args.max_rollback_ms,
            },
            RollbackMode::Reject => RollbackPolicy::Reject,
        };

        Ok(Self {
            minter: MinterConfig {
                machine_id: args.machine_id,
                epoch_ms: args.epoch_ms,
                rollback,
            },
            generator: args.generator,
            page_size,
            log_json: args.log_json,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        let args = CliArgs::try_parse_from(std::iter::once("keyflake").chain(args.iter().copied()))?;
        Config::try_from(args)
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--machine-id",
            "7",
            "--rollback-policy",
            "reject",
            "--generator",
            "atomic",
            "mint",
            "-n",
            "3",
        ])
        .unwrap();
        assert_eq!(config.minter.machine_id, 7);
        assert_eq!(config.minter.rollback, RollbackPolicy::Reject);
        assert_eq!(config.generator, GeneratorKind::Atomic);
        assert!(matches!(config.command, Command::Mint { count: 3 }));
    }

    #[test]
    fn machine_id_must_fit() {
        let err = parse(&["--machine-id", "1024", "mint"]).unwrap_err();
        assert!(err.to_string().contains("MACHINE_ID"), "{err}");
    }

    #[test]
    fn future_epoch_is_rejected() {
        let err = parse(&["--epoch-ms", "99999999999999", "mint"]).unwrap_err();
        assert!(err.to_string().contains("future"), "{err}");
    }

    #[test]
    fn page_size_is_bounded_unless_explicitly_unbounded() {
        assert!(parse(&["--page-size", "0", "page", "--file", "x.json", "--sort-field", "f"]).is_err());
        assert!(parse(&["--page-size", "101", "page", "--file", "x.json", "--sort-field", "f"]).is_err());
        let config = parse(&[
            "page",
            "--file",
            "x.json",
            "--sort-field",
            "f",
            "--unbounded",
        ])
        .unwrap();
        assert!(config.page_size.is_unbounded());
    }

    #[test]
    fn cursor_and_last_id_conflict() {
        let token = keyflake::Cursor::new(keyflake::Value::Integer(1), RecordId::from(1, 0, 0)).encode();
        assert!(parse(&[
            "page",
            "--file",
            "x.json",
            "--sort-field",
            "f",
            "--cursor",
            &token,
            "--last-id",
            "5",
        ])
        .is_err());
    }

    #[test]
    fn cursor_encode_accepts_negative_values() {
        let config = parse(&[
            "cursor",
            "encode",
            "--value-kind",
            "integer",
            "--value",
            "-5",
            "--id",
            "42",
        ])
        .unwrap();
        let Command::Cursor {
            action: CursorCommand::Encode { value_kind, value, id },
        } = config.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(value_kind, ValueKind::Integer);
        assert_eq!(value, "-5");
        assert_eq!(id.to_u64(), 42);
    }
}
