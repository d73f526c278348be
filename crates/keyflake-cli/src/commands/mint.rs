use std::io::Write;

use keyflake::{IdMinter, RecordId, SnowflakeGenerator};
use tracing::info;

pub fn run<G, W>(minter: &IdMinter<G>, count: usize, out: &mut W) -> anyhow::Result<()>
where
    G: SnowflakeGenerator<RecordId>,
    W: Write,
{
    for _ in 0..count {
        writeln!(out, "{}", minter.next_id()?)?;
    }
    info!(
        count,
        machine_id = minter.machine_id(),
        rollback = ?minter.rollback_policy(),
        "minted identifiers"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use keyflake::{MinterConfig, RollbackPolicy};

    use super::*;

    #[test]
    fn writes_one_increasing_id_per_line() {
        let minter = IdMinter::from_config(&MinterConfig {
            machine_id: 9,
            rollback: RollbackPolicy::Reject,
            ..MinterConfig::default()
        })
        .unwrap();

        let mut out = Vec::new();
        run(&minter, 100, &mut out).unwrap();

        let ids: Vec<RecordId> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| line.parse().unwrap())
            .collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| id.machine_id() == 9));
    }
}
