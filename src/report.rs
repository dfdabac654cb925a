//! The run's human-readable output stream. Every byte string is printed as
//! lowercase hex with no separators, and the line shapes stay stable so a
//! harness can parse them.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::converge::{Checkpoint, Convergence, Outcome};
use crate::engine::{BatchStats, StageOneResult};
use crate::sha2::ChainHash;

pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn preamble(&mut self, cfg: &SearchConfig) -> io::Result<()> {
        writeln!(
            self.out,
            "vow partial collision search on {} (n={}, k={})",
            cfg.hash.name(),
            cfg.collision_len,
            cfg.dp_len,
        )?;
        writeln!(self.out, "prefix: {}", hex::encode(&cfg.prefix))?;
        writeln!(self.out, "suffix: {}", hex::encode(&cfg.suffix))?;
        writeln!(
            self.out,
            "workers: {}  batch: {}  dp capacity: {}  seed: {}",
            cfg.workers, cfg.batch_size, cfg.dp_capacity, cfg.seed_base,
        )
    }

    pub fn batch_header(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "{b:>9} {h:>16} {p:>10} {m:>5} {d:>5}",
            b = "batch",
            h = "hashes",
            p = "points",
            m = "max",
            d = "drop",
        )
    }

    pub fn batch(&mut self, stats: &BatchStats) -> io::Result<()> {
        writeln!(
            self.out,
            "{b:>9} {h:>16} {p:>10} {m:>5} {d:>5}",
            b = stats.batch,
            h = stats.total_hashes,
            p = stats.distinct_points,
            m = stats.max_worker_points,
            d = stats.dropped_points,
        )
    }

    pub fn stage_one(&mut self, result: &StageOneResult) -> io::Result<()> {
        writeln!(self.out, "distinguished point collided: {}", hex::encode(&result.dp))?;
        writeln!(
            self.out,
            "x ({} steps before): {}",
            result.x_steps,
            hex::encode(&result.x)
        )?;
        writeln!(
            self.out,
            "y ({} steps before): {}",
            result.y_steps,
            hex::encode(&result.y)
        )
    }

    pub fn checkpoint(&mut self, point: &Checkpoint) -> io::Result<()> {
        writeln!(
            self.out,
            "{}: x_steps={} y_steps={}",
            point.phase, point.x_steps, point.y_steps,
        )?;
        writeln!(
            self.out,
            "  {}  {}",
            hex::encode(&point.x_value),
            hex::encode(&point.y_value)
        )
    }

    pub fn summary<H: ChainHash>(
        &mut self,
        conv: &Convergence<H>,
        total_hashes: u64,
        elapsed: Duration,
    ) -> io::Result<()> {
        match conv.outcome {
            Outcome::Collision { matched } => {
                writeln!(self.out, "partial collision found ({matched} bytes matched)")?;
                writeln!(self.out, "input 1:  {}", hex::encode(&conv.x.frame))?;
                writeln!(self.out, "output 1: {}", hex::encode(conv.x.value.as_ref()))?;
                writeln!(self.out, "input 2:  {}", hex::encode(&conv.y.frame))?;
                writeln!(self.out, "output 2: {}", hex::encode(conv.y.value.as_ref()))?;
            }
            Outcome::SameChain | Outcome::Exhausted => {
                writeln!(self.out, "no collision.")?;
            }
        }
        writeln!(self.out, "total hashes: {total_hashes}")?;
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            total_hashes as f64 / secs
        } else {
            0.0
        };
        writeln!(self.out, "duration: {secs:.3} s ({rate:.0} hashes/s)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converge::Endpoint;
    use crate::sha2::Sha256;

    #[test]
    fn stream_carries_hex_and_counts() {
        let mut reporter = Reporter::new(Vec::new());
        let cfg = SearchConfig::default();
        reporter.preamble(&cfg).unwrap();
        reporter.batch_header().unwrap();
        reporter
            .batch(&BatchStats {
                batch: 3,
                total_hashes: 1_000_001,
                distinct_points: 42,
                max_worker_points: 7,
                dropped_points: 0,
            })
            .unwrap();

        let conv = Convergence::<Sha256> {
            x: Endpoint {
                frame: vec![0xab; 12],
                value: [0x01; 32],
                hash_count: 1,
            },
            y: Endpoint {
                frame: vec![0xcd; 12],
                value: [0x01; 32],
                hash_count: 1,
            },
            outcome: Outcome::Collision { matched: 4 },
            checkpoints: Vec::new(),
        };
        reporter
            .summary(&conv, 1_000_003, Duration::from_millis(1500))
            .unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("sha256 (n=4, k=2)"));
        assert!(text.contains("prefix: 00112233"));
        assert!(text.contains("1000001"));
        assert!(text.contains("partial collision found (4 bytes matched)"));
        assert!(text.contains(&"ab".repeat(12)));
        assert!(text.contains("total hashes: 1000003"));
    }
}
