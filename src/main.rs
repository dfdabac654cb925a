use std::io;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;

use vow_collider::{
    converge, stage_one, ChainHash, FrameLayout, HashKind, Outcome, Reporter, SearchConfig, Sha224,
    Sha256, Sha384, Sha512, Sha512_224, Sha512_256,
};

#[derive(Parser)]
#[command(
    version,
    about = "van Oorschot-Wiener partial collision search over the SHA-2 family"
)]
struct Cli {
    /// Hash variant to attack
    #[arg(long, value_enum, default_value_t = HashKind::Sha256)]
    hash: HashKind,

    /// Leading digest bytes that must collide
    #[arg(short = 'n', long, default_value_t = 4)]
    collision_bytes: usize,

    /// Leading zero bytes that mark a distinguished point
    #[arg(short = 'k', long, default_value_t = 2)]
    dp_bytes: usize,

    /// Fixed bytes laid before the walked section (hex)
    #[arg(long, default_value = "00112233")]
    prefix: String,

    /// Fixed bytes laid after the walked section (hex)
    #[arg(long, default_value = "33221100")]
    suffix: String,

    /// Independent chain walkers
    #[arg(long, default_value_t = 8192)]
    workers: usize,

    /// Chain steps per walker between synchronization points
    #[arg(long, default_value_t = 4096)]
    batch_size: usize,

    /// Distinguished points buffered per walker per batch
    #[arg(long, default_value_t = 64)]
    dp_capacity: usize,

    /// Base value mixed into every walker's starting point
    #[arg(long, default_value_t = 0)]
    seed: u32,

    /// Draw the seed base at random instead (a fresh seed set per run)
    #[arg(long)]
    random_seed: bool,

    /// OS threads advancing the walkers (defaults to the CPU count)
    #[arg(long)]
    pool: Option<usize>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let seed_base = if cli.random_seed {
        rand::thread_rng().next_u32()
    } else {
        cli.seed
    };
    let cfg = SearchConfig {
        hash: cli.hash,
        collision_len: cli.collision_bytes,
        dp_len: cli.dp_bytes,
        prefix: hex::decode(&cli.prefix).context("--prefix is not valid hex")?,
        suffix: hex::decode(&cli.suffix).context("--suffix is not valid hex")?,
        workers: cli.workers,
        batch_size: cli.batch_size,
        dp_capacity: cli.dp_capacity,
        seed_base,
        pool: cli.pool.unwrap_or_else(num_cpus::get),
    };
    cfg.validate()?;

    match cfg.hash {
        HashKind::Sha224 => run::<Sha224>(&cfg),
        HashKind::Sha256 => run::<Sha256>(&cfg),
        HashKind::Sha384 => run::<Sha384>(&cfg),
        HashKind::Sha512 => run::<Sha512>(&cfg),
        HashKind::Sha512_224 => run::<Sha512_224>(&cfg),
        HashKind::Sha512_256 => run::<Sha512_256>(&cfg),
    }
}

fn run<H: ChainHash>(cfg: &SearchConfig) -> Result<ExitCode> {
    let stdout = io::stdout().lock();
    let mut reporter = Reporter::new(stdout);
    reporter.preamble(cfg)?;
    reporter.batch_header()?;

    let stop = AtomicBool::new(false);
    let start = Instant::now();
    let found = stage_one::<H, _>(cfg, &stop, |stats| reporter.batch(stats))?;
    let Some(result) = found else {
        anyhow::bail!("search stopped before any distinguished point collided");
    };
    reporter.stage_one(&result)?;

    let layout = FrameLayout::from_config(cfg);
    let conv = converge::<H>(&result, &layout);
    for point in &conv.checkpoints {
        reporter.checkpoint(point)?;
    }

    let total_hashes = result.total_hashes + conv.x.hash_count + conv.y.hash_count;
    reporter.summary(&conv, total_hashes, start.elapsed())?;

    match conv.outcome {
        Outcome::Collision { .. } => Ok(ExitCode::SUCCESS),
        Outcome::SameChain | Outcome::Exhausted => Ok(ExitCode::from(2)),
    }
}
