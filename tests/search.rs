//! End-to-end searches with parameters small enough to finish in a test
//! run, verified against the library's own SHA-256.

use std::sync::atomic::AtomicBool;

use vow_collider::sha2::digest;
use vow_collider::{
    converge, stage_one, ChainHash, Convergence, FrameLayout, Outcome, SearchConfig,
    Sha256, StageOneResult,
};

fn config(n: usize, k: usize, workers: usize, batch_size: usize) -> SearchConfig {
    SearchConfig {
        collision_len: n,
        dp_len: k,
        workers,
        batch_size,
        dp_capacity: 256,
        pool: 4,
        ..SearchConfig::default()
    }
}

fn run_once<H: ChainHash>(cfg: &SearchConfig) -> (StageOneResult, Convergence<H>) {
    let stop = AtomicBool::new(false);
    let result = stage_one::<H, _>(cfg, &stop, |_| Ok(()))
        .expect("report sink cannot fail")
        .expect("nothing set the stop flag");
    let layout = FrameLayout::from_config(cfg);
    let conv = converge::<H>(&result, &layout);
    (result, conv)
}

// A run can end on a chain meeting itself; the remedy is a fresh seed set.
fn run_until_collision<H: ChainHash>(
    mut cfg: SearchConfig,
) -> (SearchConfig, StageOneResult, Convergence<H>) {
    for attempt in 0..8u32 {
        cfg.seed_base = attempt * 100_000;
        let (result, conv) = run_once::<H>(&cfg);
        if matches!(conv.outcome, Outcome::Collision { .. }) {
            return (cfg, result, conv);
        }
    }
    panic!("no cross-chain collision in 8 seed sets");
}

#[test]
fn finds_a_two_byte_collision() {
    let (cfg, result, conv) =
        run_until_collision::<Sha256>(config(2, 1, 64, 1024));

    let Outcome::Collision { matched } = conv.outcome else {
        unreachable!();
    };
    assert!(matched >= 2);
    assert_ne!(conv.x.frame, conv.y.frame);
    assert_eq!(conv.x.frame.len(), cfg.frame_len());
    assert_eq!(conv.y.frame.len(), cfg.frame_len());

    // both frames keep the fixed sections
    for frame in [&conv.x.frame, &conv.y.frame] {
        assert_eq!(&frame[..4], cfg.prefix.as_slice());
        assert_eq!(&frame[frame.len() - 4..], cfg.suffix.as_slice());
    }

    // the reported digests are real and really collide
    let dx = digest::<Sha256>(&conv.x.frame);
    let dy = digest::<Sha256>(&conv.y.frame);
    assert_eq!(dx, conv.x.value);
    assert_eq!(dy, conv.y.value);
    assert_eq!(dx[..2], dy[..2]);

    // the collided DP is distinguished
    assert_eq!(result.dp[0], 0);
}

#[test]
fn finds_a_three_byte_collision() {
    let (_, _, conv) = run_until_collision::<Sha256>(config(3, 2, 256, 4096));
    let Outcome::Collision { matched } = conv.outcome else {
        unreachable!();
    };
    assert!(matched >= 3);
    let dx = digest::<Sha256>(&conv.x.frame);
    let dy = digest::<Sha256>(&conv.y.frame);
    assert_eq!(dx[..3], dy[..3]);
}

#[test]
fn identical_parameters_find_identical_collisions() {
    let cfg = config(2, 1, 64, 1024);
    let (first, conv_first) = run_once::<Sha256>(&cfg);
    let (second, conv_second) = run_once::<Sha256>(&cfg);
    assert_eq!(first, second);
    assert_eq!(conv_first.x.frame, conv_second.x.frame);
    assert_eq!(conv_first.y.frame, conv_second.y.frame);
    assert_eq!(conv_first.outcome, conv_second.outcome);
}

#[test]
fn single_step_batches_still_terminate() {
    let (_, result, conv) = run_until_collision::<Sha256>(config(2, 1, 32, 1));
    assert!(result.batches >= 1);
    let Outcome::Collision { matched } = conv.outcome else {
        unreachable!();
    };
    assert!(matched >= 2);
}
