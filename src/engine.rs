//! Stage one: drive the walkers in batches and ingest their distinguished
//! points until two chains meet.
//!
//! A driver thread owns the walker states and advances them on a pool of
//! scoped threads, `batch_size` steps per walker per batch. Finished batches
//! cross to the host over a rendezvous channel of capacity one, so the
//! driver computes at most one batch ahead of ingestion; that single batch
//! of run-ahead is the compute/ingest overlap. Ingestion runs in worker
//! order, then record order, which makes the first collision found a
//! deterministic function of the configuration.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::chain::{seed_value, DpBuffer, FrameLayout, Walker};
use crate::config::SearchConfig;
use crate::sha2::ChainHash;
use crate::table::DpTable;

/// Progress snapshot emitted after each ingested batch.
#[derive(Debug, Clone)]
pub struct BatchStats {
    pub batch: u64,
    pub total_hashes: u64,
    pub distinct_points: usize,
    pub max_worker_points: usize,
    pub dropped_points: u64,
}

/// Stage-one outcome: two chain tails meeting at `dp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOneResult {
    pub x: Vec<u8>,
    pub x_steps: u64,
    pub y: Vec<u8>,
    pub y_steps: u64,
    pub dp: Vec<u8>,
    pub total_hashes: u64,
    pub batches: u64,
}

struct Harvest<H: ChainHash> {
    buffers: Vec<DpBuffer<H>>,
    total_hashes: u64,
}

fn run_batch<H: ChainHash>(
    walkers: &mut [Walker<H>],
    layout: &FrameLayout,
    steps: usize,
    capacity: usize,
    pool: usize,
) -> Vec<DpBuffer<H>> {
    let mut buffers: Vec<DpBuffer<H>> = (0..walkers.len()).map(|_| DpBuffer::new(capacity)).collect();
    let chunk = walkers.len().div_ceil(pool).max(1);
    thread::scope(|s| {
        for (states, sinks) in walkers.chunks_mut(chunk).zip(buffers.chunks_mut(chunk)) {
            s.spawn(move || {
                for (walker, sink) in states.iter_mut().zip(sinks.iter_mut()) {
                    for _ in 0..steps {
                        walker.step(layout, sink);
                    }
                }
            });
        }
    });
    buffers
}

/// Run the distinguished-point search until a cross-chain hit.
///
/// `stop` is checked between batches; setting it ends the run with `None`.
/// `on_batch` receives a [`BatchStats`] for every fully ingested batch (the
/// batch that produces the hit is cut short and not reported). The in-flight
/// batch always completes before this returns.
pub fn stage_one<H, F>(
    cfg: &SearchConfig,
    stop: &AtomicBool,
    mut on_batch: F,
) -> io::Result<Option<StageOneResult>>
where
    H: ChainHash,
    F: FnMut(&BatchStats) -> io::Result<()>,
{
    let layout = FrameLayout::from_config(cfg);
    let pool = cfg.pool.max(1);
    let seeds = (0..cfg.workers)
        .map(|i| seed_value::<H>(cfg.seed_base.wrapping_add(i as u32)))
        .collect::<Vec<_>>();
    let mut table = DpTable::new(
        layout.key_len(),
        seeds.iter().map(|s| layout.frame_for(s.as_ref())).collect(),
    );
    log::debug!(
        "stage one: {} walkers, batch {}, pool of {pool}",
        cfg.workers,
        cfg.batch_size
    );

    thread::scope(|scope| {
        let (tx, rx) = mpsc::sync_channel::<Harvest<H>>(1);
        let layout_ref = &layout;
        scope.spawn(move || {
            let mut walkers: Vec<Walker<H>> = seeds
                .into_iter()
                .map(|seed| Walker::new(layout_ref, seed))
                .collect();
            let mut first = true;
            loop {
                // the seed step rides along with the initial batch
                let steps = cfg.batch_size + usize::from(first);
                first = false;
                let buffers = run_batch(&mut walkers, layout_ref, steps, cfg.dp_capacity, pool);
                let total_hashes = walkers.iter().map(Walker::hash_count).sum();
                if tx.send(Harvest { buffers, total_hashes }).is_err() {
                    break;
                }
            }
        });

        let mut batches = 0u64;
        let mut found = None;
        'harvests: for harvest in rx.iter() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            batches += 1;
            let mut max_worker_points = 0;
            let mut dropped_points = 0;
            for (worker, sink) in harvest.buffers.iter().enumerate() {
                max_worker_points = max_worker_points.max(sink.len());
                dropped_points += sink.dropped();
                for record in sink.records() {
                    if let Some(hit) =
                        table.ingest(worker, record.value.as_ref(), record.steps, &layout)
                    {
                        found = Some(StageOneResult {
                            x: hit.x,
                            x_steps: hit.x_steps,
                            y: hit.y,
                            y_steps: hit.y_steps,
                            dp: hit.dp,
                            total_hashes: harvest.total_hashes,
                            batches,
                        });
                        break 'harvests;
                    }
                }
            }
            if dropped_points > 0 {
                log::warn!(
                    "dropped {dropped_points} distinguished points this batch; raise --dp-capacity"
                );
            }
            on_batch(&BatchStats {
                batch: batches,
                total_hashes: harvest.total_hashes,
                distinct_points: table.len(),
                max_worker_points,
                dropped_points,
            })?;
        }
        // dropping the receiver unblocks the driver; the scope join then
        // waits for the in-flight batch to finish
        drop(rx);
        Ok(found)
    })
}
