//! Chain walking: the input-frame layout, worker seeding and the per-worker
//! state machine that advances a hash chain until distinguished points fall
//! out.

use crate::config::SearchConfig;
use crate::sha2::ChainHash;

/// Byte layout of every hashed input: `prefix ‖ middle ‖ suffix`, where the
/// middle is the first `middle_len` bytes of the previous chain value.
#[derive(Debug, Clone)]
pub struct FrameLayout {
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    middle_len: usize,
    zero_len: usize,
}

impl FrameLayout {
    pub fn new(prefix: Vec<u8>, suffix: Vec<u8>, middle_len: usize, zero_len: usize) -> Self {
        debug_assert!(zero_len >= 1 && zero_len <= middle_len);
        Self {
            prefix,
            suffix,
            middle_len,
            zero_len,
        }
    }

    pub fn from_config(cfg: &SearchConfig) -> Self {
        Self::new(
            cfg.prefix.clone(),
            cfg.suffix.clone(),
            cfg.collision_len,
            cfg.dp_len,
        )
    }

    pub fn frame_len(&self) -> usize {
        self.prefix.len() + self.middle_len + self.suffix.len()
    }

    /// Length of a DP key, and of the truncation compared everywhere.
    pub fn key_len(&self) -> usize {
        self.middle_len
    }

    /// Build a fresh frame whose middle is taken from `value`.
    pub fn frame_for(&self, value: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.frame_len());
        frame.extend_from_slice(&self.prefix);
        frame.extend_from_slice(&value[..self.middle_len]);
        frame.extend_from_slice(&self.suffix);
        frame
    }

    /// Overwrite the middle section of an existing frame in place.
    pub fn write_middle(&self, frame: &mut [u8], value: &[u8]) {
        let start = self.prefix.len();
        frame[start..start + self.middle_len].copy_from_slice(&value[..self.middle_len]);
    }

    /// A chain value is distinguished when its first `zero_len` bytes are 0.
    pub fn is_distinguished(&self, value: &[u8]) -> bool {
        value[..self.zero_len].iter().all(|&b| b == 0)
    }
}

/// Starting chain value for a worker: the index written little-endian into
/// the low bytes of a zeroed digest.
pub fn seed_value<H: ChainHash>(index: u32) -> H::Output {
    let mut value = H::ZERO;
    value.as_mut()[..4].copy_from_slice(&index.to_le_bytes());
    value
}

/// A distinguished point as it leaves a walker: the value itself and the
/// chain distance from the previous DP (or seed). Predecessor frames are
/// reconstructed host-side from the last-DP ledger, so the record stays
/// allocation-free.
#[derive(Debug, Clone)]
pub struct DpRecord<H: ChainHash> {
    pub value: H::Output,
    pub steps: u64,
}

/// Fixed-capacity DP sink for one walker and one batch. Overflow saturates:
/// excess points are dropped and counted, which delays detection but never
/// corrupts it.
#[derive(Debug)]
pub struct DpBuffer<H: ChainHash> {
    records: Vec<DpRecord<H>>,
    limit: usize,
    dropped: u64,
}

impl<H: ChainHash> DpBuffer<H> {
    pub fn new(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    pub fn push(&mut self, record: DpRecord<H>) {
        if self.records.len() < self.limit {
            self.records.push(record);
        } else {
            self.dropped += 1;
        }
    }

    pub fn records(&self) -> &[DpRecord<H>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Per-worker chain state. Mutates only itself and its DP sink.
pub struct Walker<H: ChainHash> {
    frame: Vec<u8>,
    value: H::Output,
    hash_count: u64,
    steps_since_dp: u64,
}

impl<H: ChainHash> Walker<H> {
    pub fn new(layout: &FrameLayout, seed: H::Output) -> Self {
        Self {
            frame: layout.frame_for(seed.as_ref()),
            value: seed,
            hash_count: 0,
            steps_since_dp: 0,
        }
    }

    pub fn hash_count(&self) -> u64 {
        self.hash_count
    }

    pub fn value(&self) -> &H::Output {
        &self.value
    }

    /// One chain iteration: refresh the frame middle from the current value,
    /// hash the frame, and register the result if it is distinguished.
    pub fn step(&mut self, layout: &FrameLayout, sink: &mut DpBuffer<H>) {
        layout.write_middle(&mut self.frame, self.value.as_ref());
        let mut hasher = H::default();
        hasher.update(&self.frame);
        self.value = hasher.finalize();
        self.hash_count += 1;
        self.steps_since_dp += 1;
        if layout.is_distinguished(self.value.as_ref()) {
            sink.push(DpRecord {
                value: self.value,
                steps: self.steps_since_dp,
            });
            self.steps_since_dp = 0;
        }
    }
}
