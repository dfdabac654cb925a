//! Stage two: walk the two recovered chain tails forward in lockstep and
//! pin down the exact colliding inputs.
//!
//! Equality between the two sides always means the first N bytes of the
//! chain values, never the full digest.

use crate::chain::FrameLayout;
use crate::engine::StageOneResult;
use crate::sha2::ChainHash;

/// One side of the convergence walk.
#[derive(Debug, Clone)]
pub struct Endpoint<H: ChainHash> {
    pub frame: Vec<u8>,
    pub value: H::Output,
    pub hash_count: u64,
}

impl<H: ChainHash> Endpoint<H> {
    fn start(frame: Vec<u8>) -> Self {
        let mut hasher = H::default();
        hasher.update(&frame);
        Self {
            frame,
            value: hasher.finalize(),
            hash_count: 1,
        }
    }

    fn step(&mut self, layout: &FrameLayout) {
        self.frame = layout.frame_for(self.value.as_ref());
        let mut hasher = H::default();
        hasher.update(&self.frame);
        self.value = hasher.finalize();
        self.hash_count += 1;
    }

    fn matches(&self, other: &Self, len: usize) -> bool {
        self.value.as_ref()[..len] == other.value.as_ref()[..len]
    }
}

/// How the lockstep walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Distinct frames whose values agree on the leading N bytes;
    /// `matched` counts the full common digest prefix.
    Collision { matched: usize },
    /// The equalized tails were the same chain point. No usable pair.
    SameChain,
    /// Step counters ran out before the values met. No usable pair.
    Exhausted,
}

/// Snapshot taken before equalizing, after equalizing, and at loop exit.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub phase: &'static str,
    pub x_steps: u64,
    pub y_steps: u64,
    pub x_value: Vec<u8>,
    pub y_value: Vec<u8>,
}

#[derive(Debug)]
pub struct Convergence<H: ChainHash> {
    pub x: Endpoint<H>,
    pub y: Endpoint<H>,
    pub outcome: Outcome,
    pub checkpoints: Vec<Checkpoint>,
}

fn snapshot<H: ChainHash>(
    phase: &'static str,
    x: &Endpoint<H>,
    y: &Endpoint<H>,
    x_steps: u64,
    y_steps: u64,
) -> Checkpoint {
    Checkpoint {
        phase,
        x_steps,
        y_steps,
        x_value: x.value.as_ref().to_vec(),
        y_value: y.value.as_ref().to_vec(),
    }
}

/// Recover the colliding pair behind a stage-one DP hit.
pub fn converge<H: ChainHash>(hit: &StageOneResult, layout: &FrameLayout) -> Convergence<H> {
    let n = layout.key_len();
    let mut x = Endpoint::<H>::start(hit.x.clone());
    let mut y = Endpoint::<H>::start(hit.y.clone());
    let mut x_steps = hit.x_steps;
    let mut y_steps = hit.y_steps;
    let mut checkpoints = vec![snapshot("before", &x, &y, x_steps, y_steps)];

    // bring both sides to the same distance from the shared DP
    while x_steps > y_steps {
        x.step(layout);
        x_steps -= 1;
    }
    while y_steps > x_steps {
        y.step(layout);
        y_steps -= 1;
    }
    checkpoints.push(snapshot("equalized", &x, &y, x_steps, y_steps));

    while !x.matches(&y, n) && x_steps > 0 && y_steps > 0 {
        x.step(layout);
        y.step(layout);
        x_steps -= 1;
        y_steps -= 1;
    }
    checkpoints.push(snapshot("converged", &x, &y, x_steps, y_steps));

    let outcome = if x.frame == y.frame {
        Outcome::SameChain
    } else if x.matches(&y, n) {
        let matched = x
            .value
            .as_ref()
            .iter()
            .zip(y.value.as_ref())
            .take_while(|(a, b)| a == b)
            .count();
        Outcome::Collision { matched }
    } else {
        Outcome::Exhausted
    };

    Convergence {
        x,
        y,
        outcome,
        checkpoints,
    }
}
