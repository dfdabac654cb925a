//! Parallel van Oorschot-Wiener partial-collision search for the SHA-2
//! family.
//!
//! Thousands of independent walkers iterate
//! `f(x) = truncate_n(H(prefix ‖ x ‖ suffix))`, pausing at distinguished
//! points (values with k leading zero bytes). A host-side table of
//! distinguished points spots the first pair of chains that meet
//! ([`stage_one`]); a deterministic lockstep walk then recovers the two
//! inputs whose digests share their first n bytes ([`converge`]).

pub mod chain;
pub mod config;
pub mod converge;
pub mod engine;
pub mod report;
pub mod sha2;
pub mod table;

pub use chain::{DpBuffer, DpRecord, FrameLayout, Walker};
pub use config::{ConfigError, HashKind, SearchConfig};
pub use converge::{converge, Convergence, Outcome};
pub use engine::{stage_one, BatchStats, StageOneResult};
pub use report::Reporter;
pub use sha2::{ChainHash, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
