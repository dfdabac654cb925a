//! Run parameters for the collision search.
//!
//! Everything the original program fixed at compile time is carried here as
//! a runtime record, validated once at startup. Only the hash variant stays
//! a type parameter, selected by [`HashKind`].

use clap::ValueEnum;
use thiserror::Error;

/// Soft cap on `workers * dp_capacity`, standing in for device-memory
/// feasibility checks.
pub const BUFFER_BUDGET: usize = 1 << 28;

/// Which member of the SHA-2 family to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashKind {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl HashKind {
    pub fn output_size(self) -> usize {
        match self {
            HashKind::Sha224 | HashKind::Sha512_224 => 28,
            HashKind::Sha256 | HashKind::Sha512_256 => 32,
            HashKind::Sha384 => 48,
            HashKind::Sha512 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashKind::Sha224 => "sha224",
            HashKind::Sha256 => "sha256",
            HashKind::Sha384 => "sha384",
            HashKind::Sha512 => "sha512",
            HashKind::Sha512_224 => "sha512-224",
            HashKind::Sha512_256 => "sha512-256",
        }
    }
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of one search run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub hash: HashKind,
    /// N: leading digest bytes that must collide.
    pub collision_len: usize,
    /// K: leading zero bytes that mark a distinguished point.
    pub dp_len: usize,
    /// Fixed bytes laid before the walked middle section.
    pub prefix: Vec<u8>,
    /// Fixed bytes laid after the walked middle section.
    pub suffix: Vec<u8>,
    /// Independent chain walkers.
    pub workers: usize,
    /// Chain steps per walker between synchronization points.
    pub batch_size: usize,
    /// Distinguished points buffered per walker per batch.
    pub dp_capacity: usize,
    /// Mixed into every walker index when deriving its starting point.
    pub seed_base: u32,
    /// OS threads advancing the walkers.
    pub pool: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash: HashKind::Sha256,
            collision_len: 4,
            dp_len: 2,
            prefix: vec![0x00, 0x11, 0x22, 0x33],
            suffix: vec![0x33, 0x22, 0x11, 0x00],
            workers: 8192,
            batch_size: 4096,
            dp_capacity: 64,
            seed_base: 0,
            pool: num_cpus::get(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("collision length must be at least 1 byte")]
    EmptyCollision,
    #[error("collision length {len} exceeds the {hash} output size of {max} bytes")]
    CollisionTooWide {
        len: usize,
        hash: &'static str,
        max: usize,
    },
    #[error("distinguished-point width {dp} must lie between 1 and the collision length {len}")]
    BadDpWidth { dp: usize, len: usize },
    #[error("worker count must be nonzero")]
    NoWorkers,
    #[error("batch size must be nonzero")]
    EmptyBatch,
    #[error("per-worker buffer capacity must be nonzero")]
    NoDpCapacity,
    #[error("{workers} workers x {capacity} buffered points exceeds the budget of {budget}")]
    BufferBudget {
        workers: usize,
        capacity: usize,
        budget: usize,
    },
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collision_len == 0 {
            return Err(ConfigError::EmptyCollision);
        }
        let max = self.hash.output_size();
        if self.collision_len > max {
            return Err(ConfigError::CollisionTooWide {
                len: self.collision_len,
                hash: self.hash.name(),
                max,
            });
        }
        if self.dp_len == 0 || self.dp_len > self.collision_len {
            return Err(ConfigError::BadDpWidth {
                dp: self.dp_len,
                len: self.collision_len,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.dp_capacity == 0 {
            return Err(ConfigError::NoDpCapacity);
        }
        match self.workers.checked_mul(self.dp_capacity) {
            Some(points) if points <= BUFFER_BUDGET => Ok(()),
            _ => Err(ConfigError::BufferBudget {
                workers: self.workers,
                capacity: self.dp_capacity,
                budget: BUFFER_BUDGET,
            }),
        }
    }

    /// Total input-frame length: prefix, middle, suffix.
    pub fn frame_len(&self) -> usize {
        self.prefix.len() + self.collision_len + self.suffix.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SearchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_widths() {
        let mut cfg = SearchConfig::default();
        cfg.collision_len = 40;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::CollisionTooWide {
                len: 40,
                hash: "sha256",
                max: 32,
            })
        );

        let mut cfg = SearchConfig::default();
        cfg.dp_len = cfg.collision_len + 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadDpWidth { .. })));

        let mut cfg = SearchConfig::default();
        cfg.dp_len = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadDpWidth { .. })));
    }

    #[test]
    fn rejects_zero_and_oversized_resources() {
        let mut cfg = SearchConfig::default();
        cfg.workers = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoWorkers));

        let mut cfg = SearchConfig::default();
        cfg.batch_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyBatch));

        let mut cfg = SearchConfig::default();
        cfg.workers = BUFFER_BUDGET;
        cfg.dp_capacity = 2;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BufferBudget { .. })
        ));
    }

    #[test]
    fn frame_length_counts_all_sections() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.frame_len(), 4 + 4 + 4);
    }
}
