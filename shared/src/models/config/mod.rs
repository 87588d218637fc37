use complex_rs::complex::Complex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{grid_spec::GridSpec, rank::Rank};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("canvas width must be a positive integer")]
    ZeroWidth,

    #[error("canvas height must be a positive integer")]
    ZeroHeight,

    #[error("iteration limit must be a positive integer")]
    ZeroIterationLimit,

    #[error("worker count must be a positive integer")]
    ZeroWorkers,

    #[error("{worker_count} workers cannot share {height} rows")]
    TooManyWorkers { worker_count: u32, height: u32 },

    #[error("{rank} is outside of a world of {worker_count} workers")]
    RankOutOfRange { rank: Rank, worker_count: u32 },

    #[error("plane window centred on {center} with spans {span_re}x{span_im} is not usable")]
    InvalidWindow {
        center: Complex,
        span_re: f64,
        span_im: f64,
    },

    #[error("transport connects {transport} participants but {configured} workers are configured")]
    WorldSizeMismatch { transport: u32, configured: u32 },

    #[error("{rank} cannot act as {role}")]
    RoleMismatch { rank: Rank, role: &'static str },

    #[error("receive timeout of {seconds} seconds is not a usable duration")]
    InvalidTimeout { seconds: f64 },

    #[error("rows of {rank} need a {bytes} byte frame, the limit is {limit} bytes")]
    BlockTooLarge { rank: Rank, bytes: u64, limit: u32 },
}

/// Everything a participant needs to know about a run before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub grid: GridSpec,
    pub worker_count: u32,
}

impl RenderConfig {
    pub fn new(grid: GridSpec, worker_count: u32) -> Result<Self, ConfigurationError> {
        if worker_count == 0 {
            return Err(ConfigurationError::ZeroWorkers);
        }
        if worker_count > grid.height {
            return Err(ConfigurationError::TooManyWorkers {
                worker_count,
                height: grid.height,
            });
        }
        Ok(Self { grid, worker_count })
    }

    /// Fails unless a transport of `world_size` participants matches this run.
    pub fn check_world_size(&self, world_size: u32) -> Result<(), ConfigurationError> {
        if world_size != self.worker_count {
            return Err(ConfigurationError::WorldSizeMismatch {
                transport: world_size,
                configured: self.worker_count,
            });
        }
        Ok(())
    }

    pub fn check_rank(&self, rank: Rank) -> Result<(), ConfigurationError> {
        if rank.0 >= self.worker_count {
            return Err(ConfigurationError::RankOutOfRange {
                rank,
                worker_count: self.worker_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reference_configuration() {
        let grid = GridSpec::new(800, 600, 1000).unwrap();
        let config = RenderConfig::new(grid, 4).unwrap();
        assert!(config.check_world_size(4).is_ok());
        assert_eq!(
            config.check_world_size(3),
            Err(ConfigurationError::WorldSizeMismatch {
                transport: 3,
                configured: 4
            })
        );
    }

    #[test]
    fn rejects_more_workers_than_rows() {
        let grid = GridSpec::new(8, 3, 10).unwrap();
        assert_eq!(
            RenderConfig::new(grid, 4),
            Err(ConfigurationError::TooManyWorkers {
                worker_count: 4,
                height: 3
            })
        );
        assert_eq!(RenderConfig::new(grid, 0), Err(ConfigurationError::ZeroWorkers));
    }

    #[test]
    fn rank_must_belong_to_the_world() {
        let config = RenderConfig::new(GridSpec::new(8, 8, 10).unwrap(), 4).unwrap();
        assert!(config.check_rank(Rank(3)).is_ok());
        assert_eq!(
            config.check_rank(Rank(9)),
            Err(ConfigurationError::RankOutOfRange {
                rank: Rank(9),
                worker_count: 4
            })
        );
    }
}
