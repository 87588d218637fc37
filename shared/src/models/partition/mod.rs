//! Static row decomposition of the canvas among ranks.
//!
//! Every rank gets `height / worker_count` contiguous rows; the last rank
//! also takes the remainder so the ranges always tile `[0, height)`.

use super::{config::ConfigurationError, range::RowRange, rank::Rank};

pub fn partition(height: u32, worker_count: u32, rank: Rank) -> Result<RowRange, ConfigurationError> {
    check_split(height, worker_count)?;
    if rank.0 >= worker_count {
        return Err(ConfigurationError::RankOutOfRange { rank, worker_count });
    }

    let segment_height = height / worker_count;
    let lower = rank.0 * segment_height;
    let upper = if rank.0 == worker_count - 1 {
        height
    } else {
        lower + segment_height
    };

    Ok(RowRange::new(lower, upper))
}

/// Ranges for ranks `0..worker_count`, indexed by rank.
pub fn partition_all(height: u32, worker_count: u32) -> Result<Vec<RowRange>, ConfigurationError> {
    Rank::all(worker_count)
        .map(|rank| partition(height, worker_count, rank))
        .collect()
}

fn check_split(height: u32, worker_count: u32) -> Result<(), ConfigurationError> {
    if height == 0 {
        return Err(ConfigurationError::ZeroHeight);
    }
    if worker_count == 0 {
        return Err(ConfigurationError::ZeroWorkers);
    }
    if worker_count > height {
        return Err(ConfigurationError::TooManyWorkers { worker_count, height });
    }
    Ok(())
}
