use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a participant. Rank 0 is the coordinator by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl Rank {
    pub const COORDINATOR: Rank = Rank(0);

    pub fn is_coordinator(self) -> bool {
        self == Self::COORDINATOR
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every rank of a world of `world_size` participants, in increasing order.
    pub fn all(world_size: u32) -> impl Iterator<Item = Rank> {
        (0..world_size).map(Rank)
    }

    /// Every non-coordinator rank, in increasing order.
    pub fn workers(world_size: u32) -> impl Iterator<Item = Rank> {
        (1..world_size).map(Rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}", self.0)
    }
}
