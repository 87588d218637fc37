use serde::{Deserialize, Serialize};

use crate::models::rank::Rank;

use super::fragment::Fragment;

/// First message a worker sends after connecting to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub rank: Rank,
    pub world_size: u32,
}

impl Fragment for Hello {
    const NAME: &'static str = "Hello";
}
