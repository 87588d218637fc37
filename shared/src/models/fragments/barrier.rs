use serde::{Deserialize, Serialize};

use crate::models::rank::Rank;

use super::fragment::Fragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierArrival {
    pub rank: Rank,
}

impl Fragment for BarrierArrival {
    const NAME: &'static str = "BarrierArrival";
}

/// Sent by the coordinator once every participant has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierRelease {
    pub participants: u32,
}

impl Fragment for BarrierRelease {
    const NAME: &'static str = "BarrierRelease";
}
