use serde::{Deserialize, Serialize};

use crate::models::rank::Rank;

use super::fragment::Fragment;

/// Acknowledges a `MessageBlock`; the sender's `send` returns once it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReceipt {
    pub rank: Rank,
}

impl Fragment for BlockReceipt {
    const NAME: &'static str = "BlockReceipt";
}
