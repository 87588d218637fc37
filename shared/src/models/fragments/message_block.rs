use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::{
    models::{range::RowRange, rank::Rank},
    networking::{error::TransportError, result::TransportResult},
};

use super::fragment::Fragment;

/// Computed rows of one rank, row-major, `range.len() * width` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub rank: Rank,
    pub range: RowRange,
    pub width: u32,
    pub cells: Vec<u32>,
}

/// JSON half of a block frame; the cells travel as binary data after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub rank: Rank,
    pub range: RowRange,
    pub width: u32,
}

impl Fragment for BlockHeader {
    const NAME: &'static str = "MessageBlock";
}

impl BlockHeader {
    pub fn cell_count(&self) -> usize {
        self.range.len() as usize * self.width as usize
    }
}

impl MessageBlock {
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            rank: self.rank,
            range: self.range,
            width: self.width,
        }
    }

    /// Cells as big-endian `u32`s.
    pub fn encode_cells(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.cells.len() * size_of::<u32>());
        for cell in &self.cells {
            data.extend_from_slice(&cell.to_be_bytes());
        }
        data
    }

    pub fn from_parts(header: BlockHeader, data: &[u8]) -> TransportResult<Self> {
        let expected = header.cell_count() * size_of::<u32>();
        if data.len() != expected {
            return Err(TransportError::MalformedFrame(format!(
                "block from {} over rows {} carries {} bytes, expected {}",
                header.rank,
                header.range,
                data.len(),
                expected
            )));
        }

        let cells = data
            .chunks_exact(size_of::<u32>())
            .map(|bytes| u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect();

        Ok(Self {
            rank: header.rank,
            range: header.range,
            width: header.width,
            cells,
        })
    }
}
