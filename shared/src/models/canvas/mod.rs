use log::debug;
use thiserror::Error;

use super::{
    fractal::EscapeTime, fragments::message_block::MessageBlock, grid_spec::GridSpec,
    range::RowRange, rank::Rank,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("block is {found} cells wide, canvas is {expected}")]
    WidthMismatch { expected: u32, found: u32 },

    #[error("rows {block} fall outside of canvas rows {canvas}")]
    OutOfBounds { canvas: RowRange, block: RowRange },

    #[error("block over rows {range} carries {found} cells, expected {expected}")]
    CellCount {
        range: RowRange,
        expected: usize,
        found: usize,
    },

    #[error("row {row} was already written")]
    RowAlreadyWritten { row: u32 },
}

/// Row-major grid of iteration counts covering `range` of the full image.
///
/// Cells are addressed by their true image row; a canvas for `[200, 400)`
/// holds 200 rows and rejects any access outside of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    range: RowRange,
    cells: Vec<u32>,
    written: Vec<bool>,
}

impl Canvas {
    /// Blank canvas, no row written yet.
    pub fn new(width: u32, range: RowRange) -> Self {
        let rows = range.len() as usize;
        Self {
            width,
            range,
            cells: vec![0; rows * width as usize],
            written: vec![false; rows],
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self::new(width, RowRange::new(0, height))
    }

    /// Evaluates every cell of `range`.
    pub fn compute<E: EscapeTime>(grid: &GridSpec, range: RowRange, evaluator: &E) -> Self {
        let mut canvas = Canvas::new(grid.width, range);
        let width = grid.width as usize;

        for (row, cells) in range.rows().zip(canvas.cells.chunks_exact_mut(width)) {
            for (col, cell) in cells.iter_mut().enumerate() {
                let c = grid.pixel_to_complex(row, col as u32);
                *cell = evaluator.evaluate(c, grid.iteration_limit);
            }
        }
        canvas.written.fill(true);

        debug!("Computed rows {} of {} columns", range, grid.width);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn range(&self) -> RowRange {
        self.range
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn get(&self, row: u32, col: u32) -> Option<u32> {
        if col >= self.width {
            return None;
        }
        self.row(row).map(|cells| cells[col as usize])
    }

    pub fn row(&self, row: u32) -> Option<&[u32]> {
        if !self.range.contains(row) {
            return None;
        }
        let start = self.offset(row);
        Some(&self.cells[start..start + self.width as usize])
    }

    /// Copies `block` into its rows. Each row may be written once.
    pub fn place(&mut self, block: &MessageBlock) -> Result<(), CanvasError> {
        if block.width != self.width {
            return Err(CanvasError::WidthMismatch {
                expected: self.width,
                found: block.width,
            });
        }
        if !self.range.covers(&block.range) {
            return Err(CanvasError::OutOfBounds {
                canvas: self.range,
                block: block.range,
            });
        }
        let expected = block.range.len() as usize * self.width as usize;
        if block.cells.len() != expected {
            return Err(CanvasError::CellCount {
                range: block.range,
                expected,
                found: block.cells.len(),
            });
        }

        let first = (block.range.lower - self.range.lower) as usize;
        let rows = first..first + block.range.len() as usize;
        if let Some(offset) = self.written[rows.clone()].iter().position(|&written| written) {
            return Err(CanvasError::RowAlreadyWritten {
                row: block.range.lower + offset as u32,
            });
        }

        if !block.range.is_empty() {
            let start = self.offset(block.range.lower);
            self.cells[start..start + expected].copy_from_slice(&block.cells);
        }
        self.written[rows].fill(true);
        Ok(())
    }

    /// True once every row of the canvas has been written.
    pub fn is_complete(&self) -> bool {
        self.written.iter().all(|&written| written)
    }

    pub fn missing_rows(&self) -> Vec<u32> {
        self.range
            .rows()
            .zip(&self.written)
            .filter(|(_, written)| !**written)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn into_block(self, rank: Rank) -> MessageBlock {
        MessageBlock {
            rank,
            range: self.range,
            width: self.width,
            cells: self.cells,
        }
    }

    fn offset(&self, row: u32) -> usize {
        (row - self.range.lower) as usize * self.width as usize
    }
}
