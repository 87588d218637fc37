use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::models::config::RenderConfig;

/// Summary the coordinator produces once the image is on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub width: u32,
    pub height: u32,
    pub iteration_limit: u32,
    pub worker_count: u32,
    /// Wall time from the start of local computation to the last block placed.
    pub elapsed: Duration,
    pub output: PathBuf,
}

impl RunReport {
    pub fn new(config: &RenderConfig, elapsed: Duration, output: PathBuf) -> Self {
        Self {
            width: config.grid.width,
            height: config.grid.height,
            iteration_limit: config.grid.iteration_limit,
            worker_count: config.worker_count,
            elapsed,
            output,
        }
    }

    /// The single console line printed after a run.
    pub fn summary(&self) -> String {
        format!("Total computation time: {:.6} seconds", self.elapsed.as_secs_f64())
    }
}
