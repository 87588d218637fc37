//! Rank 0: computes its own rows like any worker, then gathers every other
//! rank's rows in increasing rank order and persists the complete canvas.

use std::time::Instant;

use log::{debug, error, info};
use shared::{
    dtos::run_report::RunReport,
    error::FraktResult,
    graphics::{write_image, OutputSettings},
    models::{
        canvas::Canvas,
        config::{ConfigurationError, RenderConfig},
        partition::partition_all,
        rank::Rank,
    },
    networking::{error::TransportError, transport::Transport},
};

pub async fn run_coordinator<T: Transport>(
    transport: &mut T,
    config: &RenderConfig,
    output: &OutputSettings,
) -> FraktResult<RunReport> {
    let started = Instant::now();
    let canvas = gather(transport, config).await?;
    let elapsed = started.elapsed();

    if let Err(e) = write_image(output, &canvas, config.grid.iteration_limit) {
        error!("Failed to write the image: {}", e);
        return Err(e.into());
    }

    let report = RunReport::new(config, elapsed, output.path.clone());
    match serde_json::to_string(&report) {
        Ok(json) => debug!("RunReport: {}", json),
        Err(e) => debug!("RunReport not serializable: {}", e),
    }
    Ok(report)
}

/// Builds the full canvas from rank 0's own rows and one block per worker.
///
/// Blocks are received strictly in rank order and must carry exactly the
/// rows the partitioner assigned to their sender.
pub async fn gather<T: Transport>(transport: &mut T, config: &RenderConfig) -> FraktResult<Canvas> {
    let rank = transport.rank();
    config.check_world_size(transport.world_size())?;
    if !rank.is_coordinator() {
        return Err(ConfigurationError::RoleMismatch {
            rank,
            role: "the coordinator",
        }
        .into());
    }

    let grid = &config.grid;
    let ranges = partition_all(grid.height, config.worker_count)?;
    let mut canvas = Canvas::full(grid.width, grid.height);

    info!("{} computing rows {} of {}x{}", rank, ranges[0], grid.width, grid.height);
    let own = Canvas::compute(grid, ranges[0], &grid.evaluator());
    canvas
        .place(&own.into_block(rank))
        .map_err(TransportError::from)?;

    transport.barrier().await?;
    debug!("All {} ranks passed the barrier", config.worker_count);

    for (source, expected) in Rank::workers(config.worker_count).zip(ranges.iter().skip(1)) {
        let block = transport.receive(source).await?;
        if block.rank != source || block.range != *expected {
            error!(
                "{} sent rows {} as {}, expected rows {}",
                source, block.range, block.rank, expected
            );
            return Err(TransportError::UnexpectedBlock {
                from: source,
                claimed: block.rank,
                expected: *expected,
                found: block.range,
            }
            .into());
        }

        canvas.place(&block).map_err(TransportError::from)?;
        info!("Placed rows {} from {}", block.range, source);
    }

    debug_assert!(canvas.is_complete(), "rows {:?} never arrived", canvas.missing_rows());
    Ok(canvas)
}
