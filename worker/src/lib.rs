use log::{debug, error, info};
use shared::{
    error::FraktResult,
    models::{
        canvas::Canvas,
        config::{ConfigurationError, RenderConfig},
        partition::partition,
        rank::Rank,
    },
    networking::transport::Transport,
};

/// Work of a non-coordinator rank: compute the assigned rows, meet the other
/// ranks at the barrier, then hand the rows to the coordinator.
///
/// Returns once the coordinator has accepted the block.
pub async fn run_worker<T: Transport>(transport: &mut T, config: &RenderConfig) -> FraktResult<()> {
    let rank = transport.rank();
    config.check_world_size(transport.world_size())?;
    if rank.is_coordinator() {
        return Err(ConfigurationError::RoleMismatch {
            rank,
            role: "a worker",
        }
        .into());
    }

    let canvas = compute_assigned_rows(rank, config)?;

    if let Err(e) = transport.barrier().await {
        error!("{} failed at the barrier: {}", rank, e);
        return Err(e.into());
    }

    let block = canvas.into_block(rank);
    let range = block.range;
    if let Err(e) = transport.send(Rank::COORDINATOR, block).await {
        error!("{} failed to send rows {}: {}", rank, range, e);
        return Err(e.into());
    }
    info!("{} delivered rows {} to the coordinator", rank, range);

    Ok(())
}

/// Evaluates the rows `rank` owns into a canvas sized to exactly those rows.
pub fn compute_assigned_rows(rank: Rank, config: &RenderConfig) -> FraktResult<Canvas> {
    let grid = &config.grid;
    let range = partition(grid.height, config.worker_count, rank)?;
    info!("{} computing rows {} of {}x{}", rank, range, grid.width, grid.height);

    let canvas = Canvas::compute(grid, range, &grid.evaluator());
    debug!("{} finished {} cells", rank, canvas.cells().len());
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        error::FraktError,
        models::{fragments::message_block::MessageBlock, grid_spec::GridSpec, range::RowRange},
        networking::local::LocalTransport,
    };

    fn config(height: u32, worker_count: u32) -> RenderConfig {
        RenderConfig::new(GridSpec::new(16, height, 100).unwrap(), worker_count).unwrap()
    }

    #[test]
    fn worker_buffer_covers_only_its_rows() {
        let canvas = compute_assigned_rows(Rank(3), &config(601, 4)).unwrap();
        assert_eq!(canvas.range(), RowRange::new(450, 601));
        assert_eq!(canvas.cells().len(), 151 * 16);
    }

    #[tokio::test]
    async fn delivers_its_rows_after_the_barrier() {
        let config = config(10, 2);
        let mut mesh = LocalTransport::mesh(2);
        let mut worker = mesh.pop().unwrap();
        let mut coordinator = mesh.pop().unwrap();

        let handle = tokio::spawn(async move { run_worker(&mut worker, &config).await });

        coordinator.barrier().await.unwrap();
        let block: MessageBlock = coordinator.receive(Rank(1)).await.unwrap();
        assert_eq!(block.rank, Rank(1));
        assert_eq!(block.range, RowRange::new(5, 10));
        assert_eq!(block.cells.len(), 5 * 16);

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn refuses_to_run_as_coordinator() {
        let mut mesh = LocalTransport::mesh(2);
        let result = run_worker(&mut mesh[0], &config(10, 2)).await;
        assert!(matches!(
            result,
            Err(FraktError::Configuration(ConfigurationError::RoleMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn refuses_mismatched_world() {
        let mut mesh = LocalTransport::mesh(3);
        let result = run_worker(&mut mesh[1], &config(10, 2)).await;
        assert!(matches!(
            result,
            Err(FraktError::Configuration(ConfigurationError::WorldSizeMismatch { .. }))
        ));
    }
}
