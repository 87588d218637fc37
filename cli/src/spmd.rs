//! Every rank runs the same program and branches on its rank only.

use log::{error, info};
use shared::{
    dtos::run_report::RunReport,
    error::FraktResult,
    graphics::OutputSettings,
    models::{config::RenderConfig, rank::Rank},
    networking::{
        local::LocalTransport,
        tcp::{check_frame_capacity, ConnectRetry, TcpCoordinator, TcpWorker},
        transport::Transport,
    },
};

use crate::commands::{local::LocalCommand, run::RunCommand};

/// Rank 0 gathers and returns the report; every other rank returns `None`
/// once its rows have been delivered.
pub async fn run_rank<T: Transport>(
    transport: &mut T,
    config: &RenderConfig,
    output: &OutputSettings,
) -> FraktResult<Option<RunReport>> {
    if transport.rank().is_coordinator() {
        coordinator::run_coordinator(transport, config, output)
            .await
            .map(Some)
    } else {
        worker::run_worker(transport, config).await.map(|_| None)
    }
}

/// One process of a multi-process run, linked to the others over TCP.
pub async fn run_tcp(command: &RunCommand) -> FraktResult<Option<RunReport>> {
    // configuration errors surface before any socket is opened
    let config = command.render.config()?;
    let output = command.render.output();
    let receive_timeout = command.render.receive_timeout()?;
    let rank = Rank(command.rank);
    config.check_rank(rank)?;
    check_frame_capacity(&config)?;

    if rank.is_coordinator() {
        let listener = TcpCoordinator::listen(&command.address).await?;
        let mut transport =
            TcpCoordinator::accept_workers(listener, config.worker_count, receive_timeout).await?;
        run_rank(&mut transport, &config, &output).await
    } else {
        let retry = ConnectRetry {
            attempts: command.connect_attempts.max(1),
            interval: command.connect_interval(),
        };
        let mut transport = TcpWorker::connect(&command.address, rank, config.worker_count, retry)
            .await?
            .with_receive_timeout(receive_timeout);
        run_rank(&mut transport, &config, &output).await
    }
}

/// All ranks as tasks of this process.
pub async fn run_local(command: &LocalCommand) -> FraktResult<Option<RunReport>> {
    let config = command.render.config()?;
    let output = command.render.output();
    let receive_timeout = command.render.receive_timeout()?;
    info!(
        "Rendering {}x{} with {} local ranks",
        config.grid.width, config.grid.height, config.worker_count
    );

    let mut endpoints = LocalTransport::mesh(config.worker_count)
        .into_iter()
        .map(|endpoint| endpoint.with_receive_timeout(receive_timeout));
    let mut coordinator = match endpoints.next() {
        Some(endpoint) => endpoint,
        None => return Ok(None),
    };

    let workers: Vec<_> = endpoints
        .map(|mut endpoint| {
            let output = output.clone();
            tokio::spawn(async move { run_rank(&mut endpoint, &config, &output).await })
        })
        .collect();

    let report = run_rank(&mut coordinator, &config, &output).await;
    // unblocks workers still waiting on a receipt if the gather stopped early
    drop(coordinator);

    for handle in workers {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Worker failed: {}", e),
            Err(e) => error!("Worker task aborted: {}", e),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use shared::{error::FraktError, models::config::ConfigurationError};

    fn run_command(args: &[&str]) -> RunCommand {
        let base = ["run", "--width", "64", "--height", "48", "--iteration-limit", "50"];
        RunCommand::try_parse_from(base.iter().chain(args)).unwrap()
    }

    #[tokio::test]
    async fn rank_outside_the_world_is_a_configuration_error() {
        let command = run_command(&["--worker-count", "4", "--rank", "9"]);
        assert!(matches!(
            run_tcp(&command).await,
            Err(FraktError::Configuration(ConfigurationError::RankOutOfRange {
                rank: Rank(9),
                worker_count: 4
            }))
        ));
    }

    #[tokio::test]
    async fn oversized_blocks_are_refused_before_connecting() {
        let command = RunCommand::try_parse_from([
            "run", "--width", "16384", "--height", "8194", "--iteration-limit", "10",
            "--worker-count", "2", "--rank", "1", "--connect-attempts", "1",
        ])
        .unwrap();
        assert!(matches!(
            run_tcp(&command).await,
            Err(FraktError::Configuration(ConfigurationError::BlockTooLarge { .. }))
        ));
    }

    #[tokio::test]
    async fn local_run_gathers_every_rank() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("local.ppm");
        let command = LocalCommand::try_parse_from([
            "local", "--width", "32", "--height", "24", "--iteration-limit", "40",
            "--worker-count", "3", "--output", output.to_str().unwrap(),
        ])
        .unwrap();

        let report = run_local(&command).await.unwrap().unwrap();
        assert_eq!(report.worker_count, 3);
        assert!(output.exists());
    }
}
