//! In-process transport: every rank is a task, every link a bounded channel.

use std::{collections::HashMap, sync::Arc, time::Duration};

use log::debug;
use tokio::sync::{mpsc, oneshot, Barrier};

use crate::models::{fragments::message_block::MessageBlock, rank::Rank};

use super::{error::TransportError, result::TransportResult, transport::Transport, with_deadline};

struct Envelope {
    block: MessageBlock,
    receipt: oneshot::Sender<()>,
}

pub struct LocalTransport {
    rank: Rank,
    world_size: u32,
    outboxes: HashMap<Rank, mpsc::Sender<Envelope>>,
    inboxes: HashMap<Rank, mpsc::Receiver<Envelope>>,
    barrier: Arc<Barrier>,
    receive_timeout: Option<Duration>,
}

impl LocalTransport {
    /// One connected endpoint per rank, indexed by rank.
    pub fn mesh(world_size: u32) -> Vec<LocalTransport> {
        let barrier = Arc::new(Barrier::new(world_size as usize));
        let mut endpoints: Vec<LocalTransport> = Rank::all(world_size)
            .map(|rank| LocalTransport {
                rank,
                world_size,
                outboxes: HashMap::new(),
                inboxes: HashMap::new(),
                barrier: Arc::clone(&barrier),
                receive_timeout: None,
            })
            .collect();

        for source in Rank::all(world_size) {
            for destination in Rank::all(world_size).filter(|&rank| rank != source) {
                let (tx, rx) = mpsc::channel(1);
                endpoints[source.index()].outboxes.insert(destination, tx);
                endpoints[destination.index()].inboxes.insert(source, rx);
            }
        }

        endpoints
    }

    pub fn with_receive_timeout(mut self, receive_timeout: Option<Duration>) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }
}

impl Transport for LocalTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> u32 {
        self.world_size
    }

    async fn send(&mut self, destination: Rank, block: MessageBlock) -> TransportResult<()> {
        let outbox = self
            .outboxes
            .get(&destination)
            .ok_or(TransportError::UnreachablePeer {
                from: self.rank,
                peer: destination,
            })?;

        let (receipt, accepted) = oneshot::channel();
        debug!("{} sending rows {} to {}", self.rank, block.range, destination);
        outbox
            .send(Envelope { block, receipt })
            .await
            .map_err(|_| TransportError::Disconnected { peer: destination })?;

        with_deadline(
            self.receive_timeout,
            || format!("receipt from {destination}"),
            async {
                accepted
                    .await
                    .map_err(|_| TransportError::Disconnected { peer: destination })
            },
        )
        .await
    }

    async fn receive(&mut self, source: Rank) -> TransportResult<MessageBlock> {
        let from = self.rank;
        let inbox = self
            .inboxes
            .get_mut(&source)
            .ok_or(TransportError::UnreachablePeer { from, peer: source })?;

        let envelope = with_deadline(
            self.receive_timeout,
            || format!("receive from {source}"),
            async {
                inbox
                    .recv()
                    .await
                    .ok_or(TransportError::Disconnected { peer: source })
            },
        )
        .await?;

        // The sender may have given up already; the block is ours either way.
        let _ = envelope.receipt.send(());
        Ok(envelope.block)
    }

    async fn barrier(&mut self) -> TransportResult<()> {
        let barrier = Arc::clone(&self.barrier);
        with_deadline(self.receive_timeout, || "barrier".to_string(), async move {
            barrier.wait().await;
            Ok::<_, TransportError>(())
        })
        .await
    }
}
