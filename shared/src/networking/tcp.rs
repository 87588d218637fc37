//! Multi-process transport: a star of TCP links around the coordinator.
//!
//! Workers connect to rank 0 and introduce themselves with `Hello`. Blocks
//! travel in the frame format of [`super::send_message`] and are answered by
//! a `BlockReceipt`; the barrier is a round of `BarrierArrival` messages
//! answered by one `BarrierRelease` per worker.

use std::{collections::BTreeMap, net::SocketAddr, time::Duration};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream},
};

use crate::models::{
    config::{ConfigurationError, RenderConfig},
    fragments::{
        barrier::{BarrierArrival, BarrierRelease},
        handshake::Hello,
        message_block::{BlockHeader, MessageBlock},
        receipt::BlockReceipt,
    },
    partition::partition_all,
    rank::Rank,
};

use super::{
    error::TransportError, read_fragment, read_message_raw, result::TransportResult,
    send_fragment, transport::Transport, with_deadline, MAX_FRAME_LENGTH,
};

/// Upper bound on the JSON header of a block frame.
const BLOCK_HEADER_BOUND: u64 = 256;

/// How long a worker keeps knocking before the coordinator is declared absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRetry {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ConnectRetry {
    fn default() -> Self {
        Self {
            attempts: 50,
            interval: Duration::from_millis(100),
        }
    }
}

/// Fails when some worker's rows would not fit in one frame, so the run
/// stops before anything is computed.
pub fn check_frame_capacity(config: &RenderConfig) -> Result<(), ConfigurationError> {
    let ranges = partition_all(config.grid.height, config.worker_count)?;
    for (rank, range) in Rank::all(config.worker_count).zip(ranges).skip(1) {
        let bytes = u64::from(range.len()) * u64::from(config.grid.width) * 4 + BLOCK_HEADER_BOUND;
        if bytes > u64::from(MAX_FRAME_LENGTH) {
            return Err(ConfigurationError::BlockTooLarge {
                rank,
                bytes,
                limit: MAX_FRAME_LENGTH,
            });
        }
    }
    Ok(())
}

/// Rank 0 end of the star: one stream per worker, keyed by rank.
pub struct TcpCoordinator {
    world_size: u32,
    workers: BTreeMap<Rank, TcpStream>,
    receive_timeout: Option<Duration>,
}

impl TcpCoordinator {
    pub async fn listen(addr: &str) -> TransportResult<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        info!("Coordinator listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Waits until each of ranks `1..world_size` has connected exactly once.
    pub async fn accept_workers(
        listener: TcpListener,
        world_size: u32,
        receive_timeout: Option<Duration>,
    ) -> TransportResult<Self> {
        let mut workers = BTreeMap::new();

        while workers.len() + 1 < world_size as usize {
            let (mut stream, peer) = with_deadline(
                receive_timeout,
                || format!("waiting for {} more workers", world_size as usize - 1 - workers.len()),
                async { Ok::<_, TransportError>(listener.accept().await?) },
            )
            .await?;

            let hello = with_deadline(receive_timeout, || format!("handshake with {peer}"), async {
                let (_, hello) = read_fragment::<_, Hello>(&mut stream).await?;
                Ok::<_, TransportError>(hello)
            })
            .await?;

            check_hello(&hello, world_size, &peer)?;
            if workers.contains_key(&hello.rank) {
                error!("{} connected twice, second time from {}", hello.rank, peer);
                return Err(TransportError::DuplicateRank { rank: hello.rank });
            }

            stream.set_nodelay(true)?;
            info!("{} joined from {}", hello.rank, peer);
            workers.insert(hello.rank, stream);
        }

        info!("All {} workers connected", workers.len());
        Ok(Self {
            world_size,
            workers,
            receive_timeout,
        })
    }

    fn stream(&mut self, peer: Rank) -> TransportResult<&mut TcpStream> {
        self.workers
            .get_mut(&peer)
            .ok_or(TransportError::UnreachablePeer {
                from: Rank::COORDINATOR,
                peer,
            })
    }
}

fn check_hello(hello: &Hello, world_size: u32, peer: &SocketAddr) -> TransportResult<()> {
    if hello.world_size != world_size {
        error!(
            "{} from {} expects {} participants instead of {}",
            hello.rank, peer, hello.world_size, world_size
        );
        return Err(TransportError::WorldSizeMismatch {
            rank: hello.rank,
            expected: world_size,
            found: hello.world_size,
        });
    }
    if hello.rank.is_coordinator() || hello.rank.0 >= world_size {
        return Err(TransportError::RankOutOfRange {
            rank: hello.rank,
            world_size,
        });
    }
    Ok(())
}

impl Transport for TcpCoordinator {
    fn rank(&self) -> Rank {
        Rank::COORDINATOR
    }

    fn world_size(&self) -> u32 {
        self.world_size
    }

    async fn send(&mut self, destination: Rank, block: MessageBlock) -> TransportResult<()> {
        let receive_timeout = self.receive_timeout;
        let stream = self.stream(destination)?;
        send_block(stream, &block, destination, receive_timeout).await
    }

    async fn receive(&mut self, source: Rank) -> TransportResult<MessageBlock> {
        let receive_timeout = self.receive_timeout;
        let stream = self.stream(source)?;
        receive_block(stream, Rank::COORDINATOR, source, receive_timeout).await
    }

    async fn barrier(&mut self) -> TransportResult<()> {
        let receive_timeout = self.receive_timeout;

        for (&rank, stream) in self.workers.iter_mut() {
            let arrival = with_deadline(receive_timeout, || format!("barrier arrival of {rank}"), async {
                let (_, arrival) = read_fragment::<_, BarrierArrival>(stream).await?;
                Ok::<_, TransportError>(arrival)
            })
            .await
            .map_err(|e| e.from_peer(rank))?;

            if arrival.rank != rank {
                return Err(TransportError::MalformedFrame(format!(
                    "barrier arrival for {} on the link of {}",
                    arrival.rank, rank
                )));
            }
            debug!("{} reached the barrier", rank);
        }

        let release = BarrierRelease {
            participants: self.world_size,
        };
        for (&rank, stream) in self.workers.iter_mut() {
            send_fragment(stream, &release, None)
                .await
                .map_err(|e| e.from_peer(rank))?;
        }

        debug!("Barrier released for {} participants", self.world_size);
        Ok(())
    }
}

/// Worker end of the star: a single link to rank 0.
pub struct TcpWorker {
    rank: Rank,
    world_size: u32,
    stream: TcpStream,
    receive_timeout: Option<Duration>,
}

impl TcpWorker {
    pub async fn connect(
        addr: &str,
        rank: Rank,
        world_size: u32,
        retry: ConnectRetry,
    ) -> TransportResult<Self> {
        if rank.is_coordinator() || rank.0 >= world_size {
            return Err(TransportError::RankOutOfRange { rank, world_size });
        }

        let mut stream = connect_to_coordinator(addr, retry).await?;
        stream.set_nodelay(true)?;
        send_fragment(&mut stream, &Hello { rank, world_size }, None)
            .await
            .map_err(|e| e.from_peer(Rank::COORDINATOR))?;
        info!("{} connected to coordinator at {}", rank, addr);

        Ok(Self {
            rank,
            world_size,
            stream,
            receive_timeout: None,
        })
    }

    pub fn with_receive_timeout(mut self, receive_timeout: Option<Duration>) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    fn check_peer(&self, peer: Rank) -> TransportResult<()> {
        if !peer.is_coordinator() {
            return Err(TransportError::UnreachablePeer {
                from: self.rank,
                peer,
            });
        }
        Ok(())
    }
}

async fn connect_to_coordinator(addr: &str, retry: ConnectRetry) -> TransportResult<TcpStream> {
    let mut attempt = 1;
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt < retry.attempts => {
                debug!("Connection attempt {} to {} failed: {}", attempt, addr, e);
                attempt += 1;
                tokio::time::sleep(retry.interval).await;
            }
            Err(e) => {
                error!("Failed to connect to coordinator at {}: {}", addr, e);
                return Err(e.into());
            }
        }
    }
}

impl Transport for TcpWorker {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> u32 {
        self.world_size
    }

    async fn send(&mut self, destination: Rank, block: MessageBlock) -> TransportResult<()> {
        self.check_peer(destination)?;
        send_block(&mut self.stream, &block, destination, self.receive_timeout).await
    }

    async fn receive(&mut self, source: Rank) -> TransportResult<MessageBlock> {
        self.check_peer(source)?;
        receive_block(&mut self.stream, self.rank, source, self.receive_timeout).await
    }

    async fn barrier(&mut self) -> TransportResult<()> {
        let rank = self.rank;
        send_fragment(&mut self.stream, &BarrierArrival { rank }, None)
            .await
            .map_err(|e| e.from_peer(Rank::COORDINATOR))?;

        let stream = &mut self.stream;
        let release = with_deadline(self.receive_timeout, || "barrier release".to_string(), async {
            let (_, release) = read_fragment::<_, BarrierRelease>(stream).await?;
            Ok::<_, TransportError>(release)
        })
        .await
        .map_err(|e| e.from_peer(Rank::COORDINATOR))?;

        debug!("{} released from barrier of {}", rank, release.participants);
        Ok(())
    }
}

/// Writes `block` and waits for the peer to acknowledge it.
async fn send_block<S>(
    stream: &mut S,
    block: &MessageBlock,
    peer: Rank,
    receive_timeout: Option<Duration>,
) -> TransportResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let data = block.encode_cells();
    send_fragment(stream, &block.header(), Some(&data))
        .await
        .map_err(|e| e.from_peer(peer))?;
    debug!("Rows {} sent to {}, awaiting receipt", block.range, peer);

    let receipt = with_deadline(receive_timeout, || format!("receipt from {peer}"), async {
        let (_, receipt) = read_fragment::<_, BlockReceipt>(stream).await?;
        Ok::<_, TransportError>(receipt)
    })
    .await
    .map_err(|e| e.from_peer(peer))?;

    if receipt.rank != peer {
        warn!("Receipt for rows {} signed by {} instead of {}", block.range, receipt.rank, peer);
    }
    Ok(())
}

/// Reads one block from `peer` and acknowledges it.
async fn receive_block<S>(
    stream: &mut S,
    rank: Rank,
    peer: Rank,
    receive_timeout: Option<Duration>,
) -> TransportResult<MessageBlock>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let raw_message = with_deadline(receive_timeout, || format!("receive from {peer}"), async {
        read_message_raw(stream).await
    })
    .await
    .map_err(|e| e.from_peer(peer))?;

    let header = raw_message.parse::<BlockHeader>()?;
    let block = MessageBlock::from_parts(header, &raw_message.data)?;
    debug!("Rows {} received from {}", block.range, peer);

    send_fragment(stream, &BlockReceipt { rank }, None)
        .await
        .map_err(|e| e.from_peer(peer))?;
    Ok(block)
}
