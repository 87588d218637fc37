use std::future::Future;

use crate::models::{fragments::message_block::MessageBlock, rank::Rank};

use super::result::TransportResult;

/// Blocking point-to-point exchange between ranks, plus a barrier.
///
/// `send` completes only once the destination has taken the block, so a
/// returned `Ok` means the data has been handed over. There is no gather or
/// reduce collective: callers assemble results from individual `receive`s.
pub trait Transport: Send {
    fn rank(&self) -> Rank;

    fn world_size(&self) -> u32;

    fn send(
        &mut self,
        destination: Rank,
        block: MessageBlock,
    ) -> impl Future<Output = TransportResult<()>> + Send;

    fn receive(&mut self, source: Rank) -> impl Future<Output = TransportResult<MessageBlock>> + Send;

    /// Returns once every rank of the world has called `barrier`.
    fn barrier(&mut self) -> impl Future<Output = TransportResult<()>> + Send;
}
