pub mod barrier;
pub mod fragment;
pub mod handshake;
pub mod message_block;
pub mod receipt;
