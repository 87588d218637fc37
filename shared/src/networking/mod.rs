pub mod error;
pub mod local;
pub mod result;
pub mod tcp;
pub mod transport;

use std::{future::Future, time::Duration};

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::fragments::fragment::{fragment_name, Fragment};

use self::{error::TransportError, result::TransportResult};

/// Upper bound on a single frame, well above a 4K canvas of `u32` cells.
pub const MAX_FRAME_LENGTH: u32 = 256 * 1024 * 1024;

/// One frame: `total length | json length | json | data`, lengths as big-endian `u32`.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub message_length: u32,
    pub json_length: u32,
    pub json_message: String,
    pub data: Vec<u8>,
}

impl RawMessage {
    /// Name of the fragment carried by this frame, for diagnostics.
    pub fn kind(&self) -> String {
        fragment_name(&self.json_message).unwrap_or_else(|| "an unnamed message".to_string())
    }

    pub fn parse<T: Fragment>(&self) -> TransportResult<T> {
        T::from_json(&self.json_message).map_err(|_| TransportError::UnexpectedMessage {
            expected: T::NAME,
            found: self.kind(),
        })
    }
}

pub async fn send_message<W>(
    stream: &mut W,
    json_message: &[u8],
    data: Option<&[u8]>,
) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let data_size = data.map_or(0, <[u8]>::len);
    let (total_message_size, json_message_size) = frame_lengths(json_message.len(), data_size)?;

    let mut buffer = Vec::with_capacity(8 + total_message_size as usize);
    buffer.extend_from_slice(&total_message_size.to_be_bytes());
    buffer.extend_from_slice(&json_message_size.to_be_bytes());
    buffer.extend_from_slice(json_message);
    if let Some(data) = data {
        buffer.extend_from_slice(data);
    };

    stream.write_all(&buffer).await?;
    Ok(stream.flush().await?)
}

/// `(total, json)` prefixes of a frame, refused past `MAX_FRAME_LENGTH`.
pub fn frame_lengths(json_length: usize, data_length: usize) -> TransportResult<(u32, u32)> {
    let total = json_length.saturating_add(data_length);
    match (u32::try_from(total), u32::try_from(json_length)) {
        (Ok(total), Ok(json)) if total <= MAX_FRAME_LENGTH => Ok((total, json)),
        _ => Err(TransportError::MalformedFrame(format!(
            "frame of {total} bytes exceeds the {MAX_FRAME_LENGTH} byte limit"
        ))),
    }
}

pub async fn send_fragment<W, T>(stream: &mut W, fragment: &T, data: Option<&[u8]>) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
    T: Fragment,
{
    let serialized_fragment = serde_json::to_string(&fragment.to_json()?)?;
    debug!("Sending {}: {}", T::NAME, serialized_fragment);
    send_message(stream, serialized_fragment.as_bytes(), data).await
}

pub async fn read_message_length<R>(stream: &mut R) -> TransportResult<u32>
where
    R: AsyncRead + Unpin,
{
    let mut length_bytes = [0u8; 4];
    stream.read_exact(&mut length_bytes).await?;
    Ok(u32::from_be_bytes(length_bytes))
}

pub async fn read_json_message<R>(stream: &mut R, length: usize) -> TransportResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut json_message = vec![0u8; length];
    stream.read_exact(&mut json_message).await?;
    String::from_utf8(json_message)
        .map_err(|e| TransportError::MalformedFrame(format!("json header is not utf-8: {e}")))
}

pub async fn read_binary_data<R>(stream: &mut R, length: usize) -> TransportResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut data_message = vec![0u8; length];
    stream.read_exact(&mut data_message).await?;
    Ok(data_message)
}

pub async fn read_message_raw<R>(stream: &mut R) -> TransportResult<RawMessage>
where
    R: AsyncRead + Unpin,
{
    let message_length = read_message_length(stream).await?;
    let json_length = read_message_length(stream).await?;
    if message_length > MAX_FRAME_LENGTH {
        return Err(TransportError::MalformedFrame(format!(
            "frame of {message_length} bytes exceeds the {MAX_FRAME_LENGTH} byte limit"
        )));
    }
    if json_length > message_length {
        return Err(TransportError::MalformedFrame(format!(
            "json header of {json_length} bytes in a frame of {message_length} bytes"
        )));
    }

    let json_message = read_json_message(stream, json_length as usize).await?;
    let data = read_binary_data(stream, (message_length - json_length) as usize).await?;

    Ok(RawMessage {
        message_length,
        json_length,
        json_message,
        data,
    })
}

pub async fn read_fragment<R, T>(stream: &mut R) -> TransportResult<(Vec<u8>, T)>
where
    R: AsyncRead + Unpin,
    T: Fragment,
{
    let raw_message = read_message_raw(stream).await?;
    let fragment = raw_message.parse::<T>()?;
    Ok((raw_message.data, fragment))
}

/// Runs `future`, failing with `TransportError::Timeout` once `deadline` elapses.
pub async fn with_deadline<F, T>(
    deadline: Option<Duration>,
    operation: impl FnOnce() -> String,
    future: F,
) -> TransportResult<T>
where
    F: Future<Output = TransportResult<T>>,
{
    match deadline {
        None => future.await,
        Some(after) => match tokio::time::timeout(after, future).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                operation: operation(),
                after,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fragments::handshake::Hello, rank::Rank};

    #[tokio::test]
    async fn frame_carries_json_and_data() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let hello = Hello {
            rank: Rank(1),
            world_size: 2,
        };

        send_fragment(&mut client, &hello, Some(&[9, 8, 7])).await.unwrap();
        let (data, received) = read_fragment::<_, Hello>(&mut server).await.unwrap();

        assert_eq!(received, hello);
        assert_eq!(data, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn frame_layout_is_length_prefixed() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        send_message(&mut client, b"{}", Some(&[1, 2])).await.unwrap();
        drop(client);

        let mut bytes = Vec::new();
        server.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 4, 0, 0, 0, 2, b'{', b'}', 1, 2]);
    }

    #[tokio::test]
    async fn wrong_fragment_is_reported_by_name() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        send_message(&mut client, br#"{"BarrierRelease":{"participants":3}}"#, None)
            .await
            .unwrap();

        match read_fragment::<_, Hello>(&mut server).await {
            Err(TransportError::UnexpectedMessage { expected, found }) => {
                assert_eq!(expected, "Hello");
                assert_eq!(found, "BarrierRelease");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_inconsistent_lengths() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(&[0, 0, 0, 1, 0, 0, 0, 5]).await.unwrap();

        assert!(matches!(
            read_message_raw(&mut server).await,
            Err(TransportError::MalformedFrame(_))
        ));
    }

    #[test]
    fn frame_lengths_refuse_oversized_frames() {
        assert_eq!(frame_lengths(2, 4).unwrap(), (6, 2));
        assert_eq!(
            frame_lengths(8, MAX_FRAME_LENGTH as usize - 8).unwrap(),
            (MAX_FRAME_LENGTH, 8)
        );
        assert!(matches!(
            frame_lengths(16, MAX_FRAME_LENGTH as usize),
            Err(TransportError::MalformedFrame(_))
        ));
        assert!(matches!(
            frame_lengths(0, usize::MAX),
            Err(TransportError::MalformedFrame(_))
        ));
    }

    #[tokio::test]
    async fn deadline_turns_into_timeout() {
        let pending = std::future::pending::<TransportResult<()>>();
        let result = with_deadline(Some(Duration::from_millis(10)), || "barrier".to_string(), pending).await;
        assert!(matches!(result, Err(TransportError::Timeout { .. })));
    }
}
