//! Wire codec: length-prefixed frames on a byte stream.
//!
//! Frame format (big-endian): `Type:u8 | Length:u32 | Payload:Length bytes`.
//! No magic number and no checksum; the transport is assumed reliable and
//! in-order.

use byteorder::{BigEndian, ByteOrder};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::message::{Frame, MessageType, MAX_PAYLOAD_SIZE};

/// Type tag plus payload length prefix.
const HEADER_LEN: usize = 5;

/// Read one frame from the stream.
///
/// Reads exactly [`HEADER_LEN`] header bytes and then exactly as many payload
/// bytes as the header announces. A clean EOF (zero header bytes read) is
/// reported as [`Error::ConnectionClosed`] so callers can distinguish a peer
/// hangup from a truncated frame.
///
/// A payload length above [`MAX_PAYLOAD_SIZE`] fails with
/// [`Error::OversizedPayload`] without consuming any payload bytes; the
/// stream is unrecoverable after that.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Err(Error::ConnectionClosed);
            }
            return Err(Error::ShortRead("frame header"));
        }
        filled += n;
    }

    let length = BigEndian::read_u32(&header[1..]) as usize;
    if length > MAX_PAYLOAD_SIZE {
        return Err(Error::OversizedPayload {
            length,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut payload = vec![0u8; length];
    if length > 0 {
        reader.read_exact(&mut payload).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::ShortRead("frame payload")
            } else {
                Error::Io(e)
            }
        })?;
    }

    Ok(Frame {
        frame_type: header[0],
        payload,
    })
}

/// Write one frame to the stream: header first, then the payload if any.
///
/// The codec does not buffer or coalesce; a frame may hit the transport as
/// two writes. Callers on a shared connection must serialize sends (see
/// [`FrameSink`]) so the two writes of one frame are never interleaved with
/// another task's.
pub async fn write_frame<W>(writer: &mut W, message_type: MessageType, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::OversizedPayload {
            length: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut header = [0u8; HEADER_LEN];
    header[0] = message_type.as_byte();
    BigEndian::write_u32(&mut header[1..], payload.len() as u32);

    writer.write_all(&header).await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;

    Ok(())
}

/// Serialized write access to one side of a connection.
///
/// Wraps the write half in an async mutex so concurrent tasks (output
/// proxies, signal handlers, stdin pumps) emit whole frames without
/// interleaving.
pub struct FrameSink<W> {
    writer: Mutex<W>,
}

impl<W> FrameSink<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Send one frame, holding the writer for the duration of the send.
    pub async fn send(&self, message_type: MessageType, payload: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, message_type, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_all_types() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        for tag in 1..=8u8 {
            let message_type = MessageType::from_byte(tag).unwrap();
            write_frame(&mut client, message_type, b"payload")
                .await
                .unwrap();
            let frame = read_frame(&mut server).await.unwrap();
            assert_eq!(frame.frame_type, tag);
            assert_eq!(frame.payload, b"payload");
        }
    }

    #[tokio::test]
    async fn test_empty_payload() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, MessageType::StdinClose, &[])
            .await
            .unwrap();
        let frame = read_frame(&mut server).await.unwrap();
        assert_eq!(frame.message_type(), Some(MessageType::StdinClose));
        assert!(frame.payload.is_empty());
    }

    #[tokio::test]
    async fn test_clean_eof_is_connection_closed() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_partial_header_is_short_read() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&[2, 0, 0]).await.unwrap();
        drop(client);
        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::ShortRead("frame header")));
    }

    #[tokio::test]
    async fn test_truncated_payload_is_short_read() {
        let (mut client, mut server) = tokio::io::duplex(64);
        // Header announces 10 payload bytes but only 4 arrive.
        client.write_all(&[2, 0, 0, 0, 10]).await.unwrap();
        client.write_all(b"abcd").await.unwrap();
        drop(client);
        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::ShortRead("frame payload")));
    }

    #[tokio::test]
    async fn test_oversized_length_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let mut header = [0u8; 5];
        header[0] = MessageType::Stdout.as_byte();
        BigEndian::write_u32(&mut header[1..], 200 * 1024 * 1024);
        client.write_all(&header).await.unwrap();
        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(
            err,
            Error::OversizedPayload { length, max }
                if length == 200 * 1024 * 1024 && max == MAX_PAYLOAD_SIZE
        ));
    }

    #[tokio::test]
    async fn test_payload_at_limit_accepted() {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        let writer = tokio::spawn(async move {
            let mut header = [0u8; 5];
            header[0] = MessageType::Stdout.as_byte();
            BigEndian::write_u32(&mut header[1..], MAX_PAYLOAD_SIZE as u32);
            client.write_all(&header).await.unwrap();
            let chunk = vec![0xAB; 1024 * 1024];
            for _ in 0..100 {
                client.write_all(&chunk).await.unwrap();
            }
        });
        let frame = read_frame(&mut server).await.unwrap();
        assert_eq!(frame.payload.len(), MAX_PAYLOAD_SIZE);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_over_limit_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let mut header = [0u8; 5];
        header[0] = MessageType::Stdout.as_byte();
        BigEndian::write_u32(&mut header[1..], (MAX_PAYLOAD_SIZE + 1) as u32);
        client.write_all(&header).await.unwrap();
        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, Error::OversizedPayload { .. }));
    }

    #[tokio::test]
    async fn test_sink_serializes_frames() {
        let (client, mut server) = tokio::io::duplex(4096);
        let sink = std::sync::Arc::new(FrameSink::new(client));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                sink.send(MessageType::Stdout, b"chunk").await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        for _ in 0..8 {
            let frame = read_frame(&mut server).await.unwrap();
            assert_eq!(frame.message_type(), Some(MessageType::Stdout));
            assert_eq!(frame.payload, b"chunk");
        }
    }
}
