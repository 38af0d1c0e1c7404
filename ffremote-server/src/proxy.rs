//! Session proxies: client frames to subprocess stdin, subprocess output to
//! client frames.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::ChildStdin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ffremote_core::{read_frame, Error as ProtocolError, FrameSink, MessageType};

/// Forward `Stdin` frames from the client into the subprocess, and watch for
/// control frames.
///
/// The proxy keeps running after `StdinClose` so the client can still cancel,
/// and a client disconnect implies cancellation: a subprocess that keeps
/// running after the client vanishes is a leak. All stdin-pipe access happens
/// in this one task, so closing the pipe is just dropping the handle.
pub(crate) async fn stdin_proxy<R>(
    mut reader: R,
    stdin: ChildStdin,
    token: CancellationToken,
    remote: String,
) where
    R: AsyncRead + Unpin,
{
    let mut stdin = Some(stdin);
    debug!(%remote, "stdin proxy started");

    loop {
        let frame = tokio::select! {
            _ = token.cancelled() => {
                debug!(%remote, "stdin proxy stopping: session cancelled");
                return;
            }
            frame = read_frame(&mut reader) => frame,
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(ProtocolError::ConnectionClosed) => {
                info!(%remote, "client closed connection, cancelling command");
                token.cancel();
                return;
            }
            Err(e) => {
                warn!(%remote, error = %e, "error reading from client, cancelling command");
                token.cancel();
                return;
            }
        };

        match frame.message_type() {
            Some(MessageType::Stdin) => match stdin.as_mut() {
                Some(pipe) => {
                    if let Err(e) = pipe.write_all(&frame.payload).await {
                        warn!(
                            %remote,
                            error = %e,
                            bytes = frame.payload.len(),
                            "error writing to transcoder stdin"
                        );
                        return;
                    }
                }
                None => {
                    debug!(%remote, "received stdin data after close, discarding");
                }
            },
            Some(MessageType::StdinClose) => {
                // Dropping the handle closes the pipe; the subprocess sees
                // EOF. Keep looping so a later Cancel is still honored.
                if stdin.take().is_some() {
                    debug!(%remote, "stdin closed, monitoring for cancellation");
                }
            }
            Some(MessageType::Cancel) => {
                info!(%remote, "cancellation requested by client");
                token.cancel();
                return;
            }
            _ => {
                debug!(
                    %remote,
                    frame_type = frame.frame_type,
                    "unexpected message type on stdin channel"
                );
            }
        }
    }
}

/// Stream one subprocess pipe to the client as frames of the given type.
///
/// The cancellation token is checked before each read; output proxies drain
/// to EOF but never trigger cancellation themselves. With `debug_mirror` set,
/// every chunk is also written to the server log.
pub(crate) async fn forward_output<R, W>(
    mut source: R,
    sink: Arc<FrameSink<W>>,
    message_type: MessageType,
    token: CancellationToken,
    debug_mirror: bool,
    stream_name: &'static str,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; 4096];

    loop {
        let read = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(stream = stream_name, "output proxy stopping: session cancelled");
                return;
            }
            read = source.read(&mut buffer) => read,
        };

        match read {
            Ok(0) => {
                debug!(stream = stream_name, "transcoder closed its pipe");
                return;
            }
            Ok(n) => {
                if debug_mirror {
                    debug!(stream = stream_name, "{}", String::from_utf8_lossy(&buffer[..n]));
                }
                if let Err(e) = sink.send(message_type, &buffer[..n]).await {
                    debug!(
                        stream = stream_name,
                        error = %e,
                        "output proxy stopping: send failed"
                    );
                    return;
                }
            }
            Err(e) => {
                warn!(stream = stream_name, error = %e, "error reading transcoder output");
                return;
            }
        }
    }
}
