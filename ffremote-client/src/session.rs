//! Client session: command handshake, stdin pump, and the server frame loop.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ffremote_core::command::encode_command;
use ffremote_core::{read_frame, BoxedConnection, Error as ProtocolError, FrameSink, MessageType};

type Sink = FrameSink<WriteHalf<BoxedConnection>>;

/// Run one session over an established connection: send the authenticated
/// command, pump stdin upward and server frames downward, and return the
/// remote exit code.
pub async fn run(
    conn: BoxedConnection,
    auth_secret: &str,
    remote_args: &[String],
) -> anyhow::Result<i32> {
    let (mut reader, writer) = tokio::io::split(conn);
    let sink = Arc::new(FrameSink::new(writer));

    let payload = encode_command(auth_secret, remote_args)?;
    sink.send(MessageType::Command, &payload)
        .await
        .context("failed to send command")?;
    info!(args = ?remote_args, "command sent");

    let token = CancellationToken::new();
    tokio::spawn(watch_signals(sink.clone(), token.clone()));
    let pump = tokio::spawn(pump_stdin(sink.clone(), token.clone()));

    let outcome = read_server_frames(&mut reader, &token).await;

    // Stop the pump (it may still be blocked on a terminal-less stdin) and
    // wait for it so its final StdinClose is on the wire before we drop the
    // connection.
    token.cancel();
    let _ = pump.await;

    outcome
}

/// First interrupt: tell the server to cancel, then cancel the session.
/// Second interrupt: force exit with the conventional SIGINT status.
async fn watch_signals(sink: Arc<Sink>, token: CancellationToken) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    eprintln!("Received interrupt signal, cancelling...");
    // Send the cancel frame before cancelling the session so the server is
    // notified even if the frame loop has not started reading yet.
    if let Err(e) = sink.send(MessageType::Cancel, &[]).await {
        debug!(error = %e, "failed to send cancel frame");
    }
    token.cancel();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    eprintln!("Received second interrupt signal, forcing exit...");
    std::process::exit(130);
}

/// Forward local stdin to the server in 4 KiB chunks.
///
/// A terminal stdin is never forwarded; the server just sees an immediate
/// close. The pump also closes stdin on session cancellation so the remote
/// process observes EOF.
async fn pump_stdin(sink: Arc<Sink>, token: CancellationToken) {
    if std::io::stdin().is_terminal() {
        debug!("stdin is a terminal, not forwarding");
        send_stdin_close(&sink).await;
        return;
    }

    debug!("forwarding stdin to server");
    let mut stdin = tokio::io::stdin();
    let mut buffer = vec![0u8; 4096];

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("session cancelled, closing stdin");
                send_stdin_close(&sink).await;
                return;
            }
            read = stdin.read(&mut buffer) => match read {
                Ok(0) => {
                    debug!("reached end of stdin");
                    send_stdin_close(&sink).await;
                    return;
                }
                Ok(n) => {
                    if let Err(e) = sink.send(MessageType::Stdin, &buffer[..n]).await {
                        warn!(error = %e, "error sending stdin data");
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "error reading from stdin");
                    send_stdin_close(&sink).await;
                    return;
                }
            }
        }
    }
}

async fn send_stdin_close(sink: &Sink) {
    if let Err(e) = sink.send(MessageType::StdinClose, &[]).await {
        debug!(error = %e, "failed to send stdin close");
    }
}

/// Dispatch server frames until an exit code, an error, or a disconnect.
async fn read_server_frames<R>(reader: &mut R, token: &CancellationToken) -> anyhow::Result<i32>
where
    R: AsyncRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    loop {
        let frame = tokio::select! {
            _ = token.cancelled() => bail!("operation cancelled"),
            frame = read_frame(reader) => frame,
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(ProtocolError::ConnectionClosed) => {
                bail!("connection closed by server without exit code")
            }
            Err(e) => return Err(e).context("error reading server message"),
        };

        match frame.message_type() {
            Some(MessageType::Stdout) => {
                stdout.write_all(&frame.payload).await?;
                stdout.flush().await?;
            }
            Some(MessageType::Stderr) => {
                stderr.write_all(&frame.payload).await?;
                stderr.flush().await?;
            }
            Some(MessageType::ExitCode) => {
                let code = frame.payload.first().copied().unwrap_or(0);
                info!(code, "received exit code from server");
                return Ok(i32::from(code));
            }
            Some(MessageType::Error) => {
                bail!("server error: {}", String::from_utf8_lossy(&frame.payload))
            }
            _ => {
                debug!(frame_type = frame.frame_type, "ignoring unexpected message type");
            }
        }
    }
}
