//! Per-connection session: handshake, subprocess spawn, supervision, reap.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::WriteHalf;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ffremote_config::{rewrite_args, ServerConfig};
use ffremote_core::auth::verify_signature;
use ffremote_core::command::parse_command;
use ffremote_core::{
    read_frame, BoxedConnection, CommandRequest, Frame, FrameSink, MessageType, PROTOCOL_VERSION,
};

use crate::proxy::{forward_output, stdin_proxy};
use crate::registry::ProcessRegistry;

type ConnectionSink = FrameSink<WriteHalf<BoxedConnection>>;

/// Drive one client connection from handshake to teardown.
///
/// Every failure path before the spawn sends an `Error` frame when the
/// connection still permits writing, then closes. After the spawn, exactly
/// one `ExitCode` frame is attempted on the normal path; a session ended by
/// disconnect simply fails that send.
pub async fn handle_connection(
    conn: BoxedConnection,
    remote: String,
    config: Arc<ServerConfig>,
    registry: Arc<ProcessRegistry>,
    token: CancellationToken,
) {
    info!(%remote, "new connection");

    let (mut reader, writer) = tokio::io::split(conn);
    let sink = Arc::new(FrameSink::new(writer));

    // The first frame must be the authenticated command.
    let frame = tokio::select! {
        _ = token.cancelled() => return,
        frame = read_frame(&mut reader) => frame,
    };
    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%remote, error = %e, "error reading initial message");
            return;
        }
    };

    let Some(request) = check_handshake(&frame, &config, &remote, &sink).await else {
        return;
    };

    // Prepare the command: rewrite paths, confirm the binary exists.
    let args = rewrite_args(&request.args, &config.rewrites);
    if !config.ffmpeg_path.exists() {
        error!(%remote, path = %config.ffmpeg_path.display(), "transcoder not found at configured path");
        reject(
            &sink,
            &remote,
            format!("FFmpeg not found at {}", config.ffmpeg_path.display()),
        )
        .await;
        return;
    }

    info!(%remote, path = %config.ffmpeg_path.display(), ?args, "starting transcoder");
    let mut child = match Command::new(&config.ffmpeg_path)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!(%remote, error = %e, "error starting transcoder");
            reject(&sink, &remote, format!("Error starting FFmpeg: {e}")).await;
            return;
        }
    };

    // Each pipe is owned by exactly one proxy task from here on.
    let stdin = child.stdin.take().expect("stdin was requested piped");
    let stdout = child.stdout.take().expect("stdout was requested piped");
    let stderr = child.stderr.take().expect("stderr was requested piped");

    let process_id = registry.register(&remote, child.id(), &args);
    let cmd_token = token.child_token();

    let stdin_task = tokio::spawn(stdin_proxy(
        reader,
        stdin,
        cmd_token.clone(),
        remote.clone(),
    ));
    let stdout_task = tokio::spawn(forward_output(
        stdout,
        sink.clone(),
        MessageType::Stdout,
        cmd_token.clone(),
        config.debug,
        "stdout",
    ));
    let stderr_task = tokio::spawn(forward_output(
        stderr,
        sink.clone(),
        MessageType::Stderr,
        cmd_token.clone(),
        config.debug,
        "stderr",
    ));

    // Reap: wait for exit, racing cancellation. Cancellation (client cancel,
    // disconnect, or server shutdown) kills the subprocess, which is then
    // reaped the same way.
    let status = tokio::select! {
        status = child.wait() => status,
        _ = cmd_token.cancelled() => {
            info!(%remote, id = %process_id, "session cancelled, killing transcoder");
            if let Err(e) = child.kill().await {
                warn!(%remote, error = %e, "failed to kill transcoder");
            }
            child.wait().await
        }
    };

    let exit_code = match status {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            warn!(%remote, error = %e, "error waiting for transcoder");
            1
        }
    };

    // Let the output proxies drain to EOF so the exit frame is the last
    // thing the client sees.
    let _ = stdout_task.await;
    let _ = stderr_task.await;

    info!(%remote, id = %process_id, code = exit_code, "transcoder completed");
    let exit_byte = [(exit_code & 0xff) as u8];
    if let Err(e) = sink.send(MessageType::ExitCode, &exit_byte).await {
        debug!(%remote, error = %e, "could not deliver exit code");
    }

    cmd_token.cancel();
    let _ = stdin_task.await;
    registry.remove(&process_id);
    debug!(%remote, id = %process_id, "session ended");
}

/// Validate the handshake frame. On any failure an `Error` frame is sent and
/// `None` returned; no subprocess is spawned.
async fn check_handshake(
    frame: &Frame,
    config: &ServerConfig,
    remote: &str,
    sink: &ConnectionSink,
) -> Option<CommandRequest> {
    if frame.message_type() != Some(MessageType::Command) {
        warn!(%remote, frame_type = frame.frame_type, "expected command message");
        reject(sink, remote, "Expected command message".to_string()).await;
        return None;
    }

    let request = match parse_command(&frame.payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(%remote, error = %e, "error parsing command message");
            reject(sink, remote, format!("Invalid command message: {e}")).await;
            return None;
        }
    };

    if request.version != PROTOCOL_VERSION {
        warn!(%remote, version = request.version, "unsupported protocol version");
        reject(
            sink,
            remote,
            format!(
                "Unsupported protocol version: got {}, expected {}",
                request.version, PROTOCOL_VERSION
            ),
        )
        .await;
        return None;
    }

    if !verify_signature(&config.auth_secret, &request.signature, &request.args) {
        warn!(%remote, "invalid signature");
        reject(
            sink,
            remote,
            "Authentication failed: invalid signature".to_string(),
        )
        .await;
        return None;
    }

    Some(request)
}

async fn reject(sink: &ConnectionSink, remote: &str, message: String) {
    if let Err(e) = sink.send(MessageType::Error, message.as_bytes()).await {
        warn!(%remote, error = %e, "failed to send error message");
    }
}
