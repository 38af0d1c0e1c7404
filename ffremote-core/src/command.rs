//! Command payload layout.
//!
//! The payload of a [`MessageType::Command`](crate::MessageType::Command)
//! frame is `Version:u8 ‖ Signature:64 hex bytes ‖ Args`, where `Args` is the
//! null-joined argument vector with no trailing null.

use crate::auth::calculate_signature;
use crate::error::{Error, Result};
use crate::message::{PROTOCOL_VERSION, SIGNATURE_LENGTH};

/// A parsed command handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub version: u8,
    pub signature: String,
    pub args: Vec<String>,
}

/// Build a command payload, signing the argument vector with the secret.
pub fn encode_command(auth_secret: &str, args: &[String]) -> Result<Vec<u8>> {
    if args.is_empty() {
        return Err(Error::MalformedCommand(
            "no arguments provided for command".into(),
        ));
    }

    let signature = calculate_signature(auth_secret, args);
    let args_len: usize = args.iter().map(|a| a.len() + 1).sum();

    let mut payload = Vec::with_capacity(1 + SIGNATURE_LENGTH + args_len);
    payload.push(PROTOCOL_VERSION);
    payload.extend_from_slice(signature.as_bytes());
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            payload.push(0);
        }
        payload.extend_from_slice(arg.as_bytes());
    }

    Ok(payload)
}

/// Parse a command payload into its components.
///
/// The version byte is returned as-is; rejecting a mismatched version is the
/// caller's decision. A payload of exactly 65 bytes carries an empty argument
/// vector; anything shorter is malformed.
pub fn parse_command(payload: &[u8]) -> Result<CommandRequest> {
    if payload.len() < 1 + SIGNATURE_LENGTH {
        return Err(Error::MalformedCommand(format!(
            "payload length {} is too short (minimum required: {})",
            payload.len(),
            1 + SIGNATURE_LENGTH
        )));
    }

    let version = payload[0];

    let signature = std::str::from_utf8(&payload[1..1 + SIGNATURE_LENGTH])
        .map_err(|_| Error::MalformedCommand("signature is not valid ASCII".into()))?
        .to_string();

    let args_part = &payload[1 + SIGNATURE_LENGTH..];
    let mut args = Vec::new();
    if !args_part.is_empty() {
        for chunk in args_part.split(|b| *b == 0) {
            let arg = String::from_utf8(chunk.to_vec())
                .map_err(|_| Error::MalformedCommand("argument is not valid UTF-8".into()))?;
            args.push(arg);
        }
    }

    Ok(CommandRequest {
        version,
        signature,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_signature;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_roundtrip() {
        let command = args(&["-i", "input file.mkv", "-c:v", "libx264", "out.mp4"]);
        let payload = encode_command("secret", &command).unwrap();
        let parsed = parse_command(&payload).unwrap();
        assert_eq!(parsed.version, PROTOCOL_VERSION);
        assert_eq!(parsed.args, command);
        assert!(verify_signature("secret", &parsed.signature, &parsed.args));
    }

    #[test]
    fn test_roundtrip_awkward_args() {
        // Newlines, spaces and non-ASCII all survive the null-joined layout.
        let command = args(&["-metadata", "title=multi\nline", "départ.mp4", ""]);
        let payload = encode_command("secret", &command).unwrap();
        assert_eq!(parse_command(&payload).unwrap().args, command);
    }

    #[test]
    fn test_empty_args_rejected_on_encode() {
        assert!(matches!(
            encode_command("secret", &[]),
            Err(Error::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_minimum_payload_boundary() {
        // 65 bytes parses with an empty argument vector; 64 does not parse.
        let mut payload = vec![PROTOCOL_VERSION];
        payload.extend_from_slice(&[b'0'; SIGNATURE_LENGTH]);
        assert_eq!(payload.len(), 65);
        let parsed = parse_command(&payload).unwrap();
        assert!(parsed.args.is_empty());

        payload.pop();
        assert!(matches!(
            parse_command(&payload),
            Err(Error::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_version_is_reported_not_rejected() {
        let mut payload = encode_command("secret", &args(&["-version"])).unwrap();
        payload[0] = 9;
        assert_eq!(parse_command(&payload).unwrap().version, 9);
    }
}
