//! Protocol message types and framing constants.

/// Protocol version carried in every command payload.
pub const PROTOCOL_VERSION: u8 = 1;

/// Length of the hex-encoded HMAC signature in a command payload.
pub const SIGNATURE_LENGTH: usize = 64;

/// Maximum payload size accepted by the codec (100 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 100 * 1024 * 1024;

/// The closed set of message types on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Authenticated command handshake (client to server, first frame).
    Command = 1,
    /// Subprocess standard output chunk.
    Stdout = 2,
    /// Subprocess standard error chunk.
    Stderr = 3,
    /// Final subprocess exit status (low byte).
    ExitCode = 4,
    /// Human-readable session failure.
    Error = 5,
    /// Cancellation request.
    Cancel = 6,
    /// Client standard input chunk.
    Stdin = 7,
    /// Client standard input reached end of file.
    StdinClose = 8,
}

impl MessageType {
    /// Decode a wire tag. Returns `None` for tags outside the known set,
    /// which receivers log and ignore for forward compatibility.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Command),
            2 => Some(Self::Stdout),
            3 => Some(Self::Stderr),
            4 => Some(Self::ExitCode),
            5 => Some(Self::Error),
            6 => Some(Self::Cancel),
            7 => Some(Self::Stdin),
            8 => Some(Self::StdinClose),
            _ => None,
        }
    }

    /// The wire tag for this message type.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One framed message: a raw type tag and an opaque payload.
///
/// The tag is kept as the raw byte so frames with unknown tags can still be
/// consumed from the stream and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// The decoded message type, if the tag is in the known set.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_byte(self.frame_type)
    }
}
