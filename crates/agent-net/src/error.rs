use thiserror::Error;

/// Errors surfaced by the reader, codec, reassembler and writer.
///
/// Only [`Error::Transport`] is fatal to a connection's read loop; every
/// other variant is logged and the loop continues (see
/// [`crate::reader`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("invalid frame: {0}")]
    FrameInvalid(&'static str),

    #[error("reassembly event for task {task_id} with no open buffer")]
    Orphan { task_id: u8 },

    #[error("failed to decode payload for packet_type {packet_type}: {source}")]
    DecodePayload {
        packet_type: u8,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown packet_type {0}")]
    UnknownType(u8),

    #[error("task-id pool exhausted")]
    PoolExhausted,

    #[error("write failed for task {task_id}: {source}")]
    WriteFailed {
        task_id: u8,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
