//! Frame Codec v1 write path (C2): chunks an application payload into
//! sequenced, CRC-tagged frames and serializes them to a connection,
//! cooperating with the task-ID pool.

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::error::Error;
use crate::frame::{self, Status};
use crate::pool::TaskIdPool;

/// Tunable knobs for [`FrameWriter`] (spec.md §4.10's ambient config
/// surface); the wire layout itself stays a protocol constant.
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    pub chunk_size: usize,
    /// `Some(duration)` on the serial role (slow UART); `None` on
    /// pure-TCP roles, per spec.md §9's design note on the 20ms sleep.
    pub inter_chunk_delay: Option<Duration>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { chunk_size: frame::CHUNK_SIZE, inter_chunk_delay: Some(Duration::from_millis(frame::INTER_CHUNK_DELAY_MS)) }
    }
}

/// Owns the writer-side sequence counter and the single mutex that
/// serializes all writes on one connection (spec.md §9: scoped per
/// connection, not process-global).
pub struct FrameWriter<W> {
    stream: Mutex<W>,
    seq_num: AtomicU32,
    config: WriterConfig,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(stream: W, config: WriterConfig) -> Self {
        Self { stream: Mutex::new(stream), seq_num: AtomicU32::new(0), config }
    }

    /// Acquires a task-id from `pool`, chunks `payload`, and writes it as
    /// one or more v1 frames. The task-id is always recycled, whether the
    /// send succeeds or fails.
    pub fn send(&self, pool: &TaskIdPool, packet_type: u8, payload: &[u8]) -> Result<(), Error> {
        let task_id = pool.acquire()?;
        let result = self.send_with_task_id(task_id, packet_type, payload);
        pool.release(task_id);
        result
    }

    fn send_with_task_id(&self, task_id: u8, packet_type: u8, payload: &[u8]) -> Result<(), Error> {
        let mut guard = self.stream.lock().unwrap_or_else(|poison| poison.into_inner());

        if payload.is_empty() {
            return self.write_chunk(&mut guard, task_id, packet_type, Status::End, &[]);
        }

        let chunk_count = payload.len().div_ceil(self.config.chunk_size);
        for (i, chunk) in payload.chunks(self.config.chunk_size).enumerate() {
            let status = if chunk_count == 1 {
                Status::End
            } else if i == 0 {
                Status::Start
            } else if i == chunk_count - 1 {
                Status::End
            } else {
                Status::Transfer
            };

            self.write_chunk(&mut guard, task_id, packet_type, status, chunk)?;

            if let Some(delay) = self.config.inter_chunk_delay {
                if i + 1 < chunk_count {
                    thread::sleep(delay);
                }
            }
        }
        Ok(())
    }

    fn write_chunk(&self, stream: &mut W, task_id: u8, packet_type: u8, status: Status, chunk: &[u8]) -> Result<(), Error> {
        let seq = self.seq_num.fetch_add(1, Ordering::SeqCst);
        let mut frame = Vec::with_capacity(frame::HEADER_SIZE + chunk.len() + frame::CRC_SIZE);
        frame::encode_frame(&mut frame, seq, packet_type, status, task_id, chunk);
        stream.write_all(&frame).map_err(|source| Error::WriteFailed { task_id, source })
    }
}
