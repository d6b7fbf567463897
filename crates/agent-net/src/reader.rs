//! Connection Reader (C5): read loops over a byte stream, dispatching to
//! the right codec and reassembler by channel role.
//!
//! The three role-specific entry points ([`run_metrics_channel`],
//! [`run_task_callback_channel`], [`run_serial_channel`]) share the same
//! `drain_*` helpers; they differ only in accepted role tags, which
//! reassembler/map they own, and what happens with a completed payload.

use std::io::Read;

use agent_metrics::MetricsHostInfo;
use tracing::{debug, warn};

use crate::error::Error;
use crate::frame::{self, DecodeOutcome, Status};
use crate::legacy::{self, V0aOutcome, V0bOutcome, V0B_SLOT_SIZE};
use crate::reassembler::Reassembler;
use crate::registry::AgentRegistry;
use crate::role;

const STREAM_SLOT_SIZE: usize = 4096;
/// Serial reads a smaller chunk at a time, per spec.md §4.5.
const SERIAL_SLOT_SIZE: usize = 316;

/// Drains v0a/v0b frames out of `buf`, feeding each into `reassembler` and
/// invoking `on_complete` for anything that dispatches. Leaves any
/// trailing incomplete frame in `buf` for the next read.
fn drain_legacy_buffer(buf: &mut Vec<u8>, reassembler: &mut Reassembler, kvm_id: &str, mut on_complete: impl FnMut(u8, Vec<u8>)) {
    loop {
        if buf.len() >= V0B_SLOT_SIZE {
            let mut slot = [0u8; V0B_SLOT_SIZE];
            slot.copy_from_slice(&buf[..V0B_SLOT_SIZE]);
            buf.drain(..V0B_SLOT_SIZE);

            match legacy::decode_v0b_slot(&slot) {
                V0bOutcome::Invalid => {
                    debug!(kvm_id, error = %Error::FrameInvalid("reserved task_id or bad status"), "v0b slot dropped");
                }
                V0bOutcome::Slot(parsed) => match parsed.status {
                    Status::Start => reassembler.on_start_v0b(parsed.task_id, &slot[6..]),
                    Status::Transfer => reassembler.on_transfer_v0b(parsed.task_id, &slot[6..]),
                    Status::End => {
                        let payload = reassembler.on_end_v0b(parsed.task_id, &slot, parsed.total_len);
                        on_complete(parsed.packet_type, payload);
                    }
                },
            }
            continue;
        }

        if (legacy::V0A_MIN_LEN..legacy::V0A_MAX_LEN).contains(&buf.len()) {
            match legacy::decode_v0a(buf) {
                V0aOutcome::Frame { frame, consumed } => {
                    on_complete(frame.packet_type, frame.payload.to_vec());
                    buf.drain(..consumed);
                }
                V0aOutcome::Incomplete => break,
            }
            continue;
        }

        break;
    }
}

/// Drains v1 magic-framed frames out of `buf` (serial channel only).
fn drain_v1_buffer(buf: &mut Vec<u8>, reassembler: &mut Reassembler, mut on_complete: impl FnMut(u8, Vec<u8>)) {
    loop {
        match frame::decode_frame(buf) {
            DecodeOutcome::Incomplete { drop } => {
                buf.drain(..drop);
                break;
            }
            DecodeOutcome::Frame { frame: parsed, consumed } => {
                let header = parsed.header;
                match header.status {
                    Status::Start => reassembler.on_start(header.task_id, header.seq_num, parsed.payload),
                    Status::Transfer => reassembler.on_transfer(header.task_id, header.seq_num, parsed.payload),
                    Status::End => {
                        if let Some(payload) = reassembler.on_end(header.task_id, header.seq_num, parsed.payload) {
                            on_complete(header.packet_type, payload);
                        }
                    }
                }
                buf.drain(..consumed);
            }
        }
    }
}

/// Metrics-collection channel reader. Accepts `TaskCollect`/`MetricCollect`
/// role tags, forwards completed records to `downstream`, and removes
/// `kvm_id` from `registry` on disconnect.
pub fn run_metrics_channel<S: Read, H>(
    mut stream: S,
    kvm_id: String,
    registry: &AgentRegistry<H>,
    downstream: &crossbeam_channel::Sender<MetricsHostInfo>,
) {
    let mut reassembler = Reassembler::new();
    let mut buf = Vec::new();
    let mut scratch = [0u8; STREAM_SLOT_SIZE];

    loop {
        let n = match stream.read(&mut scratch) {
            Ok(0) => {
                debug!(kvm_id, "metrics channel EOF");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(kvm_id, %err, "metrics channel read error");
                break;
            }
        };

        if !role::is_metrics_channel_tag(scratch[0]) {
            continue;
        }

        buf.extend_from_slice(&scratch[..n]);
        drain_legacy_buffer(&mut buf, &mut reassembler, &kvm_id, |packet_type, payload| {
            if let Err(err) = crate::dispatch::dispatch_completed(packet_type, &kvm_id, &payload, downstream) {
                warn!(kvm_id, %err, "failed to dispatch completed metrics payload");
            }
        });
    }

    registry.remove(&kvm_id);
}

/// Task-callback channel reader. Accepts
/// `OldAgentBackCollect`/`TaskCallBackCollect` role tags and calls a
/// caller-supplied handler per completed payload; never touches the
/// registry.
pub fn run_task_callback_channel<S: Read>(mut stream: S, kvm_id: String, mut on_task: impl FnMut(u8, Vec<u8>)) {
    let mut reassembler = Reassembler::new();
    let mut buf = Vec::new();
    let mut scratch = [0u8; STREAM_SLOT_SIZE];

    loop {
        let n = match stream.read(&mut scratch) {
            Ok(0) => {
                debug!(kvm_id, "task-callback channel EOF");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(kvm_id, %err, "task-callback channel read error");
                break;
            }
        };

        if !role::is_task_callback_channel_tag(scratch[0]) {
            continue;
        }

        buf.extend_from_slice(&scratch[..n]);
        drain_legacy_buffer(&mut buf, &mut reassembler, &kvm_id, &mut on_task);
    }
}

/// Serial channel reader: v1 magic-framed only, detected by magic search
/// rather than a role tag. Its packet-buffer map is cleared entirely on
/// disconnect, which here falls out of the reader (and its owned
/// `Reassembler`) simply going out of scope when the loop exits.
pub fn run_serial_channel<S: Read>(mut stream: S, kvm_id: String, mut on_complete: impl FnMut(u8, Vec<u8>)) {
    let mut reassembler = Reassembler::new();
    let mut buf = Vec::new();
    let mut scratch = [0u8; SERIAL_SLOT_SIZE];

    loop {
        let n = match stream.read(&mut scratch) {
            Ok(0) => {
                debug!(kvm_id, "serial channel EOF");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(kvm_id, %err, "serial channel read error");
                break;
            }
        };

        buf.extend_from_slice(&scratch[..n]);
        drain_v1_buffer(&mut buf, &mut reassembler, &mut on_complete);
    }

    reassembler.clear();
}
