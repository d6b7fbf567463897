//! Stream framing, reassembly, and dispatch core for agent telemetry
//! connections (C1-C6).
//!
//! A connection acceptor (out of scope here, per spec.md §1) hands each
//! accepted stream to one of the three [`reader`] entry points, which
//! decode whichever wire dialect applies, reassemble multi-frame payloads
//! through a [`reassembler::Reassembler`], and — for the metrics channel —
//! dispatch completed payloads through [`dispatch::dispatch_completed`] to
//! a downstream `crossbeam_channel`. Writers use [`writer::FrameWriter`]
//! together with a [`pool::TaskIdPool`] to send framed payloads back.

mod dispatch;
mod error;
mod frame;
mod legacy;
mod pool;
mod reassembler;
mod reader;
mod registry;
mod role;
mod writer;

pub use dispatch::dispatch_completed;
pub use error::{Error, Result};
pub use frame::{
    decode_frame, encode_frame, DecodeOutcome, DecodedFrame, FrameHeader, Status, CHUNK_SIZE, HEADER_SIZE,
    INTER_CHUNK_DELAY_MS, MAGIC, METRICS_PACKET_TYPE, MIN_PACKET_SIZE, VERSION,
};
pub use legacy::{decode_v0a, decode_v0b_slot, V0aFrame, V0aOutcome, V0bOutcome, V0bSlot, V0A_MAX_LEN, V0A_MIN_LEN, V0B_SLOT_SIZE};
pub use pool::{PoolConfig, TaskIdPool};
pub use reader::{run_metrics_channel, run_serial_channel, run_task_callback_channel};
pub use reassembler::Reassembler;
pub use registry::AgentRegistry;
pub use role::{
    is_metrics_channel_tag, is_task_callback_channel_tag, RoleTag, METRIC_COLLECT, OLD_AGENT_BACK_COLLECT, TASK_CALL_BACK_COLLECT,
    TASK_COLLECT,
};
pub use writer::{FrameWriter, WriterConfig};
