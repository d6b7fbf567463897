//! Reassembler (C4): per-task-id Start/Transfer/End state machine.
//!
//! One instance is owned per reader (per spec.md §9's resolved ambiguity:
//! these maps are per-connection, not process-wide — there is never a
//! need to see another connection's in-flight tasks, so no mutex is held
//! here at all).

use std::collections::HashMap;

use tracing::{debug, trace};

use agent_utils::safe_assert;

use crate::error::Error;
use crate::frame::is_reserved_task_id;
use crate::legacy::V0B_SLOT_SIZE;

struct TaskState {
    data: Vec<u8>,
    last_seq: u32,
}

/// Per-channel-role reassembly state, keyed by `task_id`.
#[derive(Default)]
pub struct Reassembler {
    tasks: HashMap<u8, TaskState>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self { tasks: HashMap::new() }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// v1 Start: always replaces any existing buffer for `task_id`.
    pub fn on_start(&mut self, task_id: u8, seq_num: u32, payload: &[u8]) {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        self.tasks.insert(task_id, TaskState { data: payload.to_vec(), last_seq: seq_num });
    }

    /// v1 Transfer: appended only if in-sequence; otherwise dropped and the
    /// gap is permanent (the buffer stays `Open` but will never complete
    /// until a new Start supplants it or the connection closes).
    pub fn on_transfer(&mut self, task_id: u8, seq_num: u32, payload: &[u8]) {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        match self.tasks.get_mut(&task_id) {
            None => trace!(error = %Error::Orphan { task_id }, "dropping v1 transfer"),
            Some(state) => {
                if seq_num == state.last_seq.wrapping_add(1) {
                    state.data.extend_from_slice(payload);
                    state.last_seq = seq_num;
                } else {
                    debug!(
                        task_id,
                        expected = state.last_seq.wrapping_add(1),
                        got = seq_num,
                        "out-of-sequence v1 transfer dropped"
                    );
                }
            }
        }
    }

    /// v1 End. Absent + End is a single-frame payload, dispatched
    /// immediately. Open + End only completes (and is returned) if
    /// in-sequence; otherwise it is dropped and the buffer remains open.
    pub fn on_end(&mut self, task_id: u8, seq_num: u32, payload: &[u8]) -> Option<Vec<u8>> {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        match self.tasks.remove(&task_id) {
            None => Some(payload.to_vec()),
            Some(mut state) => {
                if seq_num == state.last_seq.wrapping_add(1) {
                    state.data.extend_from_slice(payload);
                    Some(state.data)
                } else {
                    debug!(task_id, "out-of-sequence v1 end dropped, buffer remains open");
                    self.tasks.insert(task_id, state);
                    None
                }
            }
        }
    }

    /// v0b Start: stream order only, no sequence numbers to check.
    pub fn on_start_v0b(&mut self, task_id: u8, payload: &[u8]) {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        self.tasks.insert(task_id, TaskState { data: payload.to_vec(), last_seq: 0 });
    }

    pub fn on_transfer_v0b(&mut self, task_id: u8, payload: &[u8]) {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        match self.tasks.get_mut(&task_id) {
            None => trace!(error = %Error::Orphan { task_id }, "dropping v0b transfer"),
            Some(state) => state.data.extend_from_slice(payload),
        }
    }

    /// v0b End, including the terminal-chunk arithmetic from spec.md §4.4:
    /// `actual_end = total_len - len(buffer) + 6`, clamped to the slot
    /// size. The source's `buffer` includes the 6-byte header of the
    /// first (Start) slot verbatim, stripped only once at final dispatch;
    /// `state.data` here never carries that header, so the adapted
    /// formula drops the compensating `+ 6` (`total_len - buffered`
    /// lands on the same byte offset). Works uniformly whether or not a
    /// buffer was already open — absent becomes a fresh zero-length
    /// buffer first, matching the table's "appends the terminal chunk to
    /// a freshly created buffer" row.
    pub fn on_end_v0b(&mut self, task_id: u8, slot: &[u8; V0B_SLOT_SIZE], total_len: usize) -> Vec<u8> {
        safe_assert!(!is_reserved_task_id(task_id), "reassembler invoked with reserved task_id {task_id}");
        let mut state = self.tasks.remove(&task_id).unwrap_or(TaskState { data: Vec::new(), last_seq: 0 });
        let buffered = state.data.len();
        let actual_end = total_len.saturating_sub(buffered).clamp(6, V0B_SLOT_SIZE);
        state.data.extend_from_slice(&slot[6..actual_end]);
        state.data
    }
}
