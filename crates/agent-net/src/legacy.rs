//! Legacy codecs (C3): the two dialects kept around for backward
//! compatibility with older agents. Neither carries a magic number or a
//! CRC — the reader picks between them (and v1) purely on accumulated
//! buffer length, a fragile rule spec.md's design notes call out as a
//! known latent bug rather than something to silently fix here.

use crate::frame::{is_reserved_task_id, Status};

/// v0a is only tried while the unread buffer is in this range.
pub const V0A_MAX_LEN: usize = 4096;
pub const V0A_MIN_LEN: usize = 3;
const V0A_HEADER_SIZE: usize = 3;

/// v0b is only tried once the unread buffer reaches a full slot.
pub const V0B_SLOT_SIZE: usize = 4096;
const V0B_HEADER_SIZE: usize = 6;

#[derive(Debug)]
pub struct V0aFrame<'a> {
    pub packet_type: u8,
    pub payload: &'a [u8],
}

#[derive(Debug)]
pub enum V0aOutcome<'a> {
    Frame { frame: V0aFrame<'a>, consumed: usize },
    Incomplete,
}

/// Decodes one v0a heartbeat frame out of `buf`.
///
/// Caller is responsible for only invoking this while
/// `V0A_MIN_LEN <= buf.len() < V0A_MAX_LEN`, per spec.md §4.3.
pub fn decode_v0a(buf: &[u8]) -> V0aOutcome<'_> {
    debug_assert!(buf.len() >= V0A_MIN_LEN);
    let packet_type = buf[0];
    let data_len = (usize::from(buf[1]) << 8) | usize::from(buf[2]);
    let total_len = V0A_HEADER_SIZE + data_len;
    if buf.len() < total_len {
        return V0aOutcome::Incomplete;
    }
    V0aOutcome::Frame {
        frame: V0aFrame { packet_type, payload: &buf[V0A_HEADER_SIZE..total_len] },
        consumed: total_len,
    }
}

#[derive(Debug)]
pub struct V0bSlot<'a> {
    pub packet_type: u8,
    pub task_id: u8,
    pub status: Status,
    /// Declared total length of the task's payload across all slots this
    /// task has contributed (`6 + data_len` from this slot's header).
    pub total_len: usize,
    /// The raw 4096-byte slot, for the terminal-chunk arithmetic in
    /// [`crate::reassembler`], which needs both the header-relative offset
    /// and the slot's payload region.
    pub slot: &'a [u8; V0B_SLOT_SIZE],
}

#[derive(Debug)]
pub enum V0bOutcome<'a> {
    Slot(V0bSlot<'a>),
    /// `task_id` or `status` failed validation; caller drops the whole
    /// slot and continues.
    Invalid,
}

/// Decodes the header of one v0b fixed-size slot.
///
/// `slot` must be exactly [`V0B_SLOT_SIZE`] bytes, per spec.md §4.3.
pub fn decode_v0b_slot(slot: &[u8; V0B_SLOT_SIZE]) -> V0bOutcome<'_> {
    let packet_type = slot[0];
    let task_id = slot[1];
    if is_reserved_task_id(task_id) {
        return V0bOutcome::Invalid;
    }
    let Some(status) = Status::from_byte(slot[2]) else {
        return V0bOutcome::Invalid;
    };
    let data_len = (usize::from(slot[3]) << 16) | (usize::from(slot[4]) << 8) | usize::from(slot[5]);
    let total_len = V0B_HEADER_SIZE + data_len;
    V0bOutcome::Slot(V0bSlot { packet_type, task_id, status, total_len, slot })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v0a_heartbeat_decodes() {
        let buf = [0x02, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o'];
        match decode_v0a(&buf) {
            V0aOutcome::Frame { frame, consumed } => {
                assert_eq!(frame.packet_type, 0x02);
                assert_eq!(frame.payload, b"hello");
                assert_eq!(consumed, 8);
            }
            V0aOutcome::Incomplete => panic!("should decode"),
        }
    }

    #[test]
    fn v0a_incomplete_waits() {
        let buf = [0x02, 0x00, 0x05, b'h', b'e'];
        assert!(matches!(decode_v0a(&buf), V0aOutcome::Incomplete));
    }

    #[test]
    fn v0b_slot_rejects_reserved_task_id() {
        let mut slot = [0u8; V0B_SLOT_SIZE];
        slot[0] = 2;
        slot[1] = 0; // reserved
        slot[2] = Status::End.to_byte();
        assert!(matches!(decode_v0b_slot(&slot), V0bOutcome::Invalid));
    }

    #[test]
    fn v0b_slot_rejects_bad_status() {
        let mut slot = [0u8; V0B_SLOT_SIZE];
        slot[0] = 2;
        slot[1] = 1;
        slot[2] = 9; // not in {0,1,2}
        assert!(matches!(decode_v0b_slot(&slot), V0bOutcome::Invalid));
    }

    #[test]
    fn v0b_slot_parses_header() {
        let mut slot = [0u8; V0B_SLOT_SIZE];
        slot[0] = 2;
        slot[1] = 1;
        slot[2] = Status::End.to_byte();
        slot[3..6].copy_from_slice(&[0, 0, 10]);
        slot[6..16].copy_from_slice(b"abcdefghij");

        match decode_v0b_slot(&slot) {
            V0bOutcome::Slot(parsed) => {
                assert_eq!(parsed.packet_type, 2);
                assert_eq!(parsed.task_id, 1);
                assert_eq!(parsed.status, Status::End);
                assert_eq!(parsed.total_len, 16);
                assert_eq!(&parsed.slot[6..16], b"abcdefghij");
            }
            V0bOutcome::Invalid => panic!("should parse"),
        }
    }
}
