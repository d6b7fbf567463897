//! Frame codec v1 (C2): the magic-framed wire dialect.
//!
//! ```text
//! offset size field
//! 0      2    magic=0xCAFE
//! 2      1    version=0x01
//! 3      4    seq_num (u32)
//! 7      1    packet_type
//! 8      1    status (0=Start,1=Transfer,2=End)
//! 9      1    task_id (1..254)
//! 10     2    data_len (u16)
//! 12     n    payload (n=data_len)
//! 12+n   4    crc32_ieee(bytes[0..12+n])
//! ```

use crc::{Crc, CRC_32_ISO_HDLC};
use tracing::debug;

use crate::error::Error;

const CRC32_IEEE: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub const MAGIC: u16 = 0xCAFE;
pub const VERSION: u8 = 0x01;
pub const HEADER_SIZE: usize = 12;
pub const CRC_SIZE: usize = 4;
pub const MIN_PACKET_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// `packet_type` reserved for the metrics payload (the only type the
/// reassembler's dispatch step understands today, per spec.md §4.4).
pub const METRICS_PACKET_TYPE: u8 = 2;

/// Frames chunk payloads into pieces this large on the write path.
pub const CHUNK_SIZE: usize = 300;
/// Delay between chunks of one send, to accommodate slow serial links.
pub const INTER_CHUNK_DELAY_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Start,
    Transfer,
    End,
}

impl Status {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Status::Start),
            1 => Some(Status::Transfer),
            2 => Some(Status::End),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Status::Start => 0,
            Status::Transfer => 1,
            Status::End => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    pub seq_num: u32,
    pub packet_type: u8,
    pub status: Status,
    pub task_id: u8,
    pub data_len: u16,
}

/// Reference into the bytes handed to [`decode_frame`]. Valid only for the
/// lifetime of the buffer it was parsed out of.
#[derive(Debug)]
pub struct DecodedFrame<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
}

#[derive(Debug)]
pub enum DecodeOutcome<'a> {
    /// A complete, CRC-valid frame. Drop `consumed` bytes from the front of
    /// the accumulation buffer and keep decoding the remainder.
    Frame { frame: DecodedFrame<'a>, consumed: usize },
    /// No complete frame yet. Drop `drop` bytes from the front (garbage
    /// before the next candidate magic, if any) and wait for more data.
    Incomplete { drop: usize },
}

fn find_magic(buf: &[u8]) -> Option<usize> {
    if buf.len() < 2 {
        return None;
    }
    buf.windows(2).position(|w| u16::from_be_bytes([w[0], w[1]]) == MAGIC)
}

fn parse_header(bytes: &[u8]) -> FrameHeader {
    FrameHeader {
        seq_num: u32::from_be_bytes(bytes[3..7].try_into().unwrap()),
        packet_type: bytes[7],
        // Caller has already validated the status byte before reaching here
        // in all current call sites except the raw header parse, so this
        // falls back to `Start` only to keep the constructor infallible;
        // `decode_frame` re-checks the byte before trusting it.
        status: Status::from_byte(bytes[8]).unwrap_or(Status::Start),
        task_id: bytes[9],
        data_len: u16::from_be_bytes(bytes[10..12].try_into().unwrap()),
    }
}

/// Reserved task-id values that are always rejected.
pub fn is_reserved_task_id(task_id: u8) -> bool {
    task_id == 0 || task_id == 255
}

/// Scans `buf` for the first complete, CRC-valid v1 frame.
///
/// Implements spec.md §4.2's decode algorithm: skip to the next `0xCAFE`,
/// bail if there isn't enough data yet, reject on bad version or bad CRC by
/// stepping one byte past the magic and trying again, and otherwise return
/// the parsed frame plus how many bytes it occupied (including any leading
/// garbage).
pub fn decode_frame(buf: &[u8]) -> DecodeOutcome<'_> {
    let mut search_from = 0usize;
    loop {
        let Some(found) = find_magic(&buf[search_from..]) else {
            // No magic anywhere in the unsearched tail. Keep a single
            // trailing byte in case it's the first half of a split magic.
            let keep = usize::from(buf.last() == Some(&0xCA));
            return DecodeOutcome::Incomplete { drop: buf.len() - keep };
        };
        let magic_offset = search_from + found;
        let remaining = buf.len() - magic_offset;

        if remaining < MIN_PACKET_SIZE {
            return DecodeOutcome::Incomplete { drop: magic_offset };
        }

        let head = &buf[magic_offset..];
        if head[2] != VERSION {
            debug!(error = %Error::FrameInvalid("version mismatch"), "dropping candidate frame");
            search_from = magic_offset + 1;
            continue;
        }

        if Status::from_byte(head[8]).is_none() {
            debug!(error = %Error::FrameInvalid("status not in {Start,Transfer,End}"), "dropping candidate frame");
            search_from = magic_offset + 1;
            continue;
        }

        let data_len = u16::from_be_bytes(head[10..12].try_into().unwrap()) as usize;
        let total_len = HEADER_SIZE + data_len + CRC_SIZE;
        if remaining < total_len {
            return DecodeOutcome::Incomplete { drop: magic_offset };
        }

        let candidate = &head[..total_len];
        let expected_crc = u32::from_be_bytes(candidate[total_len - CRC_SIZE..].try_into().unwrap());
        let actual_crc = CRC32_IEEE.checksum(&candidate[..total_len - CRC_SIZE]);
        if actual_crc != expected_crc {
            debug!(error = %Error::FrameInvalid("crc32 mismatch"), "dropping candidate frame");
            search_from = magic_offset + 1;
            continue;
        }

        let header = parse_header(candidate);
        let payload = &candidate[HEADER_SIZE..total_len - CRC_SIZE];
        return DecodeOutcome::Frame {
            frame: DecodedFrame { header, payload },
            consumed: magic_offset + total_len,
        };
    }
}

/// Serializes one v1 frame (header + payload + crc) into `out`.
pub fn encode_frame(out: &mut Vec<u8>, seq_num: u32, packet_type: u8, status: Status, task_id: u8, payload: &[u8]) {
    let start = out.len();
    out.extend_from_slice(&MAGIC.to_be_bytes());
    out.push(VERSION);
    out.extend_from_slice(&seq_num.to_be_bytes());
    out.push(packet_type);
    out.push(status.to_byte());
    out.push(task_id);
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(payload);

    let crc = CRC32_IEEE.checksum(&out[start..]);
    out.extend_from_slice(&crc.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_single(packet_type: u8, payload: &[u8], task_id: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_frame(&mut buf, 0, packet_type, Status::End, task_id, payload);
        buf
    }

    #[test]
    fn e1_single_frame_matches_spec_bytes() {
        let payload = b"{}";
        let frame = encode_single(METRICS_PACKET_TYPE, payload, 1);
        // CAFE 01 00000000 02 02 01 0002 7B7D <crc>
        assert_eq!(&frame[0..12], &[0xCA, 0xFE, 0x01, 0, 0, 0, 0, 0x02, 0x02, 0x01, 0x00, 0x02]);
        assert_eq!(&frame[12..14], payload);
        assert_eq!(frame.len(), 20);

        match decode_frame(&frame) {
            DecodeOutcome::Frame { frame, consumed } => {
                assert_eq!(consumed, 20);
                assert_eq!(frame.payload, payload);
                assert_eq!(frame.header.packet_type, METRICS_PACKET_TYPE);
                assert_eq!(frame.header.status, Status::End);
            }
            DecodeOutcome::Incomplete { .. } => panic!("expected a complete frame"),
        }
    }

    #[test]
    fn junk_before_magic_is_skipped() {
        let mut buf = vec![0x11, 0x22, 0x33];
        buf.extend(encode_single(METRICS_PACKET_TYPE, b"hi", 5));

        match decode_frame(&buf) {
            DecodeOutcome::Frame { frame, consumed } => {
                assert_eq!(frame.payload, b"hi");
                assert_eq!(consumed, buf.len());
            }
            DecodeOutcome::Incomplete { .. } => panic!("expected a complete frame"),
        }
    }

    #[test]
    fn truncated_frame_is_incomplete() {
        let full = encode_single(METRICS_PACKET_TYPE, b"hello", 1);
        let truncated = &full[..full.len() - 1];
        match decode_frame(truncated) {
            DecodeOutcome::Incomplete { drop } => assert_eq!(drop, 0),
            DecodeOutcome::Frame { .. } => panic!("should not parse a truncated frame"),
        }
    }

    #[test]
    fn bit_flip_drops_frame_but_next_intact_frame_survives() {
        let mut buf = encode_single(METRICS_PACKET_TYPE, b"first", 1);
        let corrupt_at = 13; // inside the payload
        buf[corrupt_at] ^= 0xFF;
        buf.extend(encode_single(METRICS_PACKET_TYPE, b"second", 2));

        match decode_frame(&buf) {
            DecodeOutcome::Frame { frame, .. } => assert_eq!(frame.payload, b"second"),
            DecodeOutcome::Incomplete { .. } => panic!("second frame should still decode"),
        }
    }

    #[test]
    fn version_mismatch_is_skipped() {
        let mut buf = encode_single(METRICS_PACKET_TYPE, b"bad-version", 1);
        buf[2] = 0x02;
        buf.extend(encode_single(METRICS_PACKET_TYPE, b"good", 1));

        match decode_frame(&buf) {
            DecodeOutcome::Frame { frame, .. } => assert_eq!(frame.payload, b"good"),
            DecodeOutcome::Incomplete { .. } => panic!("second frame should still decode"),
        }
    }
}
