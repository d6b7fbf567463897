//! Task-ID pool (C1): a bounded, segmented, recyclable small-integer
//! allocator used to tag in-flight writer frames.
//!
//! Mirrors the teacher crate's habit of splitting a shared resource into
//! independently-locked segments to cut contention between concurrent
//! callers (`flux-communication`'s sharded queues), but the segments here
//! are plain `Mutex`-guarded counters rather than shared-memory rings,
//! since the pool is process-local.

use std::sync::Mutex;

use crossbeam_queue::ArrayQueue;

use crate::error::Error;

/// Configuration for a [`TaskIdPool`].
///
/// Defaults match the numbers implied by spec.md §4.1: ids run `1..=N*S`,
/// `task_id == 0` and `task_id == 255` stay reserved no matter how the
/// segments are sized.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub segment_count: usize,
    pub segment_size: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        // 4 segments of 63 ids each covers the full 1..=254 range used by
        // the wire protocol without ever handing out 0 or 255.
        Self { segment_count: 4, segment_size: 63 }
    }
}

struct Segment {
    start: u32,
    max_id: u32,
    next_id: Mutex<u32>,
    recycled: ArrayQueue<u8>,
}

impl Segment {
    fn new(start: u32, size: u32) -> Self {
        Self {
            start,
            max_id: start + size - 1,
            next_id: Mutex::new(start),
            recycled: ArrayQueue::new(size as usize),
        }
    }

    fn try_acquire_fresh(&self) -> Option<u8> {
        let mut next = self.next_id.lock().unwrap_or_else(|poison| poison.into_inner());
        if *next <= self.max_id {
            let id = *next;
            *next += 1;
            Some(id as u8)
        } else {
            None
        }
    }

    fn contains(&self, id: u8) -> bool {
        (self.start..=self.max_id).contains(&u32::from(id))
    }
}

/// Hands out small integers in `1..=254` to concurrent writers.
///
/// `acquire` never returns `0` or `255`: segment ranges are chosen (and, if
/// a caller supplies a custom [`PoolConfig`], clamped) to stay inside
/// `1..=254`. There is no fairness guarantee across segments — the first
/// segment with room wins.
pub struct TaskIdPool {
    segments: Vec<Segment>,
}

impl TaskIdPool {
    pub fn new(config: PoolConfig) -> Self {
        assert!(config.segment_count > 0, "pool needs at least one segment");
        let mut segments = Vec::with_capacity(config.segment_count);
        let mut next_start = 1u32;
        for _ in 0..config.segment_count {
            let size = config.segment_size.min(254 - next_start + 1).max(1);
            segments.push(Segment::new(next_start, size));
            next_start += size;
            if next_start > 254 {
                break;
            }
        }
        Self { segments }
    }

    /// Scans segments in fixed order for a never-issued id, falling back to
    /// a non-blocking pop from each segment's recycled queue.
    pub fn acquire(&self) -> Result<u8, Error> {
        for segment in &self.segments {
            if let Some(id) = segment.try_acquire_fresh() {
                return Ok(id);
            }
        }
        for segment in &self.segments {
            if let Some(id) = segment.recycled.pop() {
                return Ok(id);
            }
        }
        Err(Error::PoolExhausted)
    }

    /// Returns `id` to whichever segment's range contains it. Best-effort:
    /// if that segment's recycle queue is full the id is silently dropped.
    pub fn release(&self, id: u8) {
        for segment in &self.segments {
            if segment.contains(id) {
                let _ = segment.recycled.push(id);
                return;
            }
        }
    }
}
