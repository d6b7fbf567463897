//! End-to-end scenarios (E1-E6) and cross-module properties exercised
//! through the public reader/writer entry points rather than individual
//! codec units.

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

use agent_net::{
    run_metrics_channel, run_serial_channel, run_task_callback_channel, AgentRegistry, FrameWriter, PoolConfig, TaskIdPool,
    WriterConfig,
};

/// Installs a `tracing-subscriber` `fmt` subscriber filtered by
/// `RUST_LOG`, so reader/reassembler debug logging is visible under
/// `cargo test -- --nocapture` without every test needing its own setup.
/// Safe to call from every test: `try_init` is a no-op after the first
/// successful call.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
}

/// Feeds a fixed byte buffer to a reader in small, arbitrary-sized pieces,
/// so readers see the same kind of fragmentation a real TCP stream
/// produces (property 1's "any segmentation").
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl ChunkedReader {
    fn new(data: Vec<u8>, step: usize) -> Self {
        Self { data, pos: 0, step }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.step).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn e1_single_frame_round_trips_through_serial_reader() {
    init_tracing();
    let mut bytes = Vec::new();
    agent_net::encode_frame(&mut bytes, 0, 2, agent_net::Status::End, 1, b"{}");
    assert_eq!(bytes.len(), 20);

    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(bytes, 3);
    run_serial_channel(stream, "kvm-e1".into(), move |packet_type, payload| {
        received2.lock().unwrap().push((packet_type, payload));
    });

    let got = received.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0], (2, b"{}".to_vec()));
}

#[test]
fn e2_three_chunk_payload_reassembles_across_fragmented_reads() {
    init_tracing();
    let mut raw = Vec::new();
    let payload = vec![0xAAu8; 700];
    agent_net::encode_frame(&mut raw, 0, 2, agent_net::Status::Start, 1, &payload[0..300]);
    agent_net::encode_frame(&mut raw, 1, 2, agent_net::Status::Transfer, 1, &payload[300..600]);
    agent_net::encode_frame(&mut raw, 2, 2, agent_net::Status::End, 1, &payload[600..700]);

    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(raw, 7);
    run_serial_channel(stream, "kvm-e2".into(), move |packet_type, data| {
        received2.lock().unwrap().push((packet_type, data));
    });

    let got = received.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].1, payload);
}

#[test]
fn e3_dropped_middle_frame_yields_no_dispatch() {
    init_tracing();
    let mut raw = Vec::new();
    let payload = vec![0xAAu8; 700];
    agent_net::encode_frame(&mut raw, 0, 2, agent_net::Status::Start, 1, &payload[0..300]);
    // middle Transfer frame omitted
    agent_net::encode_frame(&mut raw, 2, 2, agent_net::Status::End, 1, &payload[600..700]);

    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(raw, 256);
    run_serial_channel(stream, "kvm-e3".into(), move |packet_type, data| {
        received2.lock().unwrap().push((packet_type, data));
    });

    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn e4_v0a_heartbeat_dispatches() {
    init_tracing();
    // The task-callback channel's role filter reads the same first byte
    // the v0a codec treats as `packet_type`, so route this scenario
    // through a role tag the task-callback channel accepts rather than
    // the 0x02 spec.md's example happens to use for the metrics channel.
    let bytes = vec![0x03, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o'];
    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(bytes, 2);

    run_task_callback_channel(stream, "kvm-e4".into(), move |packet_type, data| {
        received2.lock().unwrap().push((packet_type, data));
    });

    let got = received.lock().unwrap();
    assert_eq!(*got, vec![(0x03, b"hello".to_vec())]);
}

#[test]
fn e5_v0b_fixed_slot_dispatches() {
    init_tracing();
    let mut slot = vec![0u8; 4096];
    slot[0] = 3; // packet_type / role tag
    slot[1] = 1; // task_id
    slot[2] = agent_net::Status::End.to_byte();
    slot[3..6].copy_from_slice(&[0, 0, 10]);
    slot[6..16].copy_from_slice(b"abcdefghij");

    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(slot, 4096);
    run_task_callback_channel(stream, "kvm-e5".into(), move |packet_type, data| {
        received2.lock().unwrap().push((packet_type, data));
    });

    let got = received.lock().unwrap();
    assert_eq!(*got, vec![(3, b"abcdefghij".to_vec())]);
}

#[test]
fn property_7_registry_entry_gone_when_reader_returns() {
    init_tracing();
    let registry: AgentRegistry<()> = AgentRegistry::new();
    registry.insert("kvm-p7".into(), ());
    let (tx, _rx) = crossbeam_channel::unbounded();

    let stream = ChunkedReader::new(Vec::new(), 4); // immediate EOF
    run_metrics_channel(stream, "kvm-p7".into(), &registry, &tx);

    assert!(!registry.contains("kvm-p7"));
}

/// `Write` impl that also lets the test pull the bytes back out, since
/// `FrameWriter` holds its stream behind a private `Mutex`.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn property_1_writer_and_reader_round_trip_for_any_split() {
    init_tracing();
    let buf = SharedBuf::default();
    let writer = FrameWriter::new(buf.clone(), WriterConfig { chunk_size: 300, inter_chunk_delay: None });
    let pool = TaskIdPool::new(PoolConfig::default());

    let payload = vec![0x5Cu8; 950]; // spans four 300-byte chunks
    writer.send(&pool, 2, &payload).unwrap();

    for step in [1usize, 3, 17, 4096] {
        let bytes = buf.0.lock().unwrap().clone();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received2 = Arc::clone(&received);
        let stream = ChunkedReader::new(bytes, step);
        run_serial_channel(stream, format!("kvm-p1-{step}"), move |packet_type, data| {
            received2.lock().unwrap().push((packet_type, data));
        });

        let got = received.lock().unwrap();
        assert_eq!(*got, vec![(2, payload.clone())], "segmentation step {step}");
    }
}

#[test]
fn property_2_junk_between_frames_does_not_alter_dispatch() {
    init_tracing();
    let mut raw = vec![0xDE, 0xAD, 0xBE, 0xEF];
    agent_net::encode_frame(&mut raw, 0, 2, agent_net::Status::End, 1, b"one");
    raw.extend([0x00, 0xFF, 0xCA]); // trailing partial-magic-looking junk
    agent_net::encode_frame(&mut raw, 1, 2, agent_net::Status::End, 2, b"two");

    let received = Arc::new(Mutex::new(Vec::new()));
    let received2 = Arc::clone(&received);
    let stream = ChunkedReader::new(raw, 5);
    run_serial_channel(stream, "kvm-p2".into(), move |packet_type, data| {
        received2.lock().unwrap().push((packet_type, data));
    });

    let got = received.lock().unwrap();
    assert_eq!(*got, vec![(2, b"one".to_vec()), (2, b"two".to_vec())]);
}
