//! Dispatch: the tail end of reassembly (§4.4's "Dispatch" rule). A
//! completed byte blob becomes a typed [`MetricsHostInfo`] and is handed
//! to the downstream consumer channel, with `kvm_id` stamped from the
//! connection identity — never trusted from the sender.

use agent_metrics::MetricsHostInfo;
use tracing::warn;

use crate::error::Error;
use crate::frame::METRICS_PACKET_TYPE;

/// Decodes a completed payload and sends it on `downstream`.
///
/// Only `packet_type == METRICS_PACKET_TYPE` is understood; anything else
/// is an [`Error::UnknownType`]. A disconnected downstream receiver is
/// logged and swallowed rather than propagated, since there is no sender
/// left to report the error to except the reader's own log.
pub fn dispatch_completed(
    packet_type: u8,
    kvm_id: &str,
    bytes: &[u8],
    downstream: &crossbeam_channel::Sender<MetricsHostInfo>,
) -> Result<(), Error> {
    if packet_type != METRICS_PACKET_TYPE {
        return Err(Error::UnknownType(packet_type));
    }

    let mut record: MetricsHostInfo =
        serde_json::from_slice(bytes).map_err(|source| Error::DecodePayload { packet_type, source })?;
    record.kvm_id = kvm_id.to_string();

    if downstream.send(record).is_err() {
        warn!(kvm_id, "downstream receiver gone, dropping completed record");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_packet_type_is_rejected() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let err = dispatch_completed(9, "kvm-1", b"{}", &tx).unwrap_err();
        assert!(matches!(err, Error::UnknownType(9)));
    }

    #[test]
    fn kvm_id_is_stamped_from_connection_not_payload() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let payload = br#"{"KvmID":"spoofed","metricsCode":"PC11","metricsName":"hb","metricsType":"push","summary":"","metricsData":null,"level":1,"interval":60}"#;
        dispatch_completed(METRICS_PACKET_TYPE, "real-kvm", payload, &tx).unwrap();
        let record = rx.recv().unwrap();
        assert_eq!(record.kvm_id, "real-kvm");
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let err = dispatch_completed(METRICS_PACKET_TYPE, "kvm-1", b"not json", &tx).unwrap_err();
        assert!(matches!(err, Error::DecodePayload { .. }));
    }
}
