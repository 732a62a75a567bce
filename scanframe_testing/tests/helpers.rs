//! Coverage for the delivery and capture helpers themselves.

use rstest::rstest;
use scanframe::{PacketKind, Reassembler, ScanId, metrics::SCANS_REASSEMBLED};
use scanframe_testing::{
    capture_metrics,
    deliver_over_wire,
    duplicated,
    fragment_with,
    interleave,
    sample_scan,
    start_last,
    synthetic_scan,
};

#[rstest]
fn start_last_moves_start_to_the_back(sample_scan: scanframe::Scan) {
    let packets = start_last(fragment_with(&sample_scan, 10));
    let kinds: Vec<PacketKind> = packets.iter().map(scanframe::Packet::kind).collect();
    assert_eq!(kinds.last(), Some(&PacketKind::Start));
    assert_eq!(kinds.first(), Some(&PacketKind::Continue));
}

#[test]
fn interleave_alternates_until_every_batch_is_empty() {
    let short = fragment_with(&sample_scan(), 40);
    let long = fragment_with(&synthetic_scan(ScanId::new(1, 0), 8), 10);
    let (short_len, long_len) = (short.len(), long.len());

    let merged = interleave(vec![short, long]);
    assert_eq!(merged.len(), short_len + long_len);
    assert_eq!(merged[0].scan_id(), sample_scan().id());
    assert_eq!(merged[1].scan_id(), ScanId::new(1, 0));
}

#[test]
fn capture_metrics_counts_reassembled_scans() {
    let (rebuilt, metrics) = capture_metrics(|| {
        deliver_over_wire(
            &Reassembler::new(),
            duplicated(fragment_with(&sample_scan(), 16)),
        )
    });
    assert_eq!(rebuilt, vec![sample_scan()]);
    assert_eq!(metrics.counter(SCANS_REASSEMBLED), 1);
}
