//! Tests for inbound reassembly ordering, limits, eviction and decoding.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use rstest::rstest;

use crate::{
    codec::CodecError,
    fragment::{
        FragmentIndex,
        Fragmenter,
        Packet,
        ReassemblyError,
        ReassemblyProgress,
        Reassembler,
    },
    scan::{Scan, ScanId},
};

const SAMPLE_ID: ScanId = ScanId::new(1000, 500);

fn sample_scan() -> Scan {
    Scan::new(SAMPLE_ID, vec![1.0, 2.0, 3.0], vec![9.0, 8.0, 7.0]).expect("valid scan")
}

/// Start, Continue 0..=2, End 3 for the 38-byte sample body.
fn sample_packets() -> Vec<Packet> {
    Fragmenter::new(NonZeroUsize::new(10).expect("non-zero"))
        .fragment(&sample_scan())
        .expect("fragment scan")
        .into_packets()
}

fn feed(reassembler: &Reassembler, packets: impl IntoIterator<Item = Packet>) -> Vec<Scan> {
    packets
        .into_iter()
        .filter_map(|packet| reassembler.ingest(packet).expect("packet accepted"))
        .collect()
}

#[test]
fn reassembler_completes_in_order_sequence_on_end() {
    let reassembler = Reassembler::new();
    let mut packets = sample_packets();
    let end = packets.pop().expect("end packet");

    assert!(feed(&reassembler, packets).is_empty());
    assert_eq!(reassembler.pending_len(), 1);

    let scan = reassembler
        .ingest(end)
        .expect("end accepted")
        .expect("end completes the scan");
    assert_eq!(scan, sample_scan());
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn reassembler_completes_reverse_order_on_start() {
    let reassembler = Reassembler::new();
    let mut packets = sample_packets();
    packets.reverse();
    let start = packets.pop().expect("start packet now last");

    for packet in packets {
        assert!(
            reassembler
                .ingest(packet)
                .expect("fragment accepted")
                .is_none(),
            "no scan before the start arrives"
        );
    }

    let scan = reassembler
        .ingest(start)
        .expect("start accepted")
        .expect("start completes the scan");
    assert_eq!(scan, sample_scan());
    assert!(!reassembler.is_pending(SAMPLE_ID));
}

#[test]
fn reassembler_tolerates_duplicate_fragments() {
    let reassembler = Reassembler::new();
    let packets = sample_packets();
    let mut delivery = packets.clone();
    delivery.insert(2, packets[1].clone());
    delivery.insert(4, packets[3].clone());
    delivery.insert(1, packets[2].clone());

    let scans = feed(&reassembler, delivery);
    assert_eq!(scans, vec![sample_scan()]);
}

#[rstest]
#[case::start(0)]
#[case::first_chunk(1)]
#[case::middle_chunk(2)]
#[case::last_continue(3)]
#[case::end(4)]
fn withholding_any_packet_leaves_scan_pending(#[case] withheld: usize) {
    let reassembler = Reassembler::new();
    let mut packets = sample_packets();
    packets.remove(withheld);

    assert!(feed(&reassembler, packets).is_empty());
    assert!(reassembler.is_pending(SAMPLE_ID));
}

#[test]
fn pending_progress_tracks_received_chunks() {
    let reassembler = Reassembler::new();
    let packets = sample_packets();

    reassembler
        .ingest(packets[2].clone())
        .expect("orphan fragment accepted");
    assert_eq!(
        reassembler.pending_progress(SAMPLE_ID),
        Some(ReassemblyProgress {
            received: 1,
            total_fragments: None,
            buffered_bytes: 10,
        })
    );

    reassembler
        .ingest(packets[0].clone())
        .expect("start accepted");
    reassembler
        .ingest(packets[4].clone())
        .expect("end accepted");
    assert_eq!(
        reassembler.pending_progress(SAMPLE_ID),
        Some(ReassemblyProgress {
            received: 2,
            total_fragments: Some(4),
            buffered_bytes: 18,
        })
    );
    assert_eq!(reassembler.pending_progress(ScanId::new(0, 0)), None);
}

#[test]
fn reassembler_keeps_scans_apart() {
    let reassembler = Reassembler::new();
    let other = Scan::new(ScanId::new(1000, 501), vec![4.0; 5], vec![5.0; 5]).expect("valid");
    let fragmenter = Fragmenter::new(NonZeroUsize::new(10).expect("non-zero"));
    let other_packets = fragmenter.fragment(&other).expect("fragment").into_packets();

    let mut interleaved = Vec::new();
    let mut left = sample_packets().into_iter();
    let mut right = other_packets.into_iter();
    loop {
        let next = (left.next(), right.next());
        if next == (None, None) {
            break;
        }
        interleaved.extend(next.0);
        interleaved.extend(next.1);
    }

    let scans = feed(&reassembler, interleaved);
    assert_eq!(scans, vec![sample_scan(), other]);
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn empty_transmission_is_rejected_without_buffering() {
    let reassembler = Reassembler::new();
    let err = reassembler
        .ingest(Packet::start(SAMPLE_ID, 0))
        .expect_err("zero fragments can never complete");

    assert_eq!(err, ReassemblyError::EmptyTransmission { scan_id: SAMPLE_ID });
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn fragment_beyond_announced_total_is_rejected() {
    let reassembler = Reassembler::new();
    reassembler
        .ingest(Packet::start(SAMPLE_ID, 2))
        .expect("start accepted");

    let err = reassembler
        .ingest(Packet::end(SAMPLE_ID, FragmentIndex::new(2), vec![0_u8]))
        .expect_err("index 2 lies outside two fragments");
    assert_eq!(
        err,
        ReassemblyError::SequenceOutOfRange {
            scan_id: SAMPLE_ID,
            sequence: FragmentIndex::new(2),
            total_fragments: 2,
        }
    );
    assert_eq!(
        reassembler
            .pending_progress(SAMPLE_ID)
            .map(|progress| progress.received),
        Some(0)
    );
}

#[test]
fn reassembler_drops_buffer_exceeding_byte_cap() {
    let reassembler = Reassembler::with_max_scan_size(NonZeroUsize::new(4).expect("non-zero"));
    reassembler
        .ingest(Packet::start(SAMPLE_ID, 2))
        .expect("start accepted");
    reassembler
        .ingest(Packet::continuation(SAMPLE_ID, FragmentIndex::zero(), vec![1_u8, 2, 3]))
        .expect("first chunk within cap");

    let err = reassembler
        .ingest(Packet::end(SAMPLE_ID, FragmentIndex::new(1), vec![4_u8, 5]))
        .expect_err("growth beyond cap must be rejected");
    assert_eq!(
        err,
        ReassemblyError::MessageTooLarge {
            scan_id: SAMPLE_ID,
            attempted: 5,
            limit: 4,
        }
    );
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn reassembler_surfaces_malformed_payloads() {
    let reassembler = Reassembler::new();
    // Header declares three points but the body stops after the header.
    let mut body = vec![0_u8; 14];
    body[13] = 3;
    let packets = Fragmenter::new(NonZeroUsize::new(8).expect("non-zero"))
        .fragment_payload(SAMPLE_ID, body)
        .expect("fragment raw body")
        .into_packets();
    let (last, rest) = packets.split_last().expect("packets present");

    assert!(feed(&reassembler, rest.to_vec()).is_empty());
    let err = reassembler
        .ingest(last.clone())
        .expect_err("truncated body must not decode");
    assert_eq!(
        err,
        ReassemblyError::Malformed {
            scan_id: SAMPLE_ID,
            source: CodecError::MalformedPayload {
                expected: 38,
                actual: 14,
            },
        }
    );
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn late_fragments_after_completion_are_dropped() {
    let reassembler = Reassembler::new();
    let packets = sample_packets();
    assert_eq!(feed(&reassembler, packets.clone()).len(), 1);

    for late in [packets[4].clone(), packets[1].clone()] {
        assert_eq!(reassembler.ingest(late).expect("late duplicate accepted"), None);
    }
    assert_eq!(reassembler.pending_len(), 0);
    assert!(!reassembler.is_pending(SAMPLE_ID));
    assert!(!reassembler.evict(SAMPLE_ID));
}

#[test]
fn repeated_start_after_completion_is_dropped() {
    let reassembler = Reassembler::new();
    let packets = sample_packets();
    assert_eq!(feed(&reassembler, packets.clone()).len(), 1);

    assert!(feed(&reassembler, packets).is_empty());
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn start_with_new_total_reopens_completed_scan() {
    let reassembler = Reassembler::new();
    assert_eq!(feed(&reassembler, sample_packets()).len(), 1);

    reassembler
        .ingest(Packet::start(SAMPLE_ID, 2))
        .expect("start accepted");
    assert_eq!(
        reassembler.pending_progress(SAMPLE_ID),
        Some(ReassemblyProgress {
            received: 0,
            total_fragments: Some(2),
            buffered_bytes: 0,
        })
    );
}

#[test]
fn expired_completion_record_no_longer_drops_fragments() {
    let reassembler = Reassembler::new();
    let now = Instant::now();
    let packets = sample_packets();
    for packet in packets.iter().cloned() {
        reassembler.ingest_at(packet, now).expect("packet accepted");
    }

    let max_age = Duration::from_secs(5);
    assert!(reassembler.purge_expired_at(now + max_age, max_age).is_empty());

    reassembler
        .ingest(packets[4].clone())
        .expect("fragment accepted");
    assert_eq!(
        reassembler
            .pending_progress(SAMPLE_ID)
            .map(|progress| (progress.received, progress.total_fragments)),
        Some((1, None))
    );
}

#[rstest]
#[case::provisional(None)]
#[case::announced(Some(4))]
fn empty_fragments_are_rejected(#[case] announced: Option<u32>) {
    let reassembler = Reassembler::new();
    if let Some(total) = announced {
        reassembler
            .ingest(Packet::start(SAMPLE_ID, total))
            .expect("start accepted");
    }
    reassembler
        .ingest(Packet::continuation(SAMPLE_ID, FragmentIndex::zero(), vec![1_u8]))
        .expect("fragment accepted");
    let before = reassembler.pending_progress(SAMPLE_ID);

    let sequence = FragmentIndex::new(1);
    let err = reassembler
        .ingest(Packet::continuation(SAMPLE_ID, sequence, Vec::<u8>::new()))
        .expect_err("empty fragment must be rejected");
    assert_eq!(
        err,
        ReassemblyError::EmptyFragment {
            scan_id: SAMPLE_ID,
            sequence,
        }
    );
    assert_eq!(reassembler.pending_progress(SAMPLE_ID), before);
}

#[rstest]
#[case::provisional(None)]
#[case::announced(Some(1_000))]
fn byte_cap_bounds_the_fragment_count(#[case] announced: Option<u32>) {
    let reassembler = Reassembler::with_max_scan_size(NonZeroUsize::new(4).expect("non-zero"));
    if let Some(total) = announced {
        reassembler
            .ingest(Packet::start(SAMPLE_ID, total))
            .expect("start accepted");
    }

    for sequence in 0..4 {
        reassembler
            .ingest(Packet::continuation(SAMPLE_ID, FragmentIndex::new(sequence), vec![1_u8]))
            .expect("fragment within cap");
    }
    let err = reassembler
        .ingest(Packet::continuation(SAMPLE_ID, FragmentIndex::new(4), vec![1_u8]))
        .expect_err("fifth fragment exceeds the cap");
    assert_eq!(
        err,
        ReassemblyError::MessageTooLarge {
            scan_id: SAMPLE_ID,
            attempted: 5,
            limit: 4,
        }
    );
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn reassembler_purges_expired_buffers() {
    let reassembler = Reassembler::new();
    let now = Instant::now();
    let stale = ScanId::new(5, 0);
    let fresh = ScanId::new(6, 0);

    reassembler
        .ingest_at(Packet::start(stale, 3), now)
        .expect("start accepted");
    reassembler
        .ingest_at(Packet::start(fresh, 3), now + Duration::from_secs(2))
        .expect("start accepted");

    let later = now + Duration::from_secs(3);
    let evicted = reassembler.purge_expired_at(later, Duration::from_secs(3));
    assert_eq!(evicted, vec![stale]);
    assert_eq!(reassembler.pending_ids(), vec![fresh]);

    let evicted = reassembler.purge_expired_at(later, Duration::from_secs(1));
    assert_eq!(evicted, vec![fresh]);
    assert_eq!(reassembler.pending_len(), 0);
}

#[test]
fn evicted_scan_restarts_from_scratch() {
    let reassembler = Reassembler::new();
    let packets = sample_packets();

    feed(&reassembler, packets[..3].to_vec());
    assert!(reassembler.evict(SAMPLE_ID));

    // The remaining fragments alone cannot rebuild the scan.
    assert!(feed(&reassembler, packets[3..].to_vec()).is_empty());
    assert_eq!(
        reassembler
            .pending_progress(SAMPLE_ID)
            .map(|progress| (progress.received, progress.total_fragments)),
        Some((2, None))
    );
}
