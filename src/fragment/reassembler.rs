//! Inbound helper that stitches packets back into complete scans.
//!
//! [`Reassembler`] mirrors the outbound [`Fragmenter`](crate::fragment::Fragmenter)
//! by collecting fragment payloads keyed by [`ScanId`]. Packets may arrive in
//! any order, duplicated, or never; the reassembler keeps one buffer per scan
//! until every announced chunk is present and then decodes the scan.
//!
//! Buffers live in a sharded [`DashMap`], so callers on different threads
//! only contend when their scans hash to the same shard. Each packet is
//! applied while holding that scan's entry guard: inserting the chunk,
//! checking completeness and taking the finished buffer are one step, so
//! exactly one caller ever observes a scan completing. Decoding runs after
//! the guard is released.
//!
//! A completed scan leaves a small completion record behind. Late duplicates
//! of its fragments are dropped against that record instead of opening a new
//! buffer; the record is pruned alongside stalled buffers.
//!
//! Nothing here runs on a timer. Buffers for transmissions that never finish
//! stay until [`Reassembler::evict`] or [`Reassembler::purge_expired`] is
//! called, typically by [`crate::supervisor`].

use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use bytes::Bytes;
use dashmap::{
    DashMap,
    mapref::entry::{Entry, OccupiedEntry},
};
use log::{debug, warn};

use super::{FragmentIndex, Packet, ReassemblyError};
use crate::{
    codec::{MAX_ENCODED_LEN, decode_scan},
    metrics,
    scan::{Scan, ScanId},
};

/// Byte cap applied by [`Reassembler::new`]: the largest encodable scan.
pub const DEFAULT_MAX_SCAN_SIZE: NonZeroUsize = match NonZeroUsize::new(MAX_ENCODED_LEN) {
    Some(size) => size,
    None => panic!("encoded scan ceiling must be non-zero"),
};

/// State held for one scan identity.
#[derive(Debug)]
enum Slot {
    Pending(PartialScan),
    /// The scan was taken out on completion. Late packets for it are dropped
    /// until the record expires.
    Completed {
        total_fragments: u32,
        completed_at: Instant,
    },
}

impl Slot {
    fn pending(&self) -> Option<&PartialScan> {
        match self {
            Self::Pending(partial) => Some(partial),
            Self::Completed { .. } => None,
        }
    }

    fn into_pending(self) -> Option<PartialScan> {
        match self {
            Self::Pending(partial) => Some(partial),
            Self::Completed { .. } => None,
        }
    }
}

#[derive(Debug)]
struct PartialScan {
    /// `None` until the scan's `Start` packet has been seen.
    total_fragments: Option<u32>,
    fragments: BTreeMap<FragmentIndex, Bytes>,
    buffered: usize,
    started_at: Instant,
}

impl PartialScan {
    fn announced(total_fragments: u32, started_at: Instant) -> Self {
        Self {
            total_fragments: Some(total_fragments),
            fragments: BTreeMap::new(),
            buffered: 0,
            started_at,
        }
    }

    fn provisional(started_at: Instant) -> Self {
        Self {
            total_fragments: None,
            fragments: BTreeMap::new(),
            buffered: 0,
            started_at,
        }
    }

    /// Store `data` at `sequence`, returning the new buffered byte count.
    fn insert(&mut self, sequence: FragmentIndex, data: Bytes) -> usize {
        self.buffered = self.buffered.saturating_add(data.len());
        if let Some(replaced) = self.fragments.insert(sequence, data) {
            self.buffered -= replaced.len();
        }
        self.buffered
    }

    /// Fix the total for a provisional buffer, dropping chunks beyond it.
    ///
    /// Returns the number of discarded chunks.
    fn adopt_total(&mut self, total_fragments: u32) -> usize {
        let beyond = self
            .fragments
            .split_off(&FragmentIndex::new(total_fragments));
        self.buffered -= beyond.values().map(Bytes::len).sum::<usize>();
        self.total_fragments = Some(total_fragments);
        beyond.len()
    }

    /// The announced total, once every chunk below it is present.
    ///
    /// Chunks are only stored below a known total, so a full count means
    /// every index is present.
    fn complete_total(&self) -> Option<u32> {
        self.total_fragments.filter(|&total| {
            usize::try_from(total).is_ok_and(|total| total == self.fragments.len())
        })
    }

    fn progress(&self) -> ReassemblyProgress {
        ReassemblyProgress {
            received: self.fragments.len(),
            total_fragments: self.total_fragments,
            buffered_bytes: self.buffered,
        }
    }

    fn into_payload(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.buffered);
        for chunk in self.fragments.into_values() {
            payload.extend_from_slice(&chunk);
        }
        payload
    }
}

/// Snapshot of a pending reassembly buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReassemblyProgress {
    /// Distinct chunks received so far.
    pub received: usize,
    /// Chunk count announced by `Start`, or `None` if it has not arrived.
    pub total_fragments: Option<u32>,
    /// Bytes held across the received chunks.
    pub buffered_bytes: usize,
}

/// Body of a scan whose buffer was taken out of the store on completion.
struct Completed {
    scan_id: ScanId,
    payload: Vec<u8>,
}

impl Completed {
    /// Swap the finished buffer for a completion record and return its body.
    fn take(
        mut entry: OccupiedEntry<'_, ScanId, Slot>,
        total_fragments: u32,
        now: Instant,
    ) -> Self {
        let scan_id = *entry.key();
        let finished = entry.insert(Slot::Completed {
            total_fragments,
            completed_at: now,
        });
        let payload = finished
            .into_pending()
            .map(PartialScan::into_payload)
            .unwrap_or_default();
        Self { scan_id, payload }
    }
}

/// Concurrent scan re-assembler with explicit eviction.
///
/// All methods take `&self`; share the reassembler between receive threads
/// with an [`Arc`](std::sync::Arc).
#[derive(Debug)]
pub struct Reassembler {
    max_scan_size: NonZeroUsize,
    buffers: DashMap<ScanId, Slot>,
}

impl Default for Reassembler {
    fn default() -> Self { Self::new() }
}

impl Reassembler {
    /// Create a re-assembler capped at the largest encodable scan.
    #[must_use]
    pub fn new() -> Self { Self::with_max_scan_size(DEFAULT_MAX_SCAN_SIZE) }

    /// Create a re-assembler that drops buffers growing beyond `max_scan_size` bytes.
    #[must_use]
    pub fn with_max_scan_size(max_scan_size: NonZeroUsize) -> Self {
        Self {
            max_scan_size,
            buffers: DashMap::new(),
        }
    }

    /// Process a packet using the current time.
    ///
    /// Returns `Ok(Some(_))` when this packet completed a scan and `Ok(None)`
    /// while more packets are required.
    ///
    /// A `Start` announcing zero fragments is rejected with
    /// [`ReassemblyError::EmptyTransmission`] and opens no buffer, rather than
    /// re-initialising the scan as if a real transmission had begun.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError`] when a `Start` announces no fragments, a
    /// fragment carries no data or lies beyond the announced total, a buffer
    /// outgrows the byte cap, or the completed body fails to decode.
    pub fn ingest(&self, packet: Packet) -> Result<Option<Scan>, ReassemblyError> {
        self.ingest_at(packet, Instant::now())
    }

    /// Process a packet using an explicit clock reading.
    ///
    /// `now` stamps any buffer the packet creates, which later drives
    /// [`purge_expired_at`](Self::purge_expired_at).
    ///
    /// # Errors
    ///
    /// See [`ingest`](Self::ingest).
    pub fn ingest_at(
        &self,
        packet: Packet,
        now: Instant,
    ) -> Result<Option<Scan>, ReassemblyError> {
        metrics::inc_packets(packet.kind());

        let accepted = match packet {
            Packet::Start {
                scan_id,
                total_fragments,
            } => self.accept_start(scan_id, total_fragments, now),
            Packet::Continue {
                scan_id,
                sequence,
                data,
            }
            | Packet::End {
                scan_id,
                sequence,
                data,
            } => self.accept_fragment(scan_id, sequence, data, now),
        };

        let result = match accepted {
            Ok(Some(completed)) => Self::decode(completed).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        };
        if result.is_err() {
            metrics::inc_errors();
        }
        result
    }

    fn accept_start(
        &self,
        scan_id: ScanId,
        total_fragments: u32,
        now: Instant,
    ) -> Result<Option<Completed>, ReassemblyError> {
        if total_fragments == 0 {
            return Err(ReassemblyError::EmptyTransmission { scan_id });
        }

        let mut occupied = match self.buffers.entry(scan_id) {
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Pending(PartialScan::announced(total_fragments, now)));
                return Ok(None);
            }
            Entry::Occupied(occupied) => occupied,
        };

        let partial = match occupied.get_mut() {
            Slot::Completed {
                total_fragments: finished,
                ..
            } if *finished == total_fragments => {
                debug!("scan {scan_id}: duplicate start after completion dropped");
                return Ok(None);
            }
            Slot::Completed { .. } => {
                debug!("scan {scan_id}: start announcing {total_fragments} fragments reopens it");
                occupied.insert(Slot::Pending(PartialScan::announced(total_fragments, now)));
                return Ok(None);
            }
            Slot::Pending(partial) => partial,
        };

        match partial.total_fragments {
            Some(existing) if existing == total_fragments => Ok(None),
            Some(existing) => {
                warn!(
                    "scan {scan_id}: start announcing {total_fragments} fragments supersedes \
                     {existing}; discarding {} buffered fragments",
                    partial.fragments.len()
                );
                occupied.insert(Slot::Pending(PartialScan::announced(total_fragments, now)));
                Ok(None)
            }
            None => {
                let discarded = partial.adopt_total(total_fragments);
                if discarded > 0 {
                    warn!(
                        "scan {scan_id}: discarded {discarded} early fragments beyond the \
                         announced {total_fragments}"
                    );
                }
                Ok(partial
                    .complete_total()
                    .map(|total| Completed::take(occupied, total, now)))
            }
        }
    }

    fn accept_fragment(
        &self,
        scan_id: ScanId,
        sequence: FragmentIndex,
        data: Bytes,
        now: Instant,
    ) -> Result<Option<Completed>, ReassemblyError> {
        // Every stored chunk holds at least one byte, so the byte cap also
        // bounds the number of chunks a buffer can hold.
        if data.is_empty() {
            warn!("scan {scan_id}: empty fragment {sequence} rejected");
            return Err(ReassemblyError::EmptyFragment { scan_id, sequence });
        }
        let limit = self.max_scan_size.get();

        let mut occupied = match self.buffers.entry(scan_id) {
            Entry::Vacant(vacant) => {
                debug!("scan {scan_id}: orphan fragment {sequence} buffered until its start");
                metrics::inc_orphan_fragments();
                if data.len() > limit {
                    return Err(ReassemblyError::MessageTooLarge {
                        scan_id,
                        attempted: data.len(),
                        limit,
                    });
                }
                let mut partial = PartialScan::provisional(now);
                partial.insert(sequence, data);
                vacant.insert(Slot::Pending(partial));
                return Ok(None);
            }
            Entry::Occupied(occupied) => occupied,
        };

        let Slot::Pending(partial) = occupied.get_mut() else {
            debug!("scan {scan_id}: late fragment {sequence} after completion dropped");
            return Ok(None);
        };

        if let Some(total_fragments) = partial
            .total_fragments
            .filter(|&total| !sequence.is_within(total))
        {
            warn!("scan {scan_id}: fragment {sequence} beyond {total_fragments} rejected");
            return Err(ReassemblyError::SequenceOutOfRange {
                scan_id,
                sequence,
                total_fragments,
            });
        }
        if partial.total_fragments.is_none() {
            debug!("scan {scan_id}: orphan fragment {sequence} joins provisional buffer");
            metrics::inc_orphan_fragments();
        }

        let attempted = partial.insert(sequence, data);
        if attempted > limit {
            occupied.remove();
            return Err(ReassemblyError::MessageTooLarge {
                scan_id,
                attempted,
                limit,
            });
        }

        Ok(partial
            .complete_total()
            .map(|total| Completed::take(occupied, total, now)))
    }

    fn decode(completed: Completed) -> Result<Scan, ReassemblyError> {
        let Completed { scan_id, payload } = completed;
        match decode_scan(&payload) {
            Ok(scan) => {
                debug!("scan {scan_id}: reassembled {} bytes", payload.len());
                metrics::inc_reassembled();
                Ok(scan)
            }
            Err(source) => {
                warn!("scan {scan_id}: reassembled payload failed to decode: {source}");
                Err(ReassemblyError::Malformed { scan_id, source })
            }
        }
    }

    /// Drop the buffer for `scan_id`, returning whether a pending one existed.
    ///
    /// Any completion record for the scan is forgotten as well, so later
    /// packets for it start a new transmission.
    pub fn evict(&self, scan_id: ScanId) -> bool {
        let removed = self
            .buffers
            .remove(&scan_id)
            .is_some_and(|(_, slot)| slot.pending().is_some());
        if removed {
            debug!("scan {scan_id}: buffer evicted");
            metrics::inc_evicted(1);
        }
        removed
    }

    /// Remove buffers older than `max_age`.
    ///
    /// Returns the identifiers of scans that were evicted, in ascending order.
    pub fn purge_expired(&self, max_age: Duration) -> Vec<ScanId> {
        self.purge_expired_at(Instant::now(), max_age)
    }

    /// Remove buffers older than `max_age` using an explicit clock reading.
    ///
    /// Completion records older than `max_age` are dropped too; they are not
    /// reported. Returns the identifiers of scans that were evicted, in
    /// ascending order.
    pub fn purge_expired_at(&self, now: Instant, max_age: Duration) -> Vec<ScanId> {
        let mut evicted = Vec::new();

        self.buffers.retain(|scan_id, slot| match slot {
            Slot::Pending(partial) => {
                let expired = now.saturating_duration_since(partial.started_at) >= max_age;
                if expired {
                    evicted.push(*scan_id);
                }
                !expired
            }
            Slot::Completed { completed_at, .. } => {
                now.saturating_duration_since(*completed_at) < max_age
            }
        });

        if !evicted.is_empty() {
            debug!("evicted {} stalled reassembly buffers", evicted.len());
            metrics::inc_evicted(evicted.len());
        }
        evicted.sort_unstable();
        evicted
    }

    /// Number of scans currently buffered.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffers
            .iter()
            .filter(|entry| entry.value().pending().is_some())
            .count()
    }

    /// Identifiers of buffered scans, in ascending order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<ScanId> {
        let mut ids: Vec<ScanId> = self
            .buffers
            .iter()
            .filter(|entry| entry.value().pending().is_some())
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Report whether a buffer exists for `scan_id`.
    #[must_use]
    pub fn is_pending(&self, scan_id: ScanId) -> bool {
        self.buffers
            .get(&scan_id)
            .is_some_and(|slot| slot.pending().is_some())
    }

    /// Snapshot of the buffer for `scan_id`, if any.
    #[must_use]
    pub fn pending_progress(&self, scan_id: ScanId) -> Option<ReassemblyProgress> {
        self.buffers
            .get(&scan_id)
            .and_then(|slot| slot.pending().map(PartialScan::progress))
    }
}
