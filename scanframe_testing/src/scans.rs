//! Sample scans and generators.

use proptest::{collection::vec, prelude::*};
use rstest::fixture;
use scanframe::{Scan, ScanId};

/// Identifier of [`sample_scan`].
pub const SAMPLE_ID: ScanId = ScanId::new(1000, 500);

/// Three-point scan whose encoded body is 38 bytes long.
#[fixture]
pub fn sample_scan() -> Scan {
    Scan::new(SAMPLE_ID, vec![1.0, 2.0, 3.0], vec![9.0, 8.0, 7.0])
        .expect("sample channels have equal length")
}

/// Scan of `points` samples with distinct, reproducible values.
pub fn synthetic_scan(id: ScanId, points: usize) -> Scan {
    let ranges = (0..points).map(|i| i as f32 * 0.25).collect();
    let intensities = (0..points).map(|i| (points - i) as f32).collect();
    Scan::new(id, ranges, intensities).expect("synthetic channels have equal length")
}

/// Arbitrary scans of up to `max_points` samples, including non-finite
/// values.
pub fn scan_strategy(max_points: usize) -> impl Strategy<Value = Scan> {
    (any::<i64>(), any::<i32>(), 0..=max_points).prop_flat_map(|(seconds, nanos, points)| {
        (vec(any::<f32>(), points), vec(any::<f32>(), points)).prop_map(
            move |(ranges, intensities)| {
                Scan::new(ScanId::new(seconds, nanos), ranges, intensities)
                    .expect("strategy keeps channels equal")
            },
        )
    })
}
