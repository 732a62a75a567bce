//! Scoped metric capture built on `metrics_util`'s debugging recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder};

/// Counter values recorded while a closure ran.
#[derive(Debug, Default)]
pub struct MetricsCapture {
    counters: Vec<(String, Vec<(String, String)>, u64)>,
}

impl MetricsCapture {
    /// Sum of every counter named `name`, across all label sets.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|(key, _, _)| key == name)
            .map(|(_, _, value)| value)
            .sum()
    }

    /// Value of the counter named `name` carrying the label `label=value`.
    pub fn counter_with_label(&self, name: &str, label: &str, value: &str) -> u64 {
        self.counters
            .iter()
            .filter(|(key, labels, _)| {
                key == name && labels.iter().any(|(k, v)| k == label && v == value)
            })
            .map(|(_, _, count)| count)
            .sum()
    }
}

/// Run `f` with a thread-local debugging recorder installed and return its
/// result with the counters it recorded.
pub fn capture_metrics<T>(f: impl FnOnce() -> T) -> (T, MetricsCapture) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let out = metrics::with_local_recorder(&recorder, f);

    let counters = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(key, _, _, value)| match value {
            DebugValue::Counter(count) => {
                let key = key.key();
                let labels = key
                    .labels()
                    .map(|label| (label.key().to_owned(), label.value().to_owned()))
                    .collect();
                Some((key.name().to_owned(), labels, count))
            }
            _ => None,
        })
        .collect();
    (out, MetricsCapture { counters })
}
