//! Serialised access to the global `logtest` logger.
//!
//! `logtest` installs a process-wide `log` backend, so tests that inspect log
//! output must take turns. Hold a [`LoggerHandle`] for the duration of the
//! test and pair it with `#[serial]`.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// Exclusive handle to the process-wide [`Logger`].
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the logger, starting it on first use, and discard any records
    /// left behind by earlier tests.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        // A test that panicked while holding the guard leaves the logger intact.
        let guard = logger.lock().unwrap_or_else(PoisonError::into_inner);

        let mut handle = Self { guard };
        handle.clear();
        handle
    }

    /// Drop every captured record.
    pub fn clear(&mut self) { while self.guard.pop().is_some() {} }

    /// Drain captured records, returning the messages logged at `level` that
    /// contain `needle`.
    pub fn take_matching(&mut self, level: Level, needle: &str) -> Vec<String> {
        let mut matches = Vec::new();
        while let Some(record) = self.guard.pop() {
            if record.level() == level && record.args().contains(needle) {
                matches.push(record.args().to_owned());
            }
        }
        matches
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
