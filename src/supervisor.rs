//! Background eviction of stalled reassembly buffers.
//!
//! A [`Reassembler`] never drops a partial scan on its own. Receivers that run
//! on a Tokio runtime can hand it to [`spawn_sweeper`], which periodically
//! evicts buffers older than [`SweepConfig::max_age`] until the supplied
//! [`CancellationToken`] fires.

use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;

use crate::fragment::Reassembler;

/// Timing for the eviction sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Delay between consecutive sweeps.
    pub interval: Duration,
    /// Age after which a pending buffer is evicted.
    pub max_age: Duration,
}

impl SweepConfig {
    /// Build a sweep configuration.
    #[must_use]
    pub const fn new(interval: Duration, max_age: Duration) -> Self { Self { interval, max_age } }
}

impl Default for SweepConfig {
    fn default() -> Self { Self::new(Duration::from_secs(1), Duration::from_secs(5)) }
}

/// Spawn [`run_sweeper`] onto the current Tokio runtime.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime or if `config.interval` is zero.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use scanframe::{
///     Reassembler,
///     supervisor::{SweepConfig, spawn_sweeper},
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let reassembler = Arc::new(Reassembler::new());
/// let shutdown = CancellationToken::new();
/// let handle = spawn_sweeper(reassembler, SweepConfig::default(), shutdown.clone());
/// shutdown.cancel();
/// handle.await.expect("sweeper exits cleanly");
/// # }
/// ```
#[must_use]
pub fn spawn_sweeper(
    reassembler: Arc<Reassembler>,
    config: SweepConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_sweeper(reassembler, config, shutdown))
}

/// Evict expired buffers on every tick until `shutdown` is cancelled.
///
/// The first sweep happens one full interval after the call. Evictions are
/// reported through `tracing` at info level.
///
/// # Panics
///
/// Panics if `config.interval` is zero.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
pub async fn run_sweeper(
    reassembler: Arc<Reassembler>,
    config: SweepConfig,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        select! {
            biased;

            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let now = Instant::now().into_std();
                let evicted = reassembler.purge_expired_at(now, config.max_age);
                if !evicted.is_empty() {
                    tracing::info!(count = evicted.len(), ?evicted, "evicted stalled scans");
                }
            }
        }
    }
    tracing::debug!("reassembly sweeper stopped");
}
