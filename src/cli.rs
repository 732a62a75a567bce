//! Command line interface for the `scanframe` demo binary.
//!
//! The binary synthesises a scan, pushes it through the fragmenter and the
//! packet wire format, delivers the packets in a chosen order, and reports
//! what the reassembler rebuilt.

use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};

/// Order in which the demo delivers packets to the reassembler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DeliveryOrder {
    /// Start, every Continue, then End.
    #[default]
    InOrder,
    /// The whole batch backwards, so Start arrives last.
    Reverse,
    /// Every fragment first, then Start.
    StartLast,
    /// Even positions followed by odd positions.
    Interleaved,
}

/// Command line arguments for the `scanframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "scanframe",
    version,
    about = "Fragment and reassemble a synthetic LIDAR scan"
)]
pub struct Cli {
    /// Number of points in the synthetic scan.
    #[arg(short, long, default_value_t = 360)]
    pub points: usize,
    /// Seconds component of the scan identifier.
    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    pub seconds: i64,
    /// Nanoseconds component of the scan identifier.
    #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
    pub nanos: i32,
    /// Largest chunk carried by a single packet, in bytes.
    #[arg(short = 'm', long, default_value = "240")]
    pub max_fragment_size: NonZeroUsize,
    /// Delivery order of the packets.
    #[arg(short, long, value_enum, default_value_t = DeliveryOrder::InOrder)]
    pub order: DeliveryOrder,
    /// Deliver every packet twice.
    #[arg(short, long)]
    pub duplicate: bool,
    /// Print the Prometheus rendering of the counters on exit.
    #[arg(long)]
    pub metrics: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, DeliveryOrder};

    #[test]
    fn parses_defaults() {
        let cli = Cli::parse_from(["scanframe"]);
        assert_eq!(cli.points, 360);
        assert_eq!(cli.max_fragment_size.get(), 240);
        assert_eq!(cli.order, DeliveryOrder::InOrder);
        assert!(!cli.duplicate);
    }

    #[test]
    fn parses_delivery_options() {
        let cli = Cli::parse_from([
            "scanframe",
            "--points",
            "3",
            "--seconds",
            "-4",
            "-m",
            "10",
            "--order",
            "start-last",
            "--duplicate",
        ]);
        assert_eq!(cli.points, 3);
        assert_eq!(cli.seconds, -4);
        assert_eq!(cli.max_fragment_size.get(), 10);
        assert_eq!(cli.order, DeliveryOrder::StartLast);
        assert!(cli.duplicate);
    }

    #[test]
    fn rejects_zero_fragment_size() {
        assert!(Cli::try_parse_from(["scanframe", "-m", "0"]).is_err());
    }
}
