//! Demo binary for `scanframe`.
//!
//! Builds a synthetic scan, fragments it, sends each packet through the wire
//! format, delivers the packets in the requested order and prints what the
//! reassembler produced.

mod cli;

use bytes::Bytes;
use clap::Parser;
use cli::{Cli, DeliveryOrder};
use scanframe::{Fragmenter, Packet, Reassembler, Scan, ScanId, decode_packet, encode_packet};

#[expect(
    clippy::cast_precision_loss,
    reason = "synthetic sample values only need approximate magnitudes"
)]
fn synthetic_scan(id: ScanId, points: usize) -> Result<Scan, scanframe::ScanError> {
    let ranges = (0..points).map(|i| 0.5 + (i % 100) as f32 * 0.01).collect();
    let intensities = (0..points).map(|i| (i % 256) as f32).collect();
    Scan::new(id, ranges, intensities)
}

fn arrange(mut frames: Vec<Bytes>, order: DeliveryOrder, duplicate: bool) -> Vec<Bytes> {
    match order {
        DeliveryOrder::InOrder => {}
        DeliveryOrder::Reverse => frames.reverse(),
        DeliveryOrder::StartLast => frames.rotate_left(1),
        DeliveryOrder::Interleaved => {
            let (even, odd): (Vec<_>, Vec<_>) =
                frames.into_iter().enumerate().partition(|(i, _)| i % 2 == 0);
            frames = even.into_iter().chain(odd).map(|(_, frame)| frame).collect();
        }
    }
    if duplicate {
        frames = frames
            .into_iter()
            .flat_map(|frame| [frame.clone(), frame])
            .collect();
    }
    frames
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    #[cfg(feature = "metrics")]
    let prometheus = if cli.metrics {
        Some(metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let scan = synthetic_scan(ScanId::new(cli.seconds, cli.nanos), cli.points)?;
    let batch = Fragmenter::new(cli.max_fragment_size).fragment(&scan)?;
    println!(
        "scan {} with {} points split into {} fragments",
        scan.id(),
        scan.point_count(),
        batch.total_fragments()
    );

    let frames: Vec<Bytes> = batch.packets().iter().map(encode_packet).collect();
    let reassembler = Reassembler::new();
    let mut rebuilt = Vec::new();
    for frame in arrange(frames, cli.order, cli.duplicate) {
        let packet: Packet = decode_packet(frame)?;
        if let Some(scan) = reassembler.ingest(packet)? {
            rebuilt.push(scan);
        }
    }

    for candidate in &rebuilt {
        println!(
            "rebuilt scan {}: {} points, identical to source: {}",
            candidate.id(),
            candidate.point_count(),
            candidate.bitwise_eq(&scan)
        );
    }
    if rebuilt.is_empty() {
        println!("no scan was rebuilt; {} buffers pending", reassembler.pending_len());
    }

    #[cfg(feature = "metrics")]
    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }
    #[cfg(not(feature = "metrics"))]
    if cli.metrics {
        eprintln!("built without the `metrics` feature; no counters to print");
    }

    Ok(())
}
