//! monoplay — decode a compressed audio file and stream channel 0 to a live
//! output device.
//!
//! ## Pipeline
//! 1. **Source**: the container is demuxed into compressed packets.
//! 2. **Decode**: a stateful decoder turns each packet into one frame.
//! 3. **Sink**: the first decoded frame fixes the output format; every
//!    frame's channel 0 is then written, sample by sample, to a blocking
//!    CPAL sink.
//!
//! The write path blocks whenever the device needs to catch up, which holds
//! decoding at real-time playback rate. Any failure is fatal: the process
//! exits non-zero with a diagnostic.

mod cli;
mod decode;
mod device;
mod error;
mod format;
mod pipeline;
mod playback;
mod queue;
mod sink;
mod source;

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::DeviceTrait;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    ffmpeg_next::init().context("initialize decoder libraries")?;

    let host = cpal::default_host();
    if args.list_devices {
        device::list_devices(&host)?;
        return Ok(());
    }

    let _ = ctrlc::set_handler(|| std::process::exit(130));

    let mut source = source::AudioSource::open(&args.path)
        .with_context(|| format!("open {:?}", args.path))?;

    let info = source.info();
    tracing::info!(
        streams = info.streams,
        duration_ms = info.duration_ms,
        bit_rate = info.bit_rate,
        "input container"
    );

    let mut decoder = decode::AudioDecoder::for_source(&source)?;

    let device = device::pick_device(&host, args.device.as_deref())?;
    tracing::info!(device = %device.description()?, "output device");

    let buffer_seconds = args.buffer_seconds;
    let played = pipeline::run(&mut source, &mut decoder, |format| {
        tracing::info!(
            sample_format = ?format.sample_format,
            rate_hz = format.rate,
            channels = format.channels,
            "configuring output"
        );
        sink::CpalSink::open(&device, format, buffer_seconds)
    })?;

    println!("ok: {played} packets processed");
    Ok(())
}
