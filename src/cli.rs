//! Command-line interface definitions.
//!
//! The `clap`-powered CLI surface (args + defaults). It intentionally has no
//! audio logic so the rest of the crate stays reusable.

use std::path::PathBuf;

use clap::Parser;

/// Decode a compressed audio file and play channel 0 on a live output device.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the input audio file
    pub path: PathBuf,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Use a specific output device by substring match
    #[arg(long)]
    pub device: Option<String>,

    /// Sink buffer target in seconds (larger absorbs more decode jitter)
    #[arg(long, default_value_t = 2.0)]
    pub buffer_seconds: f32,
}
