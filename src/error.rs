//! Error taxonomy for the decode-to-playback pipeline.
//!
//! Every failure is fatal at the point of first occurrence: errors carry
//! their structured cause and propagate with `?` up to `main`, which exits
//! with a non-zero status. There is no retry or partial-result mode.

use thiserror::Error;

use crate::format::SampleFormat;

/// Failure opening one of the pipeline's collaborators.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The input container could not be opened or carries no audio stream.
    #[error("unable to open input: {0}")]
    Source(String),
    /// No decoder could be created for the selected stream.
    #[error("unable to open decoder: {0}")]
    Decoder(String),
    /// The output device rejected the requested configuration.
    #[error("unable to open output device: {0}")]
    Sink(String),
}

/// The decoder produces samples in a representation the sink cannot take.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported sample format: {0}")]
pub struct UnsupportedFormat(pub SampleFormat);

/// Failures surfaced by the stateful decoder.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decoder refused the submitted packet (malformed data).
    #[error("decoder rejected packet: {0}")]
    SendRejected(String),
    /// The decoder needs more input before it can emit a frame.
    ///
    /// The driver treats this as fatal too: the source is assumed to supply
    /// self-contained packets that yield exactly one frame each.
    #[error("decoder produced no frame: {0}")]
    NoFrameAvailable(String),
    /// The decoder cannot continue.
    #[error("unrecoverable decode error: {0}")]
    Fatal(String),
}

/// A blocking write to the output sink failed.
#[derive(Debug, Error)]
#[error("sink write failed: {0}")]
pub struct SinkWriteError(pub String);

/// Failure while configuring the sink from the first decoded frame.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error(transparent)]
    Open(#[from] OpenError),
}

/// Terminal pipeline outcomes other than a clean drain.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source yielded no packets at all.
    #[error("input stream is empty")]
    EmptyStream,
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Write(#[from] SinkWriteError),
}
