//! Pipeline driver and the stage seams it sequences.
//!
//! One run: pull the first packet, decode it, configure the sink from that
//! first frame, then stream every decoded frame (the first one included)
//! through the playback stage until the source is exhausted. Strictly
//! single-threaded and in source order; exactly one frame is live at a time.

use crate::error::{ConfigError, DecodeError, OpenError, PipelineError, SinkWriteError};
use crate::format::{SampleFormat, SinkFormat, SinkSampleFormat, translate};
use crate::playback;

/// One decoded frame, borrowed from the decode stage's reused buffer.
///
/// The borrow ends the frame's life before the next `receive` call can
/// overwrite the buffer. Only channel 0 is carried downstream; for
/// interleaved layouts `channel0` starts at the same base address, so the
/// single-channel write path reads the same bytes either way.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Decoder-native sample representation.
    pub format: SampleFormat,
    /// Sample rate in Hz.
    pub rate: u32,
    /// Logical channel count; channels past 0 are never read.
    pub channels: u16,
    /// Declared sample count for channel 0.
    pub samples: usize,
    /// Raw bytes of channel 0.
    pub channel0: &'a [u8],
}

/// Demuxed packet source collaborator.
pub trait PacketSource {
    type Packet;

    /// Pull the next compressed packet; `None` once the stream is exhausted
    /// (zero-length packet, end of container, or read failure).
    fn read_next(&mut self) -> Option<Self::Packet>;
}

/// The stateful decoder behind a push-then-pull protocol.
pub trait FrameDecoder {
    type Packet;

    /// Feed one compressed packet into the decoder.
    fn submit(&mut self, packet: &Self::Packet) -> Result<(), DecodeError>;

    /// Drain the frame produced by the last submitted packet.
    ///
    /// The returned view borrows the decoder's single frame buffer and is
    /// valid only until the next `receive` call.
    fn receive(&mut self) -> Result<FrameView<'_>, DecodeError>;
}

/// Live audio output accepting raw samples in its configured representation.
pub trait SampleSink {
    /// Representation the sink was opened with.
    fn sample_format(&self) -> SinkSampleFormat;

    /// Write one sample's bytes, blocking until the sink accepts them.
    fn write(&mut self, sample: &[u8]) -> Result<(), SinkWriteError>;

    /// Play out whatever the sink still buffers, then release it.
    fn drain(self) -> Result<(), SinkWriteError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Derive the sink configuration from the first decoded frame and open the
/// sink with it.
///
/// Sample rate and channel count come straight from the frame's metadata;
/// the representation goes through [`translate`]. Taking the opener by value
/// makes a second invocation impossible: the sink is configured exactly once
/// per run, and every later frame is assumed to match.
pub fn configure_sink<K, F>(frame: &FrameView<'_>, open: F) -> Result<K, ConfigError>
where
    F: FnOnce(SinkFormat) -> Result<K, OpenError>,
{
    let sample_format = translate(frame.format)?;
    let format = SinkFormat {
        sample_format,
        rate: frame.rate,
        channels: frame.channels,
    };
    Ok(open(format)?)
}

/// Run the pipeline to completion.
///
/// Returns the number of frames decoded and played after the first one.
/// The first frame configures the sink and is played, but is not counted
/// in the summary.
pub fn run<S, D, K, F>(source: &mut S, decoder: &mut D, open_sink: F) -> Result<u64, PipelineError>
where
    S: PacketSource<Packet = D::Packet>,
    D: FrameDecoder,
    K: SampleSink,
    F: FnOnce(SinkFormat) -> Result<K, OpenError>,
{
    let first = source.read_next().ok_or(PipelineError::EmptyStream)?;
    decoder.submit(&first)?;

    let mut sink;
    {
        let frame = decoder.receive()?;
        sink = configure_sink(&frame, open_sink)?;
        playback::play(&frame, &mut sink)?;
    }

    let mut packets = 0u64;
    while let Some(packet) = source.read_next() {
        decoder.submit(&packet)?;
        let frame = decoder.receive()?;
        playback::play(&frame, &mut sink)?;
        packets += 1;
    }

    sink.drain()?;
    Ok(packets)
}
