//! Sample representations and the decoder-to-sink format translation.

use std::fmt;

use crate::error::UnsupportedFormat;

/// Decoder-native sample representation of a decoded frame.
///
/// Mirrors the decoder's packed/planar sample-format domain; `name` follows
/// the decoder's own short tags (`s16`, `fltp`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U8Planar,
    S16,
    S16Planar,
    S32,
    S32Planar,
    S64,
    S64Planar,
    F32,
    F32Planar,
    F64,
    F64Planar,
    /// The decoder reported no usable format.
    Unknown,
}

impl SampleFormat {
    /// Short identifying tag, matching the decoder's naming.
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::U8Planar => "u8p",
            SampleFormat::S16 => "s16",
            SampleFormat::S16Planar => "s16p",
            SampleFormat::S32 => "s32",
            SampleFormat::S32Planar => "s32p",
            SampleFormat::S64 => "s64",
            SampleFormat::S64Planar => "s64p",
            SampleFormat::F32 => "flt",
            SampleFormat::F32Planar => "fltp",
            SampleFormat::F64 => "dbl",
            SampleFormat::F64Planar => "dblp",
            SampleFormat::Unknown => "none",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sample representation accepted by the output sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkSampleFormat {
    /// Unsigned 8-bit.
    U8,
    /// Signed 16-bit little-endian.
    S16Le,
    /// 32-bit float little-endian.
    F32Le,
}

impl SinkSampleFormat {
    /// Width of one sample on the wire.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SinkSampleFormat::U8 => 1,
            SinkSampleFormat::S16Le => 2,
            SinkSampleFormat::F32Le => 4,
        }
    }
}

/// Output sink configuration, derived once from the first decoded frame and
/// immutable for the rest of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkFormat {
    pub sample_format: SinkSampleFormat,
    pub rate: u32,
    pub channels: u16,
}

/// Map a decoder-native representation to the sink representation.
///
/// Planar float is accepted: playback only ever reads channel 0, so planar
/// vs. interleaved makes no observable difference on a single-channel write
/// path. Planar s16 and s32 of any layout stay unsupported.
pub fn translate(format: SampleFormat) -> Result<SinkSampleFormat, UnsupportedFormat> {
    match format {
        SampleFormat::U8 => Ok(SinkSampleFormat::U8),
        SampleFormat::S16 => Ok(SinkSampleFormat::S16Le),
        SampleFormat::F32 | SampleFormat::F32Planar => Ok(SinkSampleFormat::F32Le),
        other => Err(UnsupportedFormat(other)),
    }
}
