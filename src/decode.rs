//! Decode stage: wraps the stateful audio decoder.
//!
//! The decoder follows a push-then-pull protocol: `submit` feeds one
//! compressed packet, `receive` drains the frame it produced. One frame
//! buffer is reused across calls; the view returned by `receive` borrows it
//! and is invalidated by the next call.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::error::EAGAIN;

use crate::error::{DecodeError, OpenError};
use crate::format::SampleFormat;
use crate::pipeline::{FrameDecoder, FrameView};
use crate::source::AudioSource;

pub struct AudioDecoder {
    decoder: ffmpeg::codec::decoder::Audio,
    frame: ffmpeg::frame::Audio,
}

impl AudioDecoder {
    /// Create a decoder for the source's selected audio stream.
    pub fn for_source(source: &AudioSource) -> Result<Self, OpenError> {
        let context = ffmpeg::codec::context::Context::from_parameters(source.parameters())
            .map_err(|e| OpenError::Decoder(e.to_string()))?;

        let decoder = context
            .decoder()
            .audio()
            .map_err(|e| OpenError::Decoder(e.to_string()))?;

        Ok(Self {
            decoder,
            frame: ffmpeg::frame::Audio::empty(),
        })
    }
}

impl FrameDecoder for AudioDecoder {
    type Packet = ffmpeg::Packet;

    fn submit(&mut self, packet: &ffmpeg::Packet) -> Result<(), DecodeError> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| DecodeError::SendRejected(e.to_string()))
    }

    fn receive(&mut self) -> Result<FrameView<'_>, DecodeError> {
        match self.decoder.receive_frame(&mut self.frame) {
            Ok(()) => Ok(FrameView {
                format: sample_format(self.frame.format()),
                rate: self.frame.rate(),
                channels: self.frame.channels(),
                samples: self.frame.samples(),
                channel0: self.frame.data(0),
            }),
            Err(e @ ffmpeg::Error::Other { errno: EAGAIN }) => {
                Err(DecodeError::NoFrameAvailable(e.to_string()))
            }
            Err(e) => Err(DecodeError::Fatal(e.to_string())),
        }
    }
}

/// Map the decoder's packed/planar sample format onto the pipeline's tags.
fn sample_format(sample: ffmpeg::format::Sample) -> SampleFormat {
    use ffmpeg::format::Sample;
    use ffmpeg::format::sample::Type::{Packed, Planar};

    match sample {
        Sample::U8(Packed) => SampleFormat::U8,
        Sample::U8(Planar) => SampleFormat::U8Planar,
        Sample::I16(Packed) => SampleFormat::S16,
        Sample::I16(Planar) => SampleFormat::S16Planar,
        Sample::I32(Packed) => SampleFormat::S32,
        Sample::I32(Planar) => SampleFormat::S32Planar,
        Sample::I64(Packed) => SampleFormat::S64,
        Sample::I64(Planar) => SampleFormat::S64Planar,
        Sample::F32(Packed) => SampleFormat::F32,
        Sample::F32(Planar) => SampleFormat::F32Planar,
        Sample::F64(Packed) => SampleFormat::F64,
        Sample::F64(Planar) => SampleFormat::F64Planar,
        Sample::None => SampleFormat::Unknown,
    }
}
