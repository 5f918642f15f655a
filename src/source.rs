//! Input container collaborator: the demuxed packet source.
//!
//! Opens the container, selects its audio stream, and pulls compressed
//! packets one at a time. Container metadata is exposed only for a one-line
//! diagnostic; pipeline logic never consults it.

use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::error::OpenError;
use crate::pipeline::PacketSource;

/// Container-level metadata, used only for diagnostics.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub streams: usize,
    pub duration_ms: Option<u64>,
    pub bit_rate: i64,
}

pub struct AudioSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
}

impl AudioSource {
    /// Open the container at `path` and select its best audio stream.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let input =
            ffmpeg::format::input(&path).map_err(|e| OpenError::Source(e.to_string()))?;

        let stream_index = input
            .streams()
            .best(ffmpeg::media::Type::Audio)
            .ok_or_else(|| OpenError::Source("no audio stream".into()))?
            .index();

        Ok(Self {
            input,
            stream_index,
        })
    }

    /// Codec parameters of the selected audio stream.
    pub fn parameters(&self) -> ffmpeg::codec::Parameters {
        self.input
            .streams()
            .find(|s| s.index() == self.stream_index)
            .map(|s| s.parameters())
            .unwrap_or_else(ffmpeg::codec::Parameters::new)
    }

    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            streams: self.input.streams().count(),
            duration_ms: duration_ms(self.input.duration()),
            bit_rate: self.input.bit_rate(),
        }
    }
}

impl PacketSource for AudioSource {
    type Packet = ffmpeg::Packet;

    /// Pull the next packet of the audio stream.
    ///
    /// A zero-length packet, the end of the container, or a read failure all
    /// end the stream; packets of other streams are skipped.
    fn read_next(&mut self) -> Option<ffmpeg::Packet> {
        loop {
            let mut packet = ffmpeg::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) if packet.stream() != self.stream_index => continue,
                Ok(()) if packet.size() == 0 => return None,
                Ok(()) => return Some(packet),
                Err(_) => return None,
            }
        }
    }
}

/// Container duration (microseconds; negative means unknown) in whole ms.
fn duration_ms(raw: i64) -> Option<u64> {
    if raw < 0 {
        None
    } else {
        Some(raw as u64 / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_ms_converts_microseconds() {
        assert_eq!(duration_ms(2_000_000), Some(2_000));
        assert_eq!(duration_ms(0), Some(0));
    }

    #[test]
    fn duration_ms_treats_negative_as_unknown() {
        assert_eq!(duration_ms(-1), None);
        assert_eq!(duration_ms(i64::MIN), None);
    }
}
