//! CPAL-backed audio sink with a blocking write path.
//!
//! The sink owns a bounded byte queue and a CPAL output stream. `write`
//! pushes one sample's bytes and blocks while the queue is full; the output
//! callback drains the queue at the device's real-time rate and substitutes
//! silence on underrun. The device's own pace is therefore what backpressures
//! the writer.

use std::sync::{Arc, Mutex};

use cpal::SizedSample;
use cpal::traits::{DeviceTrait, StreamTrait};

use crate::error::{OpenError, SinkWriteError};
use crate::format::{SinkFormat, SinkSampleFormat};
use crate::pipeline::SampleSink;
use crate::queue::{SampleQueue, calc_capacity_bytes};

/// Live output device handle, opened exactly once per run.
pub struct CpalSink {
    format: SinkFormat,
    queue: Arc<SampleQueue>,
    failure: Arc<Mutex<Option<String>>>,
    // Dropping the stream stops playback and releases the device.
    _stream: cpal::Stream,
}

impl CpalSink {
    /// Open an output stream on `device` with the negotiated format.
    ///
    /// `buffer_seconds` sizes the byte queue; once it fills, writes block at
    /// real-time rate. Device rejection of the format is fatal.
    pub fn open(
        device: &cpal::Device,
        format: SinkFormat,
        buffer_seconds: f32,
    ) -> Result<Self, OpenError> {
        let capacity = calc_capacity_bytes(
            format.rate,
            format.channels,
            format.sample_format.bytes_per_sample(),
            buffer_seconds,
        );
        let queue = Arc::new(SampleQueue::new(capacity));
        let failure = Arc::new(Mutex::new(None));

        let config = cpal::StreamConfig {
            channels: format.channels,
            sample_rate: format.rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = match format.sample_format {
            SinkSampleFormat::U8 => build_stream::<u8>(device, &config, &queue, &failure),
            SinkSampleFormat::S16Le => build_stream::<i16>(device, &config, &queue, &failure),
            SinkSampleFormat::F32Le => build_stream::<f32>(device, &config, &queue, &failure),
        }?;
        stream.play().map_err(|e| OpenError::Sink(e.to_string()))?;

        Ok(Self {
            format,
            queue,
            failure,
            _stream: stream,
        })
    }

    fn failure_message(&self) -> String {
        self.failure
            .lock()
            .ok()
            .and_then(|g| g.clone())
            .unwrap_or_else(|| "output stream closed".to_string())
    }
}

impl SampleSink for CpalSink {
    fn sample_format(&self) -> SinkSampleFormat {
        self.format.sample_format
    }

    fn write(&mut self, sample: &[u8]) -> Result<(), SinkWriteError> {
        if self.queue.push_blocking(sample) {
            Ok(())
        } else {
            Err(SinkWriteError(self.failure_message()))
        }
    }

    fn drain(self) -> Result<(), SinkWriteError> {
        self.queue.close();
        self.queue.wait_until_empty();
        // Give the device a moment to flush the last callback's worth.
        std::thread::sleep(std::time::Duration::from_millis(100));
        Ok(())
    }
}

/// Little-endian wire decoding for the output callback.
trait SinkSample: SizedSample {
    const WIDTH: usize;
    fn from_le(bytes: &[u8]) -> Self;
}

impl SinkSample for u8 {
    const WIDTH: usize = 1;
    fn from_le(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl SinkSample for i16 {
    const WIDTH: usize = 2;
    fn from_le(bytes: &[u8]) -> Self {
        i16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl SinkSample for f32 {
    const WIDTH: usize = 4;
    fn from_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Local refill buffer so the callback reads the queue once per invocation
/// instead of once per output sample. A partial sample at the end of a
/// refill is carried over, keeping the byte stream aligned.
struct Refill {
    buf: Vec<u8>,
    pos: usize,
}

fn build_stream<T: SinkSample>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: &Arc<SampleQueue>,
    failure: &Arc<Mutex<Option<String>>>,
) -> Result<cpal::Stream, OpenError> {
    let queue_cb = queue.clone();
    let queue_err = queue.clone();
    let failure_err = failure.clone();
    let mut refill = Refill {
        buf: Vec::new(),
        pos: 0,
    };

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _| {
                let want = data.len() * T::WIDTH;

                if refill.buf.len() - refill.pos < want {
                    let tail = refill.buf.split_off(refill.pos);
                    refill.buf = tail;
                    refill.pos = 0;
                    if let Some(more) = queue_cb.pop_up_to(want - refill.buf.len()) {
                        refill.buf.extend_from_slice(&more);
                    }
                }

                for slot in data.iter_mut() {
                    *slot = if refill.pos + T::WIDTH <= refill.buf.len() {
                        let sample = T::from_le(&refill.buf[refill.pos..refill.pos + T::WIDTH]);
                        refill.pos += T::WIDTH;
                        sample
                    } else {
                        // Underrun: silence, never an error.
                        T::EQUILIBRIUM
                    };
                }
            },
            move |err| {
                tracing::error!("output stream error: {err}");
                if let Ok(mut g) = failure_err.lock() {
                    g.get_or_insert_with(|| err.to_string());
                }
                queue_err.fail();
            },
            None,
        )
        .map_err(|e| OpenError::Sink(e.to_string()))?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_sample_widths_match_wire_format() {
        assert_eq!(<u8 as SinkSample>::WIDTH, 1);
        assert_eq!(<i16 as SinkSample>::WIDTH, 2);
        assert_eq!(<f32 as SinkSample>::WIDTH, 4);
    }

    #[test]
    fn from_le_decodes_little_endian() {
        assert_eq!(<u8 as SinkSample>::from_le(&[0x80]), 0x80);
        assert_eq!(<i16 as SinkSample>::from_le(&[0x01, 0x80]), -32767);
        assert_eq!(
            <f32 as SinkSample>::from_le(&1.5f32.to_le_bytes()),
            1.5
        );
    }
}
