//! Bounded byte queue between the blocking sink writer and the output
//! callback.
//!
//! The writer side blocks while the queue is full; since the audio callback
//! drains the queue at the device's real-time rate, a full queue throttles
//! the whole pipeline to playback speed. The callback side never blocks and
//! substitutes silence on underrun.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Thread-safe bounded FIFO of raw sample bytes.
///
/// A `closed` flag is stored under the same mutex as the buffer so waiters
/// cannot miss a close. Closing is idempotent.
pub struct SampleQueue {
    inner: Mutex<Inner>,
    cv: Condvar,
    capacity: usize,
}

struct Inner {
    buf: VecDeque<u8>,
    closed: bool,
}

/// Queue capacity in bytes for `seconds` of audio at the given format.
///
/// Non-finite or non-positive `seconds` falls back to 2.0. The result is
/// never smaller than one sample.
pub fn calc_capacity_bytes(
    rate: u32,
    channels: u16,
    bytes_per_sample: usize,
    seconds: f32,
) -> usize {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        2.0
    };

    let frames = (rate as f32 * secs).ceil() as usize;
    frames
        .saturating_mul(channels as usize)
        .saturating_mul(bytes_per_sample)
        .max(bytes_per_sample)
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buf: VecDeque::new(),
                closed: false,
            }),
            cv: Condvar::new(),
            capacity,
        }
    }

    /// Mark the queue closed and wake all waiters.
    ///
    /// Buffered bytes remain poppable so the consumer can drain the tail.
    pub fn close(&self) {
        let mut g = self.inner.lock().unwrap();
        g.closed = true;
        drop(g);
        self.cv.notify_all();
    }

    /// Close the queue and discard everything buffered.
    ///
    /// Used when the consumer is gone for good (output stream error): any
    /// waiter blocked on capacity or on draining must not wait for a
    /// consumer that will never come back.
    pub fn fail(&self) {
        let mut g = self.inner.lock().unwrap();
        g.closed = true;
        g.buf.clear();
        drop(g);
        self.cv.notify_all();
    }

    /// Push bytes, blocking while the queue is full.
    ///
    /// Returns `false` if the queue was closed before every byte was
    /// accepted; the remainder is dropped.
    pub fn push_blocking(&self, bytes: &[u8]) -> bool {
        let mut offset = 0;

        while offset < bytes.len() {
            let mut g = self.inner.lock().unwrap();

            while g.buf.len() >= self.capacity && !g.closed {
                g = self.cv.wait(g).unwrap();
            }
            if g.closed {
                return false;
            }

            let mut pushed_any = false;
            while offset < bytes.len() && g.buf.len() < self.capacity {
                g.buf.push_back(bytes[offset]);
                offset += 1;
                pushed_any = true;
            }

            drop(g);
            if pushed_any {
                self.cv.notify_all();
            }
        }

        true
    }

    /// Pop up to `max` bytes without blocking; `None` when nothing is
    /// buffered.
    pub fn pop_up_to(&self, max: usize) -> Option<Vec<u8>> {
        let mut g = self.inner.lock().unwrap();

        let take = g.buf.len().min(max);
        if take == 0 {
            return None;
        }

        let mut out = Vec::with_capacity(take);
        for _ in 0..take {
            out.push(g.buf.pop_front().unwrap_or(0));
        }

        drop(g);
        self.cv.notify_all();
        Some(out)
    }

    /// Block until every buffered byte has been drained by the consumer.
    pub fn wait_until_empty(&self) {
        let mut g = self.inner.lock().unwrap();
        while !g.buf.is_empty() {
            g = self.cv.wait(g).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn calc_capacity_bytes_fallbacks() {
        assert_eq!(calc_capacity_bytes(48_000, 1, 4, 2.0), 384_000);
        assert_eq!(calc_capacity_bytes(48_000, 1, 4, -1.0), 384_000);
        assert_eq!(calc_capacity_bytes(48_000, 1, 4, f32::NAN), 384_000);
        assert_eq!(calc_capacity_bytes(48_000, 2, 2, 0.5), 96_000);
    }

    #[test]
    fn calc_capacity_bytes_never_below_one_sample() {
        assert_eq!(calc_capacity_bytes(0, 0, 4, 1.0), 4);
    }

    #[test]
    fn pop_on_empty_returns_none() {
        let q = SampleQueue::new(16);
        assert!(q.pop_up_to(4).is_none());
    }

    #[test]
    fn push_then_pop_preserves_order() {
        let q = SampleQueue::new(16);
        assert!(q.push_blocking(&[1, 2, 3, 4]));
        assert!(q.push_blocking(&[5, 6]));

        assert_eq!(q.pop_up_to(3), Some(vec![1, 2, 3]));
        assert_eq!(q.pop_up_to(16), Some(vec![4, 5, 6]));
        assert!(q.pop_up_to(1).is_none());
    }

    #[test]
    fn push_blocks_until_consumer_makes_room() {
        let q = Arc::new(SampleQueue::new(4));
        assert!(q.push_blocking(&[1, 2, 3, 4]));

        let q_push = q.clone();
        let handle = thread::spawn(move || q_push.push_blocking(&[5, 6]));

        // The pusher cannot finish until we drain.
        assert_eq!(q.pop_up_to(2), Some(vec![1, 2]));
        assert!(handle.join().unwrap());

        let mut drained = Vec::new();
        while let Some(chunk) = q.pop_up_to(8) {
            drained.extend(chunk);
        }
        assert_eq!(drained, vec![3, 4, 5, 6]);
    }

    #[test]
    fn close_unblocks_a_full_push() {
        let q = Arc::new(SampleQueue::new(2));
        assert!(q.push_blocking(&[1, 2]));

        let q_push = q.clone();
        let handle = thread::spawn(move || q_push.push_blocking(&[3]));

        q.close();
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn push_after_close_is_rejected() {
        let q = SampleQueue::new(8);
        q.close();
        assert!(!q.push_blocking(&[1]));
    }

    #[test]
    fn close_keeps_buffered_bytes_poppable() {
        let q = SampleQueue::new(8);
        assert!(q.push_blocking(&[1, 2]));
        q.close();
        assert_eq!(q.pop_up_to(8), Some(vec![1, 2]));
    }

    #[test]
    fn fail_discards_buffered_bytes() {
        let q = SampleQueue::new(8);
        assert!(q.push_blocking(&[1, 2]));
        q.fail();
        assert!(q.pop_up_to(8).is_none());
        assert!(!q.push_blocking(&[3]));
    }

    #[test]
    fn wait_until_empty_returns_once_drained() {
        let q = Arc::new(SampleQueue::new(8));
        assert!(q.push_blocking(&[1, 2, 3]));

        let q_pop = q.clone();
        let handle = thread::spawn(move || {
            while q_pop.pop_up_to(1).is_some() {}
        });

        q.wait_until_empty();
        assert!(q.pop_up_to(1).is_none());
        handle.join().unwrap();
    }
}
