//! Audio output (§5 "Suspension points", §6 "Audio"): an 8-bit unsigned
//! stereo 48 kHz stream, queued from the emulator side and drained by
//! rodio's playback thread through a custom `Source`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dmg_core::SAMPLE_RATE_HZ;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::error::HostError;

/// Two frames' worth of samples at ~59.7 Hz (48000 / 59.7 * 2 ≈ 1608);
/// past this the queue drops the oldest samples so audio latency can't
/// grow unbounded (§5).
const WATERMARK_SAMPLES: usize = 1608;

#[derive(Clone)]
struct SampleQueue {
    samples: Arc<Mutex<VecDeque<(u8, u8)>>>,
    /// Which channel of the current stereo pair to emit next.
    next_is_left: bool,
}

impl Iterator for SampleQueue {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let mut queue = self.samples.lock().expect("audio queue poisoned");
        // An empty queue means the emulator is momentarily behind, not
        // that playback is over: pad with silence rather than returning
        // `None`, which would make rodio treat the source as finished.
        let (left, right) = queue.front().copied().unwrap_or((128, 128));
        let sample = if self.next_is_left { left } else { right };
        if !self.next_is_left && !queue.is_empty() {
            queue.pop_front();
        }
        self.next_is_left = !self.next_is_left;
        // Unsigned 8-bit PCM centered at 128 -> [-1.0, 1.0].
        Some((sample as f32 - 128.0) / 128.0)
    }
}

impl Source for SampleQueue {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }
    fn channels(&self) -> u16 {
        2
    }
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE_HZ
    }
    fn total_duration(&self) -> Option<std::time::Duration> {
        None
    }
}

pub struct AudioOutput {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
    samples: Arc<Mutex<VecDeque<(u8, u8)>>>,
}

impl AudioOutput {
    pub fn open() -> Result<AudioOutput, HostError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| HostError::Audio(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| HostError::Audio(e.to_string()))?;
        let samples = Arc::new(Mutex::new(VecDeque::new()));
        sink.append(SampleQueue { samples: samples.clone(), next_is_left: true });
        Ok(AudioOutput { _stream: stream, _handle: handle, sink, samples })
    }

    /// Enqueue newly-mixed samples, dropping the oldest once the
    /// watermark is exceeded rather than blocking the emulation thread
    /// (a dropped frame of audio is preferable to stalling the CPU loop).
    pub fn push_samples(&self, new_samples: Vec<(u8, u8)>) {
        let mut queue = self.samples.lock().expect("audio queue poisoned");
        queue.extend(new_samples);
        while queue.len() > WATERMARK_SAMPLES {
            queue.pop_front();
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }
}
