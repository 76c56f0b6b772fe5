// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::warn;

use crate::audio::{AudioInput, AudioSettings, AudioSink};
use crate::error::{HalError, HalResult};
use crate::session::Capability;

#[derive(Default)]
struct AudioState {
    powered: bool,
    settings: Option<AudioSettings>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

/// Microphone producing a ramp: sample `n` of the capture has value `n`
#[derive(Clone, Default)]
pub struct SimAudio {
    state: Arc<Mutex<AudioState>>,
}

impl SimAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().worker.is_some()
    }

    fn halt(state: &mut AudioState) {
        state.running.store(false, Ordering::SeqCst);
        if let Some(worker) = state.worker.take() {
            if worker.join().is_err() {
                warn!(target: "coretest-hal", "Audio worker panicked");
            }
        }
    }
}

impl Capability for SimAudio {
    type Config = AudioSettings;

    fn name(&self) -> &'static str {
        "audio"
    }

    fn power_on(&mut self) -> HalResult<()> {
        self.state.lock().powered = true;
        Ok(())
    }

    fn configure(&mut self, config: &AudioSettings) -> HalResult<()> {
        if config.num_buffers == 0 || config.samples_per_buffer == 0 {
            return Err(HalError::Configure {
                device: "audio",
                reason: "buffers must be non-empty".to_string(),
            });
        }
        self.state.lock().settings = Some(*config);
        Ok(())
    }

    fn power_off(&mut self) {
        let mut state = self.state.lock();
        Self::halt(&mut state);
        state.powered = false;
        state.settings = None;
    }
}

impl AudioInput for SimAudio {
    fn start(&mut self, mut sink: AudioSink) -> HalResult<()> {
        let mut state = self.state.lock();
        if !state.powered {
            return Err(HalError::NotPowered("audio"));
        }
        let settings = state.settings.ok_or(HalError::NotPowered("audio"))?;
        Self::halt(&mut state);

        let running = Arc::new(AtomicBool::new(true));
        state.running = Arc::clone(&running);
        let period = Duration::from_millis(settings.buffer_duration_ms().max(1) as u64);
        let samples_per_buffer = settings.samples_per_buffer;

        let worker = thread::Builder::new()
            .name("coretest-sim-audio".to_string())
            .spawn(move || {
                let mut next_sample = 0i32;
                let mut buffer = vec![0i32; samples_per_buffer];
                while running.load(Ordering::SeqCst) {
                    thread::sleep(period);
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    for sample in buffer.iter_mut() {
                        *sample = next_sample;
                        next_sample = next_sample.wrapping_add(1);
                    }
                    sink(&buffer);
                }
            })
            .map_err(|e| HalError::Device(format!("failed to start audio worker: {}", e)))?;

        state.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        Self::halt(&mut self.state.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleRate;
    use crate::session::DeviceSession;

    #[test]
    fn test_ramp_delivery_and_stop() {
        let mut audio = SimAudio::new();
        let probe = audio.clone();
        let captured = Arc::new(Mutex::new(Vec::new()));
        {
            let mut session = DeviceSession::acquire(
                &mut audio,
                AudioSettings {
                    sample_rate: SampleRate::Hz16000,
                    num_buffers: 2,
                    samples_per_buffer: 160,
                },
            )
            .unwrap();

            let sink_buffer = Arc::clone(&captured);
            session
                .start(Box::new(move |samples: &[i32]| {
                    sink_buffer.lock().extend_from_slice(samples)
                }))
                .unwrap();
            thread::sleep(Duration::from_millis(60));
            session.stop();
            assert!(!probe.is_running());
        }
        assert!(!probe.is_powered());

        let samples = captured.lock();
        assert!(!samples.is_empty());
        assert_eq!(samples.len() % 160, 0);
        assert!(samples.iter().enumerate().all(|(i, s)| *s == i as i32));
    }

    #[test]
    fn test_start_requires_power() {
        let mut audio = SimAudio::new();
        assert_eq!(
            audio.start(Box::new(|_: &[i32]| {})).err(),
            Some(HalError::NotPowered("audio"))
        );
    }
}
