//! Microphone access through cpal.
//!
//! Desktop hosts have no permission prompt, so authorization always
//! succeeds. Each opened stream feeds a peak meter for its chosen channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleRate, Stream, StreamConfig};

use crate::engine::{InputDevice, MediaDevices, StreamConstraints, StreamHandle};
use crate::error::MediaError;

struct OpenStream {
    // Dropping the stream stops capture.
    _stream: Stream,
    peak: Arc<Mutex<f32>>,
}

pub struct CpalInput {
    host: Host,
    streams: HashMap<StreamHandle, OpenStream>,
    next_handle: u64,
}

impl CpalInput {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            streams: HashMap::new(),
            next_handle: 0,
        }
    }

    fn device(&self, id: &str) -> Result<Device, MediaError> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        for device in devices {
            if device.name().map(|n| n == id).unwrap_or(false) {
                return Ok(device);
            }
        }
        Err(MediaError::DeviceUnavailable(id.to_string()))
    }

    /// Peak level seen on a stream since the last call, 0.0 to 1.0.
    pub fn take_peak(&self, stream: StreamHandle) -> Option<f32> {
        let open = self.streams.get(&stream)?;
        let mut peak = open.peak.lock().ok()?;
        let value = *peak;
        *peak = 0.0;
        Some(value)
    }
}

impl Default for CpalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDevices for CpalInput {
    fn enumerate_inputs(&mut self) -> Result<Vec<InputDevice>, MediaError> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        Ok(devices
            .filter_map(|d| d.name().ok())
            .map(|name| InputDevice {
                id: name.clone(),
                label: name,
            })
            .collect())
    }

    fn request_permission(&mut self) -> Result<(), MediaError> {
        Ok(())
    }

    fn probe_channels(&mut self, device_id: &str) -> Result<u16, MediaError> {
        let config = self
            .device(device_id)?
            .default_input_config()
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        Ok(config.channels())
    }

    fn open_stream(&mut self, constraints: &StreamConstraints) -> Result<StreamHandle, MediaError> {
        let device = self.device(&constraints.device_id)?;
        let default = device
            .default_input_config()
            .map_err(|e| MediaError::Backend(e.to_string()))?;
        let mut config: StreamConfig = default.into();
        if let Some(hints) = constraints.processing {
            config.sample_rate = SampleRate(hints.sample_rate);
        }

        let channels = config.channels.max(1) as usize;
        let channel = constraints
            .channel
            .map(|c| (c as usize).saturating_sub(1).min(channels - 1));
        let peak = Arc::new(Mutex::new(0.0_f32));
        let meter = Arc::clone(&peak);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let level = match channel {
                        Some(ch) => data
                            .chunks(channels)
                            .filter_map(|frame| frame.get(ch))
                            .fold(0.0_f32, |acc, s| acc.max(s.abs())),
                        None => data.iter().fold(0.0_f32, |acc, s| acc.max(s.abs())),
                    };
                    if let Ok(mut p) = meter.lock() {
                        *p = p.max(level);
                    }
                },
                |err| {
                    log::error!(target: "live_input", "input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MediaError::DeviceUnavailable(e.to_string()))?;
        stream
            .play()
            .map_err(|e| MediaError::Backend(e.to_string()))?;

        let handle = StreamHandle(self.next_handle);
        self.next_handle += 1;
        self.streams.insert(
            handle,
            OpenStream {
                _stream: stream,
                peak,
            },
        );
        Ok(handle)
    }

    fn stop_stream(&mut self, stream: StreamHandle) {
        if self.streams.remove(&stream).is_none() {
            log::debug!(target: "live_input", "stream {:?} was not open", stream);
        }
    }
}
