//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use super::{enqueue, Backend, GainGroup, Handle, Mixer, OutputGains, Sound};
use crate::synth::SampleRate;

/// Output device backend
///
/// Opens one stream at the device's default configuration and mixes every
/// sound handed to [`Backend::play`] into it. Callers render at
/// [`Backend::sample_rate`].
pub struct Player {
    mixer: Arc<Mutex<Mixer>>,
    rate: SampleRate,
    channels: u16,
    device_name: String,
    _stream: Stream,
}

impl Player {
    /// Open the default output device, or the one called `device_name`
    ///
    /// `buffer_size` requests a fixed callback size in frames; `None` keeps
    /// the device default.
    pub fn open(device_name: Option<&str>, buffer_size: Option<u32>, gains: OutputGains) -> Result<Self> {
        let host = cpal::default_host();
        debug!(host = ?host.id(), "audio host");

        let device = match device_name {
            Some(name) => find_output_device(&host, name)?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))?,
        };
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let config = device
            .default_output_config()
            .with_context(|| format!("no default output config for {device_name}"))?;
        let sample_format = config.sample_format();
        let mut stream_config: StreamConfig = config.into();
        if let Some(frames) = buffer_size {
            stream_config.buffer_size = BufferSize::Fixed(frames);
        }

        let rate = SampleRate::new(stream_config.sample_rate.0)?;
        let channels = stream_config.channels;
        let mixer = Arc::new(Mutex::new(Mixer::new(channels, gains)));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer.clone())?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer.clone())?,
            other => return Err(anyhow!("Unsupported sample format {other:?}")),
        };
        stream.play().context("failed to start output stream")?;

        info!(
            device = %device_name,
            sample_rate = rate.hz(),
            channels,
            format = ?sample_format,
            "audio output opened"
        );

        Ok(Self {
            mixer,
            rate,
            channels,
            device_name,
            _stream: stream,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Change the output gain of a group for sounds already playing too
    pub fn set_gain(&self, group: GainGroup, gain: f32) -> Result<()> {
        let mut mixer = self.mixer.lock().map_err(|_| anyhow!("mixer lock poisoned"))?;
        mixer.set_gain(group, gain);
        Ok(())
    }
}

impl Backend for Player {
    fn play(&self, sound: Sound, group: GainGroup) -> Result<Handle> {
        debug!(frames = sound.len(), channels = sound.channels(), ?group, "play");
        enqueue(&self.mixer, self.rate, sound, group)
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> SampleRate {
        self.rate
    }
}

fn find_output_device(host: &cpal::Host, name: &str) -> Result<Device> {
    host.output_devices()
        .context("failed to enumerate output devices")?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| anyhow!("Output device '{name}' not found"))
}

fn build_stream<T>(device: &Device, config: &StreamConfig, mixer: Arc<Mutex<Mixer>>) -> Result<Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if let Ok(mut mixer) = mixer.try_lock() {
                mixer.render(data);
            } else {
                // Mutex held by play(), fill with silence
                for sample in data.iter_mut() {
                    *sample = T::EQUILIBRIUM;
                }
            }
        },
        |err| {
            error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
