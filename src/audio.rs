use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, Stream};
use log::{error, info, warn};
use std::sync::{Arc, RwLock};
use crate::core::graph::AudioError;
use crate::core::mixer::Mixer;

/// Live cpal output stream fed by the shared mixer
pub struct AudioOutput {
    _stream: Stream,
    mixer: Arc<RwLock<Mixer>>,
    device_name: String,
}

impl AudioOutput {
    /// Open the named output device, or the default one if it's missing
    pub fn open(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = match preferred_device {
            Some(name) => find_output_device(&host, name).or_else(|| {
                warn!("Output device {:?} not found, using default", name);
                host.default_output_device()
            }),
            None => host.default_output_device(),
        };
        let device = require_device(device)
            .with_context(|| format!("No usable output on host {}", host.id().name()))?;

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        info!("Using output device: {}", device_name);

        let config = device.default_output_config()
            .map_err(|e| AudioError::StreamUnavailable(e.to_string()))
            .context("Failed to query output config")?;
        info!("Device config: {:?}", config);

        let sample_format = config.sample_format();
        let config = cpal::StreamConfig::from(config);
        let sample_rate = config.sample_rate.0 as f32;

        let mixer = Arc::new(RwLock::new(Mixer::new(sample_rate)));

        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(&device, &config, Arc::clone(&mixer)),
            SampleFormat::I16 => create_stream::<i16>(&device, &config, Arc::clone(&mixer)),
            SampleFormat::U16 => create_stream::<u16>(&device, &config, Arc::clone(&mixer)),
            other => Err(AudioError::StreamUnavailable(format!("unsupported sample format {:?}", other))),
        }
        .with_context(|| format!("Failed to build output stream on {}", device_name))?;

        stream.play()
            .map_err(|e| AudioError::StreamUnavailable(e.to_string()))
            .context("Failed to start audio stream")?;
        info!("Audio stream started at {} Hz", sample_rate);

        Ok(Self {
            _stream: stream,
            mixer,
            device_name,
        })
    }

    pub fn mixer(&self) -> Arc<RwLock<Mixer>> {
        Arc::clone(&self.mixer)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

pub fn output_device_names() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            warn!("Could not enumerate output devices: {}", e);
            Vec::new()
        }
    }
}

fn require_device<D>(device: Option<D>) -> Result<D, AudioError> {
    device.ok_or_else(|| AudioError::StreamUnavailable("no output device available".to_string()))
}

fn find_output_device(host: &cpal::Host, name: &str) -> Option<cpal::Device> {
    host.output_devices()
        .ok()?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mixer: Arc<RwLock<Mixer>>,
) -> Result<Stream, AudioError>
where
    T: Sample + Send + 'static + cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Hold the lock once per buffer, not per frame
            let mut guard = mixer.write().ok();
            for frame in data.chunks_mut(channels) {
                let value = match guard.as_mut() {
                    Some(m) => m.next_sample(),
                    None => 0.0,
                };

                let value_t = T::from_sample(value);

                for sample in frame.iter_mut() {
                    *sample = value_t;
                }
            }
        },
        err_fn,
        None,
    ).map_err(|e| AudioError::StreamUnavailable(e.to_string()))?;

    Ok(stream)
}
