//! cpal-based capture backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error};

use super::analyzer::SpectrumAnalyzer;
use super::{AudioBackend, AudioDeviceInfo, AudioError, DeviceList, Result};

const SAMPLE_QUEUE_DEPTH: usize = 64;

/// Captures from a cpal input device and serves FFT magnitudes.
///
/// The stream callback runs on cpal's thread and only forwards mono-mixed
/// sample chunks over a bounded channel; all analysis happens on the
/// caller's thread inside [`fill_spectrum`](AudioBackend::fill_spectrum).
pub struct CpalBackend {
    host: Option<cpal::Host>,
    stream: Option<cpal::Stream>,
    samples: Option<Receiver<Vec<f32>>>,
    analyzer: SpectrumAnalyzer,
}

impl CpalBackend {
    /// Create a backend producing `spectrum_len` magnitude bins.
    pub fn new(spectrum_len: usize) -> Self {
        Self {
            host: None,
            stream: None,
            samples: None,
            analyzer: SpectrumAnalyzer::new(spectrum_len),
        }
    }

    fn select_device(&self, device: i32) -> Result<cpal::Device> {
        let host = self.host.as_ref().ok_or(AudioError::NotInitialized)?;
        if device < 0 {
            return host.default_input_device().ok_or(AudioError::NoDefaultDevice);
        }
        host.input_devices()?
            .nth(device as usize)
            .ok_or(AudioError::UnknownDevice(device))
    }
}

impl AudioBackend for CpalBackend {
    fn init(&mut self) -> Result<()> {
        if self.host.is_none() {
            let host = cpal::default_host();
            debug!("audio host initialized: {:?}", host.id());
            self.host = Some(host);
        }
        Ok(())
    }

    fn is_inited(&self) -> bool {
        self.host.is_some()
    }

    fn enumerate_devices(&mut self) -> Result<DeviceList> {
        let host = self.host.as_ref().ok_or(AudioError::NotInitialized)?;
        let default_name = host
            .default_input_device()
            .and_then(|device| device.name().ok());

        let mut devices = Vec::new();
        for (index, device) in host.input_devices()?.enumerate() {
            let name = device
                .name()
                .unwrap_or_else(|_| format!("Input device {index}"));
            let is_default = default_name.as_deref() == Some(name.as_str());
            devices.push(AudioDeviceInfo {
                id: index as i32,
                name,
                is_default,
            });
        }
        let recommended = devices.iter().position(|device| device.is_default);
        Ok(DeviceList {
            devices,
            recommended,
        })
    }

    fn start(&mut self, device: i32) -> Result<()> {
        self.stop();

        let device = self.select_device(device)?;
        let supported = device.default_input_config()?;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = bounded(SAMPLE_QUEUE_DEPTH);
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, tx)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;

        debug!(
            ?sample_format,
            channels,
            sample_rate = config.sample_rate,
            "audio capture started"
        );
        self.stream = Some(stream);
        self.samples = Some(rx);
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("audio capture stopped");
        }
        self.samples = None;
        self.analyzer.reset();
    }

    fn fill_spectrum(&mut self, spectrum: &mut [f32]) -> Result<()> {
        let samples = self
            .samples
            .as_ref()
            .ok_or_else(|| AudioError::Capture("capture is not running".into()))?;
        while let Ok(chunk) = samples.try_recv() {
            self.analyzer.push_samples(&chunk);
        }
        self.analyzer.compute();
        self.analyzer.copy_magnitudes_into(spectrum);
        Ok(())
    }
}

/// Build an input stream that mixes frames down to mono f32 and forwards
/// them over `tx`. Chunks are dropped when the queue is full; the analyzer
/// side never blocks the audio callback.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    tx: Sender<Vec<f32>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut mono = Vec::with_capacity(data.len() / channels);
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                mono.push(sum / channels as f32);
            }
            let _ = tx.try_send(mono);
        },
        |err| error!("input stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
