//! Soundlight - headless audio-reactive ambient LED visualizer.
//!
//! Captures an input device (or a synthetic mock source), maps the live
//! spectrum onto a strip of LEDs and logs the emitted color frames.

mod logging_setup;

use anyhow::{bail, Result};
use soundlight_core::audio::cpal_backend::CpalBackend;
use soundlight_core::audio::mock::{MockBackend, MockState};
use soundlight_core::{
    AudioBackend, LogConfig, SoundVisualizer, VisualizerConfig, VisualizerEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SPECTRUM_LEN: usize = 1024;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const FRAMES_PER_LOG: u64 = 30;

struct Options {
    mock: bool,
    list_devices: bool,
    device: i32,
    num_leds: usize,
    liquid: bool,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        mock: false,
        list_devices: false,
        device: -1,
        num_leds: 10,
        liquid: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mock" => options.mock = true,
            "--list-devices" => options.list_devices = true,
            "--liquid" => options.liquid = true,
            "--device" => {
                let value = args.next().unwrap_or_default();
                options.device = value.parse()?;
            }
            "--leds" => {
                let value = args.next().unwrap_or_default();
                options.num_leds = value.parse()?;
            }
            "--help" | "-h" => {
                println!(
                    "usage: soundlight [--mock] [--list-devices] [--liquid] \
                     [--device <id>] [--leds <n>]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(options)
}

/// Sweep a synthetic peak through the mock spectrum so the strip has
/// something to react to.
fn animate_mock(state: &Arc<parking_lot::Mutex<MockState>>, frame: u64) {
    let mut state = state.lock();
    if state.spectrum.len() != SPECTRUM_LEN {
        state.spectrum = vec![0.0; SPECTRUM_LEN];
    }
    state.spectrum.fill(0.0);
    let bin = 1 + (frame as usize * 7) % (SPECTRUM_LEN - 1);
    state.spectrum[bin] = 0.8;
    state.spectrum[1] = 0.3 + 0.3 * ((frame as f32) * 0.1).sin();
}

fn main() -> Result<()> {
    let options = parse_args()?;
    let log_config = LogConfig::default();
    let _log_guard = logging_setup::init(&log_config)?;

    let mut mock_state = None;
    let backend: Box<dyn AudioBackend> = if options.mock {
        let backend = MockBackend::new();
        mock_state = Some(backend.handle());
        Box::new(backend)
    } else {
        Box::new(CpalBackend::new(SPECTRUM_LEN))
    };

    let config = VisualizerConfig {
        device: options.device,
        num_leds: options.num_leds,
        liquid_mode: options.liquid,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, backend)?;
    let events = visualizer.subscribe();

    if options.list_devices {
        let Some(list) = visualizer.request_device_list() else {
            bail!("audio device enumeration failed");
        };
        for (index, device) in list.devices.iter().enumerate() {
            let marker = if list.recommended == Some(index) {
                " (recommended)"
            } else {
                ""
            };
            println!("{}: {}{}", device.id, device.name, marker);
        }
        return Ok(());
    }

    if let Some(state) = &mock_state {
        animate_mock(state, 0);
    }
    visualizer.set_enabled(true);
    if !visualizer.is_enabled() {
        bail!("audio capture could not be started");
    }
    info!(
        leds = options.num_leds,
        liquid = options.liquid,
        "visualizing"
    );

    let mut frame: u64 = 0;
    loop {
        if let Some(state) = &mock_state {
            animate_mock(state, frame);
        }
        visualizer.update_colors();

        while let Ok(event) = events.try_recv() {
            if let VisualizerEvent::LedColors(colors) = event {
                if frame % FRAMES_PER_LOG == 0 {
                    let strip: Vec<String> = colors
                        .iter()
                        .map(|color| format!("#{:06x}", color.to_u32()))
                        .collect();
                    info!(frame, "colors: {}", strip.join(" "));
                }
            }
        }

        frame += 1;
        std::thread::sleep(FRAME_INTERVAL);
    }
}
