use soundlight_core::audio::mock::MockBackend;
use soundlight_core::{Rgb, SoundVisualizer, VisualizerConfig, VisualizerEvent};

const SPECTRUM_LEN: usize = 1024;

fn drain_color_events(
    events: &crossbeam_channel::Receiver<VisualizerEvent>,
) -> Vec<Vec<Rgb>> {
    let mut frames = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let VisualizerEvent::LedColors(colors) = event {
            frames.push(colors);
        }
    }
    frames
}

#[test]
fn enable_starts_capture_on_the_configured_device() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        device: 1,
        num_leds: 3,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();

    visualizer.set_enabled(true);
    assert!(visualizer.is_enabled());
    {
        let state = state.lock();
        assert!(state.running);
        assert_eq!(state.starts, 1);
        assert_eq!(state.last_device, 1);
    }

    visualizer.set_enabled(false);
    assert!(!visualizer.is_enabled());
    assert!(!state.lock().running);
}

#[test]
fn capture_start_failure_degrades_silently() {
    let backend = MockBackend::new();
    backend.handle().lock().fail_start = true;
    let mut visualizer =
        SoundVisualizer::new(VisualizerConfig::default(), SPECTRUM_LEN, Box::new(backend))
            .unwrap();

    visualizer.set_enabled(true);
    assert!(!visualizer.is_enabled());
    // A disabled visualizer ignores frame updates entirely.
    let events = visualizer.subscribe();
    visualizer.update_colors();
    assert!(events.try_recv().is_err());
}

#[test]
fn init_failure_disables_on_device_list_request() {
    let backend = MockBackend::new();
    backend.handle().lock().fail_init = true;
    let mut visualizer =
        SoundVisualizer::new(VisualizerConfig::default(), SPECTRUM_LEN, Box::new(backend))
            .unwrap();

    assert!(visualizer.request_device_list().is_none());
    assert!(!visualizer.is_enabled());
}

#[test]
fn device_list_is_emitted_and_returned() {
    let backend = MockBackend::new();
    let mut visualizer =
        SoundVisualizer::new(VisualizerConfig::default(), SPECTRUM_LEN, Box::new(backend))
            .unwrap();
    let events = visualizer.subscribe();

    let list = visualizer.request_device_list().unwrap();
    assert_eq!(list.devices.len(), 2);
    assert_eq!(list.recommended, Some(0));
    assert!(list.devices[0].is_default);

    match events.try_recv().unwrap() {
        VisualizerEvent::DeviceList(emitted) => assert_eq!(emitted, list),
        other => panic!("expected device list event, got {other:?}"),
    }
}

#[test]
fn change_gating_suppresses_identical_frames() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 4,
        send_only_if_changed: true,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();
    let events = visualizer.subscribe();

    state.lock().spectrum = {
        let mut spectrum = vec![0.0; SPECTRUM_LEN];
        spectrum[1] = 0.25;
        spectrum
    };
    visualizer.set_enabled(true);

    visualizer.update_colors();
    assert_eq!(drain_color_events(&events).len(), 1, "first frame changes");

    for _ in 0..5 {
        visualizer.update_colors();
    }
    assert_eq!(
        drain_color_events(&events).len(),
        0,
        "identical frames are gated"
    );

    visualizer.set_send_only_if_changed(false);
    for _ in 0..3 {
        visualizer.update_colors();
    }
    assert_eq!(
        drain_color_events(&events).len(),
        3,
        "ungated frames always emit"
    );
}

#[test]
fn device_swap_while_running_restarts_capture() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let mut visualizer =
        SoundVisualizer::new(VisualizerConfig::default(), SPECTRUM_LEN, Box::new(backend))
            .unwrap();

    visualizer.set_enabled(true);
    visualizer.set_device(1);

    assert!(visualizer.is_enabled());
    let state = state.lock();
    assert_eq!(state.starts, 2);
    assert!(state.stops >= 1);
    assert_eq!(state.last_device, 1);
}

#[test]
fn device_swap_while_disabled_only_stores_the_id() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let mut visualizer =
        SoundVisualizer::new(VisualizerConfig::default(), SPECTRUM_LEN, Box::new(backend))
            .unwrap();

    visualizer.set_device(1);
    assert!(!visualizer.is_enabled());
    assert_eq!(visualizer.config().device, 1);
    assert_eq!(state.lock().starts, 0);
}

#[test]
fn leaving_liquid_mode_recomputes_immediately() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 3,
        liquid_mode: true,
        send_only_if_changed: false,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();
    let events = visualizer.subscribe();

    state.lock().spectrum = {
        let mut spectrum = vec![0.0; SPECTRUM_LEN];
        spectrum[1] = 1.0;
        spectrum
    };
    visualizer.set_enabled(true);
    visualizer.update_colors();
    drain_color_events(&events);

    visualizer.set_liquid_mode(false);
    let frames = drain_color_events(&events);
    assert_eq!(frames.len(), 1, "liquid-off forces one recompute");
    // Static endpoints now apply: black -> white at 996/1000.
    assert_eq!(frames[0][0], Rgb::new(253, 253, 253));
}

#[test]
fn resizing_led_count_resets_colors() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 6,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();

    state.lock().spectrum = vec![1.0; SPECTRUM_LEN];
    visualizer.set_enabled(true);
    visualizer.update_colors();
    assert!(visualizer.colors().iter().any(|c| *c != Rgb::BLACK));

    visualizer.set_num_leds(2);
    assert_eq!(visualizer.colors(), [Rgb::BLACK; 2].as_slice());
    assert_eq!(visualizer.config().num_leds, 2);
}

#[test]
fn disabled_leds_stay_black_through_the_manager() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 3,
        enabled_leds: vec![true, false, true],
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();

    state.lock().spectrum = vec![1.0; SPECTRUM_LEN];
    visualizer.set_enabled(true);
    visualizer.update_colors();

    assert_ne!(visualizer.colors()[0], Rgb::BLACK);
    assert_eq!(visualizer.colors()[1], Rgb::BLACK);
    assert_ne!(visualizer.colors()[2], Rgb::BLACK);
}

#[test]
fn single_led_configuration_is_guarded() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 1,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();

    state.lock().spectrum = {
        let mut spectrum = vec![0.0; SPECTRUM_LEN];
        spectrum[500] = 1.0;
        spectrum
    };
    visualizer.set_enabled(true);
    visualizer.update_colors();
    assert_eq!(visualizer.colors(), [Rgb::new(253, 253, 253)].as_slice());
}

#[test]
fn reset_zeroes_the_output() {
    let backend = MockBackend::new();
    let state = backend.handle();
    let config = VisualizerConfig {
        num_leds: 4,
        ..VisualizerConfig::default()
    };
    let mut visualizer = SoundVisualizer::new(config, SPECTRUM_LEN, Box::new(backend)).unwrap();

    state.lock().spectrum = vec![1.0; SPECTRUM_LEN];
    visualizer.set_enabled(true);
    visualizer.update_colors();
    assert!(visualizer.colors().iter().any(|c| *c != Rgb::BLACK));

    visualizer.reset();
    assert_eq!(visualizer.colors(), [Rgb::BLACK; 4].as_slice());
}
