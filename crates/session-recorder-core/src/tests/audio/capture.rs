use crate::{
    AudioFormat, FrameCallback, RecorderError,
    audio::CapturePipeline,
    tests::support::{OpenBehaviour, ScriptedBackend},
};

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

fn counting_callback() -> (FrameCallback, Arc<AtomicUsize>) {
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let callback: FrameCallback = Arc::new(move |bytes: &[u8]| {
        counter.fetch_add(bytes.len(), Ordering::SeqCst);
    });
    (callback, received)
}

/// WHAT: Launch returns only after the device is open
/// WHY: Start must know the device works before entering Recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_working_backend_when_launching_then_device_open_and_frames_forwarded() {
    // Given: A backend that opens successfully
    let backend = ScriptedBackend::new();
    let (callback, received) = counting_callback();

    // When: Launching the pipeline
    let pipeline =
        CapturePipeline::launch(backend.clone(), AudioFormat::default(), callback).unwrap();

    // Then: Device is open with the session format and frames reach the callback
    assert!(backend.is_open());
    assert_eq!(backend.last_format(), Some(AudioFormat::default()));
    assert!(backend.deliver(&[0u8; 320]));
    assert_eq!(received.load(Ordering::SeqCst), 320);

    pipeline.stop(Duration::from_secs(1)).unwrap();
}

/// WHAT: Stop closes the device before returning
/// WHY: No frame may arrive after stop hands control back for finalization
#[test]
#[allow(clippy::unwrap_used)]
fn given_running_pipeline_when_stopping_then_device_closed_and_no_more_frames() {
    // Given: A running pipeline
    let backend = ScriptedBackend::new();
    let (callback, received) = counting_callback();
    let pipeline =
        CapturePipeline::launch(backend.clone(), AudioFormat::default(), callback).unwrap();

    // When: Stopping it
    pipeline.stop(Duration::from_secs(1)).unwrap();

    // Then: Device closed exactly once and later deliveries go nowhere
    assert_eq!(backend.closes(), 1);
    assert!(!backend.is_open());
    assert!(!backend.deliver(&[0u8; 64]));
    assert_eq!(received.load(Ordering::SeqCst), 0);
}

/// WHAT: Device open failure is reported by launch
/// WHY: A failed device must surface as a start failure
#[test]
fn given_failing_backend_when_launching_then_device_error_returned() {
    // Given: A backend that cannot open the device
    let backend = ScriptedBackend::with_behaviour(OpenBehaviour::Fail);
    let (callback, _) = counting_callback();

    // When: Launching the pipeline
    let result = CapturePipeline::launch(backend.clone(), AudioFormat::default(), callback);

    // Then: DeviceError, and nothing was left open
    assert!(matches!(result, Err(RecorderError::DeviceError { .. })));
    assert_eq!(backend.opens(), 1);
    assert!(!backend.is_open());
}

/// WHAT: A panicking backend does not hang launch
/// WHY: The handshake must resolve even if the capture thread dies
#[test]
fn given_panicking_backend_when_launching_then_capture_thread_error() {
    // Given: A backend that panics while opening
    let backend = ScriptedBackend::with_behaviour(OpenBehaviour::Panic);
    let (callback, _) = counting_callback();

    // When: Launching the pipeline
    let result = CapturePipeline::launch(backend, AudioFormat::default(), callback);

    // Then: CaptureThread error instead of a hang
    assert!(matches!(result, Err(RecorderError::CaptureThread { .. })));
}

/// WHAT: Stop waits no longer than its timeout
/// WHY: A wedged audio backend must not freeze the control thread forever
#[test]
#[allow(clippy::unwrap_used)]
fn given_slow_closing_device_when_stopping_with_short_timeout_then_returns_promptly() {
    // Given: A device that takes two seconds to close
    let backend = ScriptedBackend::with_behaviour(OpenBehaviour::SlowClose(Duration::from_secs(2)));
    let (callback, _) = counting_callback();
    let pipeline =
        CapturePipeline::launch(backend.clone(), AudioFormat::default(), callback).unwrap();

    // When: Stopping with a 50ms timeout
    let started = Instant::now();
    let result = pipeline.stop(Duration::from_millis(50));

    // Then: Returns well before the close finishes, and frames are already cut off
    assert!(result.is_ok());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!backend.deliver(&[0u8; 16]));
}
