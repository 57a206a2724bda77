#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! An external decoder (ffmpeg by default) turns a media file into raw mono
//! floating-point samples on its standard output. A reader thread copies that
//! stream into a fixed-size [`SharedBuffer`](control::notify::SharedBuffer)
//! while a consumer thread waits for the buffer to cross a list of sample
//! thresholds, so analysis of the first seconds can start before decoding is
//! done.
//!
//! ### Control
//!
//! Every session observes a [`Control`](control::state::Control) shared with
//! the rest of the program:
//!
//! - `Paused`: the decoder process itself is stopped (not only the reader),
//!   and continued when the state goes back to `Running`.
//! - `Aborted`: the decoder is killed and the session returns. Any session
//!   error also aborts the control, so sibling sessions stop too.
//!
//! The decoder is always reaped before a session returns.
//!
//! ### Short tracks
//!
//! When the decoder output ends before the buffer is full, the rest of the
//! buffer is filled with silence and consumers are told that every interval
//! is available.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! use audiopipe::command::{AnalysisFormat, DecoderCommand};
//! use audiopipe::control::{notify::SharedBuffer, state::Control};
//! use audiopipe::structs::intervals::IntervalTable;
//!
//! let format = AnalysisFormat::default();
//! let intervals = IntervalTable::from_seconds(&[1.0, 5.0, 15.0], format.sample_rate)?;
//! let buffer = Arc::new(SharedBuffer::new(format.samples_for(15.0), intervals)?);
//! let control = Control::shared();
//!
//! let reader = {
//!     let buffer = Arc::clone(&buffer);
//!     let control = Arc::clone(&control);
//!     let command = DecoderCommand::ffmpeg("track.flac", &format, 15.0);
//!     thread::spawn(move || audiopipe::decode_into(&command, &buffer, &control))
//! };
//!
//! for index in 0..buffer.intervals().len() {
//!     if !buffer.wait_interval(index).is_ready() {
//!         break;
//!     }
//!     let peak = buffer.with_samples(|s| s.iter().fold(0f64, |m, v| m.max(v.abs())));
//!     println!("interval {index}: peak {peak:.3}");
//! }
//!
//! reader.join().expect("reader thread panicked")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Decoder invocation and the fixed analysis format.
pub mod command;

/// Shared status and reader-to-consumer notification.
///
/// - **Control** ([`control::state`]): running / paused / aborted switch
/// - **Notification** ([`control::notify`]): shared buffer and interval signals
pub mod control;

/// Decoder process lifecycle and the reader loop.
pub mod process;

/// Caller-owned data.
///
/// - **Buffer** ([`structs::buffer`]): fixed-capacity sample storage
/// - **Intervals** ([`structs::intervals`]): notification thresholds
/// - **Format** ([`structs::format`]): raw sample encodings
pub mod structs;

/// Error types.
pub mod utils;

use command::DecoderCommand;
use control::notify::SharedBuffer;
use control::state::Control;
use process::session::{Session, SessionConfig, SessionOutcome};
use utils::errors::PipeError;

/// Runs `command` with the default [`SessionConfig`] and fills `buffer`.
///
/// See [`Session::run`].
pub fn decode_into(
    command: &DecoderCommand,
    buffer: &SharedBuffer,
    control: &Control,
) -> Result<SessionOutcome, PipeError> {
    Session::new(command.clone(), SessionConfig::default()).run(buffer, control)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::control::notify::{Readiness, SessionEnd, Signal};
    use crate::control::state::ControlState;
    use crate::structs::intervals::IntervalTable;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn write_samples(dir: &Path, name: &str, samples: &[f64]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for sample in samples {
            file.write_all(&sample.to_le_bytes()).unwrap();
        }
        path
    }

    fn sine(count: usize) -> Vec<f64> {
        (0..count).map(|i| (i as f64 * 0.01).sin()).collect()
    }

    fn shared(capacity: usize, thresholds: Vec<usize>) -> Arc<SharedBuffer> {
        Arc::new(SharedBuffer::new(capacity, IntervalTable::new(thresholds).unwrap()).unwrap())
    }

    fn cat(path: &Path) -> DecoderCommand {
        DecoderCommand::new("cat").arg(path)
    }

    /// Endless slow producer, killed only by an abort.
    fn endless() -> DecoderCommand {
        DecoderCommand::new("sh").args([
            "-c",
            "while :; do head -c 8192 /dev/zero; sleep 0.01; done",
        ])
    }

    #[test]
    fn decoder_output_fills_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let input = sine(3000);
        let path = write_samples(dir.path(), "long.f64", &input);

        let buffer = shared(2000, vec![500, 1500]);
        let control = Control::new();
        let outcome = decode_into(&cat(&path), &buffer, &control).unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Completed {
                decoded: 2000,
                padded: 0
            }
        );
        assert_eq!(buffer.snapshot(), &input[..2000]);
        let signals = buffer.signals();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| matches!(s, Signal::Interval { .. })));
        assert_eq!(control.state(), ControlState::Idle);
    }

    #[test]
    fn short_decoder_output_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let input = sine(300);
        let path = write_samples(dir.path(), "short.f64", &input);

        let buffer = shared(1000, vec![100, 500]);
        let control = Control::new();
        let consumer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || (buffer.wait_interval(0), buffer.wait_interval(1)))
        };

        let outcome = decode_into(&cat(&path), &buffer, &control).unwrap();
        let (first, second) = consumer.join().unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Completed {
                decoded: 300,
                padded: 700
            }
        );
        assert_eq!(first, Readiness::Ready);
        assert_eq!(second, Readiness::AllReady);
        assert_eq!(buffer.signals().last(), Some(&Signal::AllReady { len: 1000 }));

        let samples = buffer.snapshot();
        assert_eq!(&samples[..300], &input[..]);
        assert!(samples[300..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn pause_resume_keeps_samples() {
        let dir = tempfile::tempdir().unwrap();
        let input = sine(200_000);
        let path = write_samples(dir.path(), "paused.f64", &input);

        let buffer = shared(200_000, vec![1024, 100_000]);
        let control = Control::shared();
        control.start();
        control.pause();

        let resumer = {
            let control = Arc::clone(&control);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                control.resume();
            })
        };

        let session = Session::new(
            cat(&path),
            SessionConfig {
                chunk_samples: 1024,
                ..SessionConfig::default()
            },
        );
        let outcome = session.run(&buffer, &control).unwrap();
        resumer.join().unwrap();

        assert!(matches!(outcome, SessionOutcome::Completed { padded: 0, .. }));
        assert_eq!(buffer.snapshot(), input);
    }

    #[test]
    fn abort_stops_running_decoder() {
        let buffer = shared(1_000_000, vec![4096]);
        let control = Control::shared();
        control.start();

        let aborter = {
            let buffer = Arc::clone(&buffer);
            let control = Arc::clone(&control);
            thread::spawn(move || {
                buffer.wait_interval(0);
                control.abort();
            })
        };

        let started = Instant::now();
        let outcome = decode_into(&endless(), &buffer, &control).unwrap();
        aborter.join().unwrap();

        assert!(matches!(outcome, SessionOutcome::Aborted { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(buffer.end(), Some(SessionEnd::Aborted));
        assert_eq!(buffer.wait_complete(), SessionEnd::Aborted);
    }

    #[test]
    fn abort_while_paused_returns_promptly() {
        let buffer = shared(1_000_000, vec![]);
        let control = Control::shared();
        control.pause();

        let aborter = {
            let control = Arc::clone(&control);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                control.abort();
            })
        };

        let started = Instant::now();
        let outcome = decode_into(&endless(), &buffer, &control).unwrap();
        aborter.join().unwrap();

        assert!(matches!(outcome, SessionOutcome::Aborted { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn missing_decoder_aborts_control() {
        let buffer = shared(10, vec![5]);
        let control = Control::new();
        control.start();

        let result = decode_into(
            &DecoderCommand::new("audiopipe-test-no-such-decoder"),
            &buffer,
            &control,
        );

        match result {
            Err(e) => assert!(e.is_launch_failure()),
            Ok(outcome) => panic!("unexpected outcome: {outcome:?}"),
        }
        assert_eq!(control.state(), ControlState::Aborted);
        assert_eq!(buffer.wait_interval(0), Readiness::Closed(SessionEnd::Failed));
    }

    #[test]
    fn non_executable_decoder_is_exec_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_samples(dir.path(), "not-a-program", &[0.0]);

        let buffer = shared(10, vec![]);
        let control = Control::new();
        let result = decode_into(&DecoderCommand::new(&path), &buffer, &control);

        assert!(matches!(result, Err(PipeError::ProcessExec { .. })));
        assert!(control.is_aborted());
    }
}
