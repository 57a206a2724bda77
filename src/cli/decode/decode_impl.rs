use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, bail};
use audiopipe::command::{AnalysisFormat, DecoderCommand};
use audiopipe::control::notify::{Readiness, SharedBuffer};
use audiopipe::control::state::Control;
use audiopipe::process::session::{SessionConfig, SessionOutcome};
use audiopipe::structs::intervals::IntervalTable;
use indicatif::MultiProgress;

use super::levels::LevelMeter;
use super::output::write_w64;
use super::progress::{create_progress_bar, finish_progress_bar};
use super::reader_thread::{ReaderThreadConfig, spawn_reader_thread};
use super::report::{IntervalRecord, ReportOutcome, SessionReport};
use crate::cli::command::{Cli, DecodeArgs};
use crate::timestamp::{samples_time_str, time_str};

pub fn cmd_decode(args: &DecodeArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    macro_rules! pb_update {
        ($pb:expr, $method:ident($($args:expr),*)) => {
            if let Some(ref pb) = $pb {
                pb.$method($($args),*);
            }
        };
    }

    if args.sample_rate == 0 {
        bail!("Sample rate must be greater than zero");
    }
    let Some(&max_seconds) = args.intervals.last() else {
        bail!("At least one analysis interval is required");
    };

    let format = AnalysisFormat {
        sample_rate: args.sample_rate,
        format: args.format.into(),
    };
    let intervals = IntervalTable::from_seconds(&args.intervals, format.sample_rate)?;
    let capacity = format.samples_for(max_seconds);
    let buffer = Arc::new(SharedBuffer::new(capacity, intervals)?);
    let control = Control::shared();

    let command = DecoderCommand::ffmpeg(&args.input, &format, max_seconds)
        .with_program(&args.decoder)
        .show_stderr(args.debug_decoder);
    let session = SessionConfig {
        chunk_samples: args.chunk_samples,
        format: format.format,
    };

    log::info!(
        "Decoding {} ({} of audio, {} samples at {} Hz, {})",
        args.input.display(),
        time_str(max_seconds),
        capacity,
        format.sample_rate,
        format.format
    );

    let pb = match multi {
        Some(multi) => Some(create_progress_bar(multi, buffer.intervals().len())?),
        None => None,
    };

    let mut report = SessionReport {
        input: args.input.display().to_string(),
        decoder: command.display(),
        sample_rate: format.sample_rate,
        format: format.format.to_string(),
        capacity,
        outcome: ReportOutcome::Aborted,
        decoded: 0,
        padded: 0,
        elapsed_ms: 0,
        intervals: Vec::with_capacity(buffer.intervals().len()),
    };

    let start_time = Instant::now();
    control.start();
    let reader_thread = spawn_reader_thread(ReaderThreadConfig {
        command,
        session,
        buffer: Arc::clone(&buffer),
        control: Arc::clone(&control),
    })?;

    // This thread is the consumer: measure each interval as soon as it is ready.
    let mut meter = LevelMeter::default();
    for (index, (&threshold, &seconds)) in buffer
        .intervals()
        .thresholds()
        .iter()
        .zip(&args.intervals)
        .enumerate()
    {
        let readiness = buffer.wait_interval(index);
        if !readiness.is_ready() {
            log::debug!("Interval {index} not reached: {readiness:?}");
            break;
        }

        let levels = buffer.with_samples(|samples| meter.advance(&samples[..threshold]));
        let ready_after = start_time.elapsed();
        let padded = readiness == Readiness::AllReady;

        log::info!(
            "Interval {index} ready ({}{}): peak {:.1} dBFS, rms {:.1} dBFS, after {:.3}s",
            samples_time_str(threshold, format.sample_rate),
            if padded { ", padded" } else { "" },
            levels.peak_dbfs(),
            levels.rms_dbfs(),
            ready_after.as_secs_f64()
        );
        pb_update!(pb, inc(1));
        pb_update!(
            pb,
            set_message(format!("ready up to {}", time_str(seconds)))
        );

        report.intervals.push(IntervalRecord {
            index,
            seconds,
            samples: threshold,
            ready_after_ms: ready_after.as_millis() as u64,
            padded,
            peak_dbfs: levels.peak_dbfs(),
            rms_dbfs: levels.rms_dbfs(),
        });
    }

    let outcome = match reader_thread.join() {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            pb_update!(pb, finish_with_message("decode failed"));
            return Err(e);
        }
        Err(_) => {
            pb_update!(pb, finish_with_message("reader thread panicked"));
            bail!("Reader thread panicked");
        }
    };

    let elapsed = start_time.elapsed();
    report.elapsed_ms = elapsed.as_millis() as u64;
    report.set_outcome(outcome);

    match outcome {
        SessionOutcome::Completed { decoded, padded } => {
            if padded > 0 {
                log::warn!(
                    "Input is shorter than {}: {} decoded, rest padded with silence",
                    time_str(max_seconds),
                    samples_time_str(decoded, format.sample_rate)
                );
            }
            let speed = decoded as f64 / format.sample_rate as f64 / elapsed.as_secs_f64();
            if let Some(ref pb) = pb {
                finish_progress_bar(
                    pb,
                    format!(
                        "speed: {speed:.1}x | decoded: {}",
                        samples_time_str(decoded, format.sample_rate)
                    ),
                );
            }
            log::info!("Decoding completed successfully");
        }
        SessionOutcome::Aborted { decoded } => {
            pb_update!(pb, finish_with_message("decode aborted"));
            log::warn!(
                "Decoding aborted after {}",
                samples_time_str(decoded, format.sample_rate)
            );
        }
    }

    if let Some(ref output) = args.output {
        let samples = buffer.snapshot();
        let path = write_w64(output, &samples, format.sample_rate, format.format)?;
        log::info!("Wrote {} samples to {}", samples.len(), path.display());
    }

    if let Some(ref report_path) = args.report {
        report.write(report_path)?;
    }

    if let SessionOutcome::Aborted { .. } = outcome {
        bail!("Decoding was aborted");
    }

    Ok(())
}
