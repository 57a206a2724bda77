use std::io::{self, Read};

use crate::command::DecoderCommand;
use crate::control::notify::{SessionEnd, SharedBuffer};
use crate::control::state::{Control, ControlState};
use crate::process::launch::{DecoderHandle, launch};
use crate::structs::format::{SampleAssembler, SampleFormat};
use crate::utils::errors::{PipeError, ProcessAction};

/// Samples requested from the pipe per read.
pub const DEFAULT_CHUNK_SAMPLES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on samples taken from the pipe per read. The state of the
    /// shared [`Control`] is checked once per read, so this also bounds how
    /// much is decoded after a pause or abort was requested.
    pub chunk_samples: usize,
    /// Encoding the decoder writes to its stdout.
    pub format: SampleFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_samples: DEFAULT_CHUNK_SAMPLES,
            format: SampleFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The buffer is full. `decoded` samples came from the decoder and the
    /// remaining `padded` samples are zero.
    Completed { decoded: usize, padded: usize },
    /// The shared control was aborted; the buffer holds `decoded` samples
    /// and is not guaranteed to be complete.
    Aborted { decoded: usize },
}

/// One decoder run feeding one [`SharedBuffer`].
#[derive(Debug, Clone)]
pub struct Session {
    command: DecoderCommand,
    config: SessionConfig,
}

impl Session {
    pub fn new(command: DecoderCommand, config: SessionConfig) -> Self {
        Self { command, config }
    }

    pub fn command(&self) -> &DecoderCommand {
        &self.command
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs the decoder and fills `buffer` until it is full, the decoder
    /// output ends, or `control` is aborted.
    ///
    /// The decoder process has exited and been reaped when this returns, and
    /// `buffer` is closed so that no consumer stays blocked. Any error also
    /// aborts `control`.
    pub fn run(&self, buffer: &SharedBuffer, control: &Control) -> Result<SessionOutcome, PipeError> {
        buffer.reset();

        if control.is_aborted() {
            log::info!("control already aborted, not starting {}", self.command.display());
            buffer.close(SessionEnd::Aborted);
            return Ok(SessionOutcome::Aborted { decoded: 0 });
        }

        let result = match launch(&self.command) {
            Ok((mut process, stdout)) => fill(stdout, &mut process, buffer, control, &self.config),
            Err(e) => Err(e),
        };

        finish(result, buffer, control)
    }
}

/// Reads from `reader` into `buffer` with `process` as the decoder behind
/// it, then closes `buffer` according to the result.
pub fn run_with<R: Read, H: DecoderHandle>(
    reader: R,
    process: &mut H,
    buffer: &SharedBuffer,
    control: &Control,
    config: &SessionConfig,
) -> Result<SessionOutcome, PipeError> {
    buffer.reset();
    let result = fill(reader, process, buffer, control, config);
    finish(result, buffer, control)
}

fn finish(
    result: Result<SessionOutcome, PipeError>,
    buffer: &SharedBuffer,
    control: &Control,
) -> Result<SessionOutcome, PipeError> {
    match &result {
        Ok(SessionOutcome::Completed { decoded, padded }) => {
            log::info!("decoding finished: {decoded} samples, {padded} padded");
            buffer.close(SessionEnd::Completed);
        }
        Ok(SessionOutcome::Aborted { decoded }) => {
            log::info!("decoding aborted after {decoded} samples");
            buffer.close(SessionEnd::Aborted);
        }
        Err(e) => {
            log::error!("{e}");
            control.abort();
            buffer.close(SessionEnd::Failed);
        }
    }
    result
}

fn fill<R: Read, H: DecoderHandle>(
    mut reader: R,
    process: &mut H,
    buffer: &SharedBuffer,
    control: &Control,
    config: &SessionConfig,
) -> Result<SessionOutcome, PipeError> {
    let capacity = buffer.capacity();
    let chunk_samples = config.chunk_samples.clamp(1, capacity.max(1));
    let intervals = buffer.intervals();

    let mut assembler = SampleAssembler::new(config.format, chunk_samples);
    let mut next_interval = 0;
    let mut len = 0;
    let mut bytes_received = 0u64;
    let mut reached_eof = false;

    while len < capacity {
        let spare = assembler.spare((capacity - len).min(chunk_samples));
        let read = match read_chunk(&mut reader, spare) {
            Ok(read) => read,
            Err(e) => {
                kill(process);
                return Err(PipeError::Read(e));
            }
        };
        bytes_received += read as u64;

        let samples = assembler.commit(read);
        if !samples.is_empty() {
            len = buffer.append(samples);
        }

        while let Some(threshold) = intervals.get(next_interval).filter(|&t| len >= t) {
            log::debug!("interval {next_interval} reached ({len} >= {threshold} samples)");
            buffer.signal_interval(next_interval, threshold, len);
            next_interval += 1;
        }

        if read == 0 {
            reached_eof = true;
            break;
        }
        if len == capacity {
            break;
        }

        match control.state() {
            ControlState::Aborted => return abort(process, len),
            ControlState::Paused => {
                log::info!("pausing decoder after {len} samples");
                process.suspend().map_err(|source| {
                    kill(process);
                    PipeError::ProcessControl {
                        action: ProcessAction::Suspend,
                        source,
                    }
                })?;

                if control.wait_while_paused() == ControlState::Aborted {
                    return abort(process, len);
                }

                log::info!("resuming decoder");
                process.resume().map_err(|source| {
                    kill(process);
                    PipeError::ProcessControl {
                        action: ProcessAction::Resume,
                        source,
                    }
                })?;
            }
            ControlState::Idle | ControlState::Running => {}
        }
    }

    log::debug!("received {bytes_received} bytes from decoder");
    if assembler.pending_bytes() > 0 {
        log::warn!(
            "discarding {} trailing bytes that do not form a whole {} sample",
            assembler.pending_bytes(),
            config.format
        );
    }

    if control.is_aborted() {
        return abort(process, len);
    }

    let padded = buffer.pad_and_signal();
    if padded > 0 {
        log::info!("stream ended after {len} samples, padded {padded} with silence");
    }

    drop(reader);
    if !reached_eof {
        // Full buffer: whatever the decoder still has to say is not needed.
        process.terminate().map_err(|source| PipeError::ProcessControl {
            action: ProcessAction::Terminate,
            source,
        })?;
    }
    process.reap().map_err(|source| PipeError::ProcessControl {
        action: ProcessAction::Reap,
        source,
    })?;

    Ok(SessionOutcome::Completed {
        decoded: len,
        padded,
    })
}

fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

fn abort<H: DecoderHandle>(process: &mut H, len: usize) -> Result<SessionOutcome, PipeError> {
    log::info!("abort requested, stopping decoder");
    process.terminate().map_err(|source| PipeError::ProcessControl {
        action: ProcessAction::Terminate,
        source,
    })?;
    process.reap().map_err(|source| PipeError::ProcessControl {
        action: ProcessAction::Reap,
        source,
    })?;
    Ok(SessionOutcome::Aborted { decoded: len })
}

/// Best-effort stop on an error path; the original error is what gets
/// reported.
fn kill<H: DecoderHandle>(process: &mut H) {
    if let Err(e) = process.terminate() {
        log::warn!("could not terminate decoder: {e}");
    }
    if let Err(e) = process.reap() {
        log::warn!("could not reap decoder: {e}");
    }
}
