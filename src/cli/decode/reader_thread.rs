use std::sync::Arc;
use std::thread;

use anyhow::Result;
use audiopipe::command::DecoderCommand;
use audiopipe::control::notify::SharedBuffer;
use audiopipe::control::state::Control;
use audiopipe::process::session::{Session, SessionConfig, SessionOutcome};

pub struct ReaderThreadConfig {
    pub command: DecoderCommand,
    pub session: SessionConfig,
    pub buffer: Arc<SharedBuffer>,
    pub control: Arc<Control>,
}

/// Runs one decoder session on its own thread. The session closes the buffer
/// before the thread ends, so consumers never wait on a finished thread.
pub fn spawn_reader_thread(
    config: ReaderThreadConfig,
) -> Result<thread::JoinHandle<Result<SessionOutcome>>> {
    let handle = thread::Builder::new()
        .name("audiopipe-reader".into())
        .spawn(move || -> Result<SessionOutcome> {
            let ReaderThreadConfig {
                command,
                session,
                buffer,
                control,
            } = config;

            log::info!("Running decoder: {}", command.display());
            let outcome = Session::new(command, session).run(&buffer, &control)?;
            Ok(outcome)
        })?;
    Ok(handle)
}
