use std::io;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use crate::command::DecoderCommand;
use crate::utils::errors::PipeError;

/// Process-control capability the reader needs from a running decoder.
pub trait DecoderHandle {
    /// Stop the decoder from making progress until [`resume`](Self::resume).
    fn suspend(&mut self) -> io::Result<()>;

    fn resume(&mut self) -> io::Result<()>;

    /// Kill the decoder without giving it a chance to clean up.
    fn terminate(&mut self) -> io::Result<()>;

    /// Block until the decoder has exited and release it. Calling it again
    /// after a successful reap does nothing.
    fn reap(&mut self) -> io::Result<()>;
}

/// A decoder child process, reaped at the latest when dropped.
#[derive(Debug)]
pub struct DecoderProcess {
    child: Child,
    program: String,
    status: Option<ExitStatus>,
}

impl DecoderProcess {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Exit status, once reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.status
    }

    #[cfg(unix)]
    fn signal_group(&self, signal: nix::sys::signal::Signal) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::killpg;
        use nix::unistd::Pid;

        // The child leads its own process group, see `launch`.
        match killpg(Pid::from_raw(self.child.id() as i32), signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(io::Error::from(errno)),
        }
    }
}

#[cfg(unix)]
impl DecoderHandle for DecoderProcess {
    fn suspend(&mut self) -> io::Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        self.signal_group(nix::sys::signal::Signal::SIGSTOP)
    }

    fn resume(&mut self) -> io::Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        self.signal_group(nix::sys::signal::Signal::SIGCONT)
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        self.signal_group(nix::sys::signal::Signal::SIGKILL)
    }

    fn reap(&mut self) -> io::Result<()> {
        reap_child(self)
    }
}

#[cfg(not(unix))]
impl DecoderHandle for DecoderProcess {
    fn suspend(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "suspending a process is not supported on this platform",
        ))
    }

    fn resume(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "resuming a process is not supported on this platform",
        ))
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        self.child.kill()
    }

    fn reap(&mut self) -> io::Result<()> {
        reap_child(self)
    }
}

fn reap_child(process: &mut DecoderProcess) -> io::Result<()> {
    if process.status.is_none() {
        let status = process.child.wait()?;
        log::debug!("{} (pid {}) exited: {status}", process.program, process.child.id());
        process.status = Some(status);
    }
    Ok(())
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        if self.status.is_none() {
            log::warn!(
                "{} (pid {}) still running on drop, killing it",
                self.program,
                self.child.id()
            );
            let _ = self.terminate();
            let _ = self.reap();
        }
    }
}

/// Starts the decoder with its standard output connected to a pipe and
/// returns the process together with the read end of that pipe.
///
/// Failures are returned as they are; escalating them to an abort is left to
/// the session.
pub fn launch(command: &DecoderCommand) -> Result<(DecoderProcess, ChildStdout), PipeError> {
    let program = command.program().to_string_lossy().into_owned();

    let mut cmd = Command::new(command.program());
    cmd.args(command.get_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(if command.stderr_visible() {
            Stdio::inherit()
        } else {
            Stdio::null()
        });

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    log::debug!("running decoder: {}", command.display());
    let mut child = cmd.spawn().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => PipeError::ProcessExec {
            program: program.clone(),
            source,
        },
        _ => PipeError::ProcessSetup(source),
    })?;

    let stdout = child.stdout.take();
    let mut process = DecoderProcess {
        child,
        program,
        status: None,
    };

    match stdout {
        Some(stdout) => {
            log::info!("started {} (pid {})", process.program, process.id());
            Ok((process, stdout))
        }
        None => {
            let _ = process.terminate();
            let _ = process.reap();
            Err(PipeError::ProcessSetup(io::Error::other(
                "decoder stdout was not captured",
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn missing_program_is_exec_failure() {
        let command = DecoderCommand::new("audiopipe-test-no-such-decoder");
        match launch(&command) {
            Err(PipeError::ProcessExec { program, .. }) => {
                assert_eq!(program, "audiopipe-test-no-such-decoder");
            }
            other => panic!("unexpected launch result: {other:?}"),
        }
    }

    #[test]
    fn stdout_reaches_pipe() {
        let command = DecoderCommand::new("sh").args(["-c", "printf abc"]);
        let (mut process, mut stdout) = launch(&command).unwrap();

        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        drop(stdout);
        process.reap().unwrap();

        assert_eq!(out, "abc");
        assert!(process.exit_status().unwrap().success());
    }

    #[test]
    fn terminate_then_reap() {
        let command = DecoderCommand::new("sleep").arg("30");
        let (mut process, _stdout) = launch(&command).unwrap();

        process.suspend().unwrap();
        process.resume().unwrap();
        process.terminate().unwrap();
        process.reap().unwrap();

        assert!(!process.exit_status().unwrap().success());
        // Already reaped, both are no-ops.
        process.terminate().unwrap();
        process.reap().unwrap();
    }
}
