use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::structs::format::SampleFormat;

/// Sample rate shared by every track that is going to be compared.
pub const SAMPLE_RATE: u32 = 48000;

/// Tracks are downmixed to a single channel before analysis.
pub const NUM_CHANNELS: u16 = 1;

/// Interval lengths, in seconds, used when the caller does not pick any.
/// The last one is also the longest stretch of audio that gets decoded.
pub const DEFAULT_INTERVAL_SECONDS: [f64; 5] = [1.0, 3.0, 5.0, 10.0, 15.0];

/// Format the decoder is asked to produce. Every track of one comparison must
/// use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisFormat {
    pub sample_rate: u32,
    pub format: SampleFormat,
}

impl Default for AnalysisFormat {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            format: SampleFormat::default(),
        }
    }
}

impl AnalysisFormat {
    /// Number of samples needed to hold `seconds` of audio.
    pub fn samples_for(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64 * NUM_CHANNELS as f64).ceil() as usize
    }
}

/// How to start the external decoder.
///
/// The program is looked up through `PATH`. It must write raw samples to its
/// standard output; its standard error is discarded unless
/// [`show_stderr`](Self::show_stderr) is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderCommand {
    program: OsString,
    args: Vec<OsString>,
    show_stderr: bool,
}

impl DecoderCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            show_stderr: false,
        }
    }

    /// ffmpeg invocation that decodes at most `max_seconds` of `input` to a
    /// mono raw stream in `format` on stdout.
    pub fn ffmpeg(input: impl AsRef<Path>, format: &AnalysisFormat, max_seconds: f64) -> Self {
        Self::new("ffmpeg")
            .arg("-nostdin")
            .arg("-i")
            .arg(input.as_ref())
            .args(["-vn", "-ac"])
            .arg(NUM_CHANNELS.to_string())
            .arg("-ar")
            .arg(format.sample_rate.to_string())
            .arg("-f")
            .arg(format.format.ffmpeg_name())
            .arg("-t")
            .arg(max_seconds.to_string())
            .arg("pipe:1")
    }

    /// Replaces the program while keeping the arguments, e.g. to run a
    /// specific ffmpeg build.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Leave the decoder's standard error attached, for diagnosing it.
    pub fn show_stderr(mut self, show: bool) -> Self {
        self.show_stderr = show;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn stderr_visible(&self) -> bool {
        self.show_stderr
    }

    /// Program and arguments joined for log output.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[test]
fn test_ffmpeg_command() {
    let format = AnalysisFormat::default();
    let command = DecoderCommand::ffmpeg("track.flac", &format, 15.0);

    assert_eq!(command.program(), "ffmpeg");
    assert_eq!(
        command.display(),
        "ffmpeg -nostdin -i track.flac -vn -ac 1 -ar 48000 -f f64le -t 15 pipe:1"
    );
    assert!(!command.stderr_visible());
    assert_eq!(format.samples_for(15.0), 720000);

    let f32_format = AnalysisFormat {
        sample_rate: 44100,
        format: SampleFormat::F32Le,
    };
    let command = DecoderCommand::ffmpeg("a.mp3", &f32_format, 2.5)
        .show_stderr(true)
        .with_program("/opt/ffmpeg/bin/ffmpeg");
    assert!(command.display().starts_with("/opt/ffmpeg/bin/ffmpeg -nostdin -i a.mp3"));
    assert!(command.display().ends_with("-ar 44100 -f f32le -t 2.5 pipe:1"));
    assert!(command.stderr_visible());
}
