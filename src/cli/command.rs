use std::path::PathBuf;

use audiopipe::command::{DEFAULT_INTERVAL_SECONDS, SAMPLE_RATE};
use audiopipe::process::session::DEFAULT_CHUNK_SAMPLES;
use audiopipe::structs::format::SampleFormat;
use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\naudiopipe: ",
    env!("AUDIOPIPE_VERSION"),
    "\nbuilt: ",
    env!("BUILD_TIMESTAMP"),
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Decode the start of a media file through an external decoder for alignment analysis",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode the beginning of a media file and report each analysis interval.
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input media file, passed to the decoder as is.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Analysis intervals in seconds, strictly ascending. The last one is
    /// also how much audio gets decoded.
    #[arg(
        long,
        value_name = "SECONDS",
        value_delimiter = ',',
        default_values_t = DEFAULT_INTERVAL_SECONDS
    )]
    pub intervals: Vec<f64>,

    /// Sample rate the decoder resamples to.
    #[arg(long, value_name = "HZ", default_value_t = SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Raw sample format requested from the decoder.
    #[arg(long, value_enum, default_value_t = SampleFormatArg::F64)]
    pub format: SampleFormatArg,

    /// Samples read from the decoder per chunk.
    #[arg(long, value_name = "SAMPLES", default_value_t = DEFAULT_CHUNK_SAMPLES)]
    pub chunk_samples: usize,

    /// ffmpeg executable to run (looked up in PATH).
    #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg")]
    pub decoder: String,

    /// Keep the decoder's stderr attached to the terminal.
    #[arg(long)]
    pub debug_decoder: bool,

    /// Write the decoded buffer as a mono float Wave64 file.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write a YAML report of the session.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SampleFormatArg {
    /// 64-bit float, little-endian.
    F64,
    /// 32-bit float, little-endian.
    F32,
}

impl From<SampleFormatArg> for SampleFormat {
    fn from(arg: SampleFormatArg) -> Self {
        match arg {
            SampleFormatArg::F64 => SampleFormat::F64Le,
            SampleFormatArg::F32 => SampleFormat::F32Le,
        }
    }
}
