use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use audiopipe::process::session::SessionOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutcome {
    Completed,
    Aborted,
}

/// Summary of one decode session, written with `--report`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub input: String,
    pub decoder: String,
    pub sample_rate: u32,
    pub format: String,
    pub capacity: usize,
    pub outcome: ReportOutcome,
    pub decoded: usize,
    pub padded: usize,
    pub elapsed_ms: u64,
    pub intervals: Vec<IntervalRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    pub index: usize,
    pub seconds: f64,
    pub samples: usize,
    pub ready_after_ms: u64,
    /// Covered by silence padding rather than decoded audio.
    pub padded: bool,
    pub peak_dbfs: f64,
    pub rms_dbfs: f64,
}

impl SessionReport {
    pub fn set_outcome(&mut self, outcome: SessionOutcome) {
        match outcome {
            SessionOutcome::Completed { decoded, padded } => {
                self.outcome = ReportOutcome::Completed;
                self.decoded = decoded;
                self.padded = padded;
            }
            SessionOutcome::Aborted { decoded } => {
                self.outcome = ReportOutcome::Aborted;
                self.decoded = decoded;
                self.padded = 0;
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        log::info!("Creating report file: {}", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "{}", self.to_yaml()?)?;
        writer.flush()?;
        Ok(())
    }
}

#[test]
fn test_report_yaml() {
    let mut report = SessionReport {
        input: "track.flac".into(),
        decoder: "ffmpeg".into(),
        sample_rate: 48000,
        format: "f64le".into(),
        capacity: 96000,
        outcome: ReportOutcome::Aborted,
        decoded: 0,
        padded: 0,
        elapsed_ms: 12,
        intervals: vec![IntervalRecord {
            index: 0,
            seconds: 1.0,
            samples: 48000,
            ready_after_ms: 5,
            padded: false,
            peak_dbfs: -6.0,
            rms_dbfs: f64::NEG_INFINITY,
        }],
    };
    report.set_outcome(SessionOutcome::Completed {
        decoded: 60000,
        padded: 36000,
    });

    let yaml = report.to_yaml().unwrap();
    assert!(yaml.contains("outcome: completed"));
    assert!(yaml.contains("sampleRate: 48000"));
    assert!(yaml.contains("padded: 36000"));
    assert!(yaml.contains("- index: 0"));
    assert!(yaml.contains("readyAfterMs: 5"));
    assert!(yaml.contains("rmsDbfs: -.inf"));
}
