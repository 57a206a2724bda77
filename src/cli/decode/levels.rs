/// Running peak and RMS over a growing prefix of the decoded buffer.
///
/// Each interval only adds the samples between the previous interval and the
/// new one, so measuring every interval touches each sample once.
#[derive(Debug, Default, Clone)]
pub struct LevelMeter {
    measured: usize,
    peak: f64,
    sum_squares: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub peak: f64,
    pub rms: f64,
}

impl Levels {
    pub fn peak_dbfs(&self) -> f64 {
        to_dbfs(self.peak)
    }

    pub fn rms_dbfs(&self) -> f64 {
        to_dbfs(self.rms)
    }
}

impl LevelMeter {
    /// Extends the measurement to `prefix` (the buffer from sample 0) and
    /// returns the levels of the whole prefix.
    pub fn advance(&mut self, prefix: &[f64]) -> Levels {
        if let Some(new) = prefix.get(self.measured..) {
            for &sample in new {
                self.peak = self.peak.max(sample.abs());
                self.sum_squares += sample * sample;
            }
            self.measured = prefix.len();
        }
        self.levels()
    }

    pub fn levels(&self) -> Levels {
        let rms = if self.measured == 0 {
            0.0
        } else {
            (self.sum_squares / self.measured as f64).sqrt()
        };
        Levels {
            peak: self.peak,
            rms,
        }
    }
}

fn to_dbfs(value: f64) -> f64 {
    20.0 * value.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_matches_whole() {
        let samples: Vec<f64> = (0..1000).map(|i| ((i as f64) * 0.1).sin() * 0.5).collect();

        let mut incremental = LevelMeter::default();
        incremental.advance(&samples[..100]);
        incremental.advance(&samples[..700]);
        let stepped = incremental.advance(&samples);

        let mut whole = LevelMeter::default();
        let direct = whole.advance(&samples);

        assert_eq!(stepped.peak, direct.peak);
        assert!((stepped.rms - direct.rms).abs() < 1e-12);
        assert_eq!(incremental.levels(), stepped);
    }

    #[test]
    fn silence_is_negative_infinity() {
        let mut meter = LevelMeter::default();
        let levels = meter.advance(&[0.0; 16]);
        assert_eq!(levels.peak_dbfs(), f64::NEG_INFINITY);
        assert_eq!(levels.rms, 0.0);

        let mut prefix = vec![0.0; 16];
        prefix.push(-1.0);
        let full_scale = meter.advance(&prefix);
        assert_eq!(full_scale.peak_dbfs(), 0.0);
    }
}
