use std::fmt::Display;

/// Raw sample encoding written by the decoder to its standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// 64-bit IEEE float, little-endian.
    #[default]
    F64Le,
    /// 32-bit IEEE float, little-endian.
    F32Le,
}

impl SampleFormat {
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::F64Le => 8,
            SampleFormat::F32Le => 4,
        }
    }

    /// Name of the raw muxer that produces this encoding in ffmpeg.
    pub const fn ffmpeg_name(self) -> &'static str {
        match self {
            SampleFormat::F64Le => "f64le",
            SampleFormat::F32Le => "f32le",
        }
    }

    fn decode_one(self, bytes: &[u8]) -> f64 {
        match self {
            SampleFormat::F64Le => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                f64::from_le_bytes(raw)
            }
            SampleFormat::F32Le => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                f32::from_le_bytes(raw) as f64
            }
        }
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ffmpeg_name())
    }
}

/// Byte staging area between pipe reads and decoded samples.
///
/// A pipe read may end in the middle of a sample. The incomplete bytes stay at
/// the front of the staging area and are completed by the next read.
#[derive(Debug)]
pub struct SampleAssembler {
    format: SampleFormat,
    raw: Vec<u8>,
    pending: usize,
    decoded: Vec<f64>,
}

impl SampleAssembler {
    pub fn new(format: SampleFormat, chunk_samples: usize) -> Self {
        let chunk_samples = chunk_samples.max(1);
        Self {
            format,
            raw: vec![0u8; chunk_samples.saturating_mul(format.bytes_per_sample())],
            pending: 0,
            decoded: Vec::with_capacity(chunk_samples),
        }
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Writable region for the next read, sized for at most `max_samples`
    /// samples including the bytes already pending.
    pub fn spare(&mut self, max_samples: usize) -> &mut [u8] {
        let limit = max_samples
            .saturating_mul(self.format.bytes_per_sample())
            .min(self.raw.len());
        let end = limit.max(self.pending);
        &mut self.raw[self.pending..end]
    }

    /// Accounts for `read` bytes written into [`spare`](Self::spare) and
    /// returns the whole samples they complete.
    pub fn commit(&mut self, read: usize) -> &[f64] {
        let format = self.format;
        let width = format.bytes_per_sample();
        let total = self.pending + read;
        let whole = total / width * width;

        self.decoded.clear();
        self.decoded.extend(
            self.raw[..whole]
                .chunks_exact(width)
                .map(|bytes| format.decode_one(bytes)),
        );

        self.raw.copy_within(whole..total, 0);
        self.pending = total - whole;
        &self.decoded
    }

    /// Bytes of an incomplete trailing sample.
    pub fn pending_bytes(&self) -> usize {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut SampleAssembler, bytes: &[u8]) -> Vec<f64> {
        let spare = assembler.spare(usize::MAX);
        spare[..bytes.len()].copy_from_slice(bytes);
        assembler.commit(bytes.len()).to_vec()
    }

    #[test]
    fn sample_split_across_reads() {
        let mut bytes = Vec::new();
        for value in [0.25f64, -1.0, 0.5] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let mut assembler = SampleAssembler::new(SampleFormat::F64Le, 4);
        assert_eq!(feed(&mut assembler, &bytes[..5]), Vec::<f64>::new());
        assert_eq!(assembler.pending_bytes(), 5);
        assert_eq!(feed(&mut assembler, &bytes[5..19]), vec![0.25, -1.0]);
        assert_eq!(assembler.pending_bytes(), 3);
        assert_eq!(feed(&mut assembler, &bytes[19..]), vec![0.5]);
        assert_eq!(assembler.pending_bytes(), 0);
    }

    #[test]
    fn spare_respects_sample_limit() {
        let mut assembler = SampleAssembler::new(SampleFormat::F32Le, 16);
        assert_eq!(assembler.spare(usize::MAX).len(), 64);
        assert_eq!(assembler.spare(3).len(), 12);

        let spare = assembler.spare(1);
        spare[..2].copy_from_slice(&[0, 0]);
        assembler.commit(2);
        assert_eq!(assembler.spare(1).len(), 2);
    }

    #[test]
    fn huge_sample_limit_is_clamped() {
        let mut assembler = SampleAssembler::new(SampleFormat::F64Le, 8);
        assert_eq!(assembler.spare(usize::MAX / 2).len(), 64);
        assert_eq!(assembler.spare(usize::MAX).len(), 64);
    }

    #[test]
    fn f32_samples_widen() {
        let mut assembler = SampleAssembler::new(SampleFormat::F32Le, 2);
        let bytes = [0.5f32.to_le_bytes(), (-0.125f32).to_le_bytes()].concat();
        assert_eq!(feed(&mut assembler, &bytes), vec![0.5, -0.125]);
    }
}
