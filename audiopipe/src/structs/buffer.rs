/// Fixed-capacity storage for decoded mono samples.
///
/// The storage is allocated up front and filled from the front; `len` is the
/// write cursor. `len` never exceeds the capacity.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    len: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Number of samples that can still be written.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// The written prefix.
    pub fn filled(&self) -> &[f64] {
        &self.samples[..self.len]
    }

    /// Copies as many of `samples` as fit and returns how many were taken.
    pub fn push(&mut self, samples: &[f64]) -> usize {
        let count = samples.len().min(self.remaining());
        self.samples[self.len..self.len + count].copy_from_slice(&samples[..count]);
        self.len += count;
        count
    }

    /// Writes `0.0` over the unwritten tail and marks the buffer full.
    ///
    /// Returns the number of padded samples.
    pub fn pad_to_capacity(&mut self) -> usize {
        let padded = self.remaining();
        self.samples[self.len..].fill(0.0);
        self.len = self.capacity();
        padded
    }

    pub fn into_samples(self) -> Vec<f64> {
        let mut samples = self.samples;
        samples.truncate(self.len);
        samples
    }
}
