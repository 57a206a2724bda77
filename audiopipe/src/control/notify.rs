use parking_lot::{Condvar, Mutex};

use crate::structs::buffer::SampleBuffer;
use crate::structs::intervals::IntervalTable;
use crate::utils::errors::IntervalError;

/// One notification delivered to consumers, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The buffer reached `thresholds[index]`; `len` is the fill level at
    /// the time of the signal.
    Interval {
        index: usize,
        threshold: usize,
        len: usize,
    },
    /// The stream ended short and the tail was zero-padded; every interval is
    /// now satisfiable.
    AllReady { len: usize },
}

/// How a session left the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Aborted,
    Failed,
}

/// Answer to a consumer waiting for an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The interval was reached by decoded data.
    Ready,
    /// The interval is covered by zero-padding after a short stream.
    AllReady,
    /// The session ended without making the interval available.
    Closed(SessionEnd),
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        matches!(self, Readiness::Ready | Readiness::AllReady)
    }
}

#[derive(Debug)]
struct Progress {
    buffer: SampleBuffer,
    signaled: usize,
    all_ready: bool,
    end: Option<SessionEnd>,
    signals: Vec<Signal>,
}

/// Decoded sample buffer shared between one reader and its consumers.
///
/// The reader appends decoded chunks and signals thresholds; consumers block
/// in [`wait_interval`](Self::wait_interval) and then look at the filled
/// prefix through [`with_samples`](Self::with_samples). The lock is held only
/// for copies and bookkeeping, never while the reader waits on the pipe.
#[derive(Debug)]
pub struct SharedBuffer {
    intervals: IntervalTable,
    capacity: usize,
    progress: Mutex<Progress>,
    ready: Condvar,
}

impl SharedBuffer {
    pub fn new(capacity: usize, intervals: IntervalTable) -> Result<Self, IntervalError> {
        intervals.check_capacity(capacity)?;
        Ok(Self {
            intervals,
            capacity,
            progress: Mutex::new(Progress {
                buffer: SampleBuffer::new(capacity),
                signaled: 0,
                all_ready: false,
                end: None,
                signals: Vec::new(),
            }),
            ready: Condvar::new(),
        })
    }

    pub fn intervals(&self) -> &IntervalTable {
        &self.intervals
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.progress.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every signal delivered so far.
    pub fn signals(&self) -> Vec<Signal> {
        self.progress.lock().signals.clone()
    }

    /// `None` while a session is still writing.
    pub fn end(&self) -> Option<SessionEnd> {
        self.progress.lock().end
    }

    /// Runs `f` on the filled prefix. Keep `f` short: the reader waits for
    /// the lock before it can append the next chunk.
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        let progress = self.progress.lock();
        f(progress.buffer.filled())
    }

    /// Copy of the filled prefix.
    pub fn snapshot(&self) -> Vec<f64> {
        self.with_samples(|samples| samples.to_vec())
    }

    /// Blocks until interval `index` can be analysed or the session ends.
    ///
    /// An `index` past the end of the table waits for the end of the session.
    pub fn wait_interval(&self, index: usize) -> Readiness {
        let mut progress = self.progress.lock();
        loop {
            if index < progress.signaled {
                return Readiness::Ready;
            }
            if progress.all_ready {
                return Readiness::AllReady;
            }
            if let Some(end) = progress.end {
                return match end {
                    SessionEnd::Completed if index < self.intervals.len() => Readiness::Ready,
                    end => Readiness::Closed(end),
                };
            }
            self.ready.wait(&mut progress);
        }
    }

    /// Blocks until the session writing this buffer has returned.
    pub fn wait_complete(&self) -> SessionEnd {
        let mut progress = self.progress.lock();
        loop {
            if let Some(end) = progress.end {
                return end;
            }
            self.ready.wait(&mut progress);
        }
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.progress.into_inner().buffer.into_samples()
    }

    /// Clears the fill level and notification state for a new session.
    pub(crate) fn reset(&self) {
        let mut progress = self.progress.lock();
        progress.buffer = SampleBuffer::new(self.capacity);
        progress.signaled = 0;
        progress.all_ready = false;
        progress.end = None;
        progress.signals.clear();
    }

    /// Appends decoded samples and returns the new fill level.
    pub(crate) fn append(&self, samples: &[f64]) -> usize {
        let mut progress = self.progress.lock();
        progress.buffer.push(samples);
        progress.buffer.len()
    }

    pub(crate) fn signal_interval(&self, index: usize, threshold: usize, len: usize) {
        let mut progress = self.progress.lock();
        progress.signaled = index + 1;
        progress.signals.push(Signal::Interval {
            index,
            threshold,
            len,
        });
        self.ready.notify_all();
    }

    /// Zero-fills the unwritten tail, emits [`Signal::AllReady`] and returns
    /// the number of padded samples. Does nothing on a full buffer.
    pub(crate) fn pad_and_signal(&self) -> usize {
        let mut progress = self.progress.lock();
        if progress.buffer.is_full() {
            return 0;
        }
        let padded = progress.buffer.pad_to_capacity();
        let len = progress.buffer.len();
        progress.all_ready = true;
        progress.signals.push(Signal::AllReady { len });
        self.ready.notify_all();
        padded
    }

    pub(crate) fn close(&self, end: SessionEnd) {
        let mut progress = self.progress.lock();
        progress.end = Some(end);
        self.ready.notify_all();
    }
}
