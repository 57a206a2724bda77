use crate::utils::errors::IntervalError;

/// Ascending sample-count thresholds at which the consumer is notified.
///
/// The table is immutable once built. The reader walks it with its own cursor,
/// so it is shared without any locking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalTable {
    thresholds: Vec<usize>,
}

impl IntervalTable {
    pub fn new(thresholds: Vec<usize>) -> Result<Self, IntervalError> {
        if thresholds.first() == Some(&0) {
            return Err(IntervalError::ZeroThreshold);
        }
        if let Some(pair) = thresholds.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(IntervalError::NotAscending {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self { thresholds })
    }

    /// Builds a table from durations in seconds at `sample_rate` (mono).
    pub fn from_seconds(seconds: &[f64], sample_rate: u32) -> Result<Self, IntervalError> {
        let thresholds = seconds
            .iter()
            .map(|&secs| {
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(IntervalError::InvalidSeconds(secs));
                }
                Ok((secs * sample_rate as f64).round() as usize)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(thresholds)
    }

    /// Rejects thresholds that a buffer of `capacity` samples can never reach.
    pub fn check_capacity(&self, capacity: usize) -> Result<(), IntervalError> {
        match self.last() {
            Some(threshold) if threshold > capacity => {
                Err(IntervalError::ExceedsCapacity { threshold, capacity })
            }
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.thresholds.get(index).copied()
    }

    /// The largest threshold, which is the sample count a full analysis needs.
    pub fn last(&self) -> Option<usize> {
        self.thresholds.last().copied()
    }

    pub fn thresholds(&self) -> &[usize] {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unordered_tables() {
        assert_eq!(
            IntervalTable::new(vec![10, 10]),
            Err(IntervalError::NotAscending {
                previous: 10,
                next: 10
            })
        );
        assert_eq!(
            IntervalTable::new(vec![3, 7, 5]),
            Err(IntervalError::NotAscending {
                previous: 7,
                next: 5
            })
        );
        assert_eq!(IntervalTable::new(vec![0, 1]), Err(IntervalError::ZeroThreshold));
    }

    #[test]
    fn seconds_convert_at_sample_rate() {
        let table = IntervalTable::from_seconds(&[1.0, 2.5, 15.0], 48000).unwrap();
        assert_eq!(table.thresholds(), &[48000, 120000, 720000]);
        assert_eq!(table.last(), Some(720000));

        assert!(matches!(
            IntervalTable::from_seconds(&[-1.0], 48000),
            Err(IntervalError::InvalidSeconds(_))
        ));
        assert_eq!(
            IntervalTable::from_seconds(&[0.5, f64::INFINITY], 48000),
            Err(IntervalError::InvalidSeconds(f64::INFINITY))
        );
    }

    #[test]
    fn capacity_check() {
        let table = IntervalTable::new(vec![10, 50, 90]).unwrap();
        assert!(table.check_capacity(100).is_ok());
        assert!(table.check_capacity(90).is_ok());
        assert_eq!(
            table.check_capacity(80),
            Err(IntervalError::ExceedsCapacity {
                threshold: 90,
                capacity: 80
            })
        );
        assert!(IntervalTable::default().check_capacity(0).is_ok());
    }
}
