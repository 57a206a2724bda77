/// `hh:mm:ss.mmm`, with as many hour digits as needed past 99 hours.
pub fn time_str(sec: f64) -> String {
    let ms = (sec * 1000f64).round() as u64;
    let hours = ms / 3_600_000;
    let minutes = ms % 3_600_000 / 60_000;
    let seconds = ms % 60_000 / 1000;
    let milliseconds = ms % 1000;

    format!(
        "{hours:0width$}:{minutes:02}:{seconds:02}.{milliseconds:03}",
        width = if hours >= 100 { 0 } else { 2 }
    )
}

/// Position of `samples` mono samples at `sample_rate` as [`time_str`].
pub fn samples_time_str(samples: usize, sample_rate: u32) -> String {
    time_str(samples as f64 / sample_rate as f64)
}

#[test]
fn test_time_str() {
    assert_eq!(time_str(0.0), "00:00:00.000");
    assert_eq!(time_str(3723.5), "01:02:03.500");
    assert_eq!(samples_time_str(720000, 48000), "00:00:15.000");
    assert_eq!(samples_time_str(48, 48000), "00:00:00.001");
}
