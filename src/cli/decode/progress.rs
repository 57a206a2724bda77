use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// One step per analysis interval.
pub fn create_progress_bar(multi: &MultiProgress, interval_count: usize) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(interval_count as u64));
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} intervals\n{msg} | elapsed: {elapsed_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("starting decoder");
    Ok(pb)
}

pub fn finish_progress_bar(pb: &ProgressBar, message: String) {
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} intervals\n{msg} | elapsed: {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.finish_with_message(message);
}
