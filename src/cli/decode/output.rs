use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use audiopipe::structs::format::SampleFormat;

use crate::wav::{FloatWidth, W64Writer};

/// `base_path` with `expected_ext` appended, unless it already has it.
pub fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> PathBuf {
    match base_path.extension() {
        Some(ext) if ext == expected_ext => base_path.to_path_buf(),
        Some(_) => {
            let mut name = base_path.as_os_str().to_os_string();
            name.push(".");
            name.push(expected_ext);
            PathBuf::from(name)
        }
        None => base_path.with_extension(expected_ext),
    }
}

/// Writes mono `samples` to a Wave64 file at the width the decoder produced.
pub fn write_w64(
    path: &Path,
    samples: &[f64],
    sample_rate: u32,
    format: SampleFormat,
) -> Result<PathBuf> {
    let path = create_path_with_extension(path, "w64");
    let width = match format {
        SampleFormat::F32Le => FloatWidth::F32,
        SampleFormat::F64Le => FloatWidth::F64,
    };

    log::info!("Creating audio file: {}", path.display());
    let mut writer = W64Writer::new(File::create(&path)?, sample_rate, 1, width);
    writer.write_header()?;
    writer.write_samples(samples)?;
    writer.finish()?;
    log::debug!("{} bytes of sample data written", writer.data_written());
    writer.into_inner()?.sync_all()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_handling() {
        assert_eq!(
            create_path_with_extension(Path::new("out/track"), "w64"),
            PathBuf::from("out/track.w64")
        );
        assert_eq!(
            create_path_with_extension(Path::new("track.w64"), "w64"),
            PathBuf::from("track.w64")
        );
        assert_eq!(
            create_path_with_extension(Path::new("track.flac"), "w64"),
            PathBuf::from("track.flac.w64")
        );
    }

    #[test]
    fn writes_w64_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_w64(&dir.path().join("decoded"), &[0.25; 10], 48000, SampleFormat::F64Le)?;

        assert_eq!(path.extension().unwrap(), "w64");
        assert_eq!(std::fs::metadata(&path)?.len(), 104 + 80);
        Ok(())
    }
}
