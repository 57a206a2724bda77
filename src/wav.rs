use std::io::{self, BufWriter, Seek, SeekFrom, Write};

// W64 GUIDs as defined in Sony Wave64 specification
pub const W64_RIFF_GUID: [u8; 16] = [
    0x72, 0x69, 0x66, 0x66, 0x2E, 0x91, 0xCF, 0x11, 0xA5, 0xD6, 0x28, 0xDB, 0x04, 0xC1, 0x00, 0x00,
];
pub const W64_WAVE_GUID: [u8; 16] = [
    0x77, 0x61, 0x76, 0x65, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB, 0x8A,
];
pub const W64_FMT_GUID: [u8; 16] = [
    0x66, 0x6D, 0x74, 0x20, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB, 0x8A,
];
pub const W64_DATA_GUID: [u8; 16] = [
    0x64, 0x61, 0x74, 0x61, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB, 0x8A,
];

/// WAVE_FORMAT_IEEE_FLOAT
const FORMAT_TAG_FLOAT: u16 = 3;

/// Width of the float samples stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> u16 {
        match self {
            FloatWidth::F32 => 32,
            FloatWidth::F64 => 64,
        }
    }
}

/// Sony Wave64 writer for IEEE float samples.
pub struct W64Writer<W: Write + Seek> {
    writer: BufWriter<W>,
    data_size_position: u64,
    file_size_position: u64,
    data_written: u64,
    sample_rate: u32,
    channels: u16,
    width: FloatWidth,
}

impl<W: Write + Seek> W64Writer<W> {
    pub fn new(writer: W, sample_rate: u32, channels: u16, width: FloatWidth) -> Self {
        Self {
            writer: BufWriter::new(writer),
            data_size_position: 0,
            file_size_position: 0,
            data_written: 0,
            sample_rate,
            channels,
            width,
        }
    }

    /// Writes the header with placeholder sizes, patched by [`finish`](Self::finish).
    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(&W64_RIFF_GUID)?;
        self.file_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u64.to_le_bytes())?;
        self.writer.write_all(&W64_WAVE_GUID)?;

        // fmt chunk: GUID + size (24 bytes) + 16 bytes of WAVEFORMAT
        self.writer.write_all(&W64_FMT_GUID)?;
        self.writer.write_all(&(24u64 + 16).to_le_bytes())?;

        let block_align = self.channels * self.width.bits() / 8;
        let byte_rate = self.sample_rate * block_align as u32;
        self.writer.write_all(&FORMAT_TAG_FLOAT.to_le_bytes())?;
        self.writer.write_all(&self.channels.to_le_bytes())?;
        self.writer.write_all(&self.sample_rate.to_le_bytes())?;
        self.writer.write_all(&byte_rate.to_le_bytes())?;
        self.writer.write_all(&block_align.to_le_bytes())?;
        self.writer.write_all(&self.width.bits().to_le_bytes())?;

        self.writer.write_all(&W64_DATA_GUID)?;
        self.data_size_position = self.writer.stream_position()?;
        self.writer.write_all(&0u64.to_le_bytes())?;

        Ok(())
    }

    /// Appends interleaved samples, narrowed to `f32` for [`FloatWidth::F32`].
    pub fn write_samples(&mut self, samples: &[f64]) -> io::Result<()> {
        for &sample in samples {
            match self.width {
                FloatWidth::F32 => self.writer.write_all(&(sample as f32).to_le_bytes())?,
                FloatWidth::F64 => self.writer.write_all(&sample.to_le_bytes())?,
            }
        }
        self.data_written += samples.len() as u64 * (self.width.bits() / 8) as u64;
        Ok(())
    }

    /// Patches the chunk sizes left open by the header.
    pub fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        let end = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&(self.data_written + 24).to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(self.file_size_position))?;
        self.writer.write_all(&end.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    pub fn data_written(&self) -> u64 {
        self.data_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_w64_float_header() -> io::Result<()> {
        let mut writer = W64Writer::new(Cursor::new(Vec::new()), 48000, 1, FloatWidth::F64);
        writer.write_header()?;
        let buffer = writer.into_inner()?.into_inner();

        assert_eq!(&buffer[0..16], &W64_RIFF_GUID);
        assert_eq!(&buffer[24..40], &W64_WAVE_GUID);
        assert_eq!(&buffer[40..56], &W64_FMT_GUID);
        // format tag, channels, sample rate, byte rate, block align, bits
        assert_eq!(&buffer[64..66], &3u16.to_le_bytes());
        assert_eq!(&buffer[66..68], &1u16.to_le_bytes());
        assert_eq!(&buffer[68..72], &48000u32.to_le_bytes());
        assert_eq!(&buffer[72..76], &384000u32.to_le_bytes());
        assert_eq!(&buffer[76..78], &8u16.to_le_bytes());
        assert_eq!(&buffer[78..80], &64u16.to_le_bytes());
        assert_eq!(&buffer[80..96], &W64_DATA_GUID);
        assert_eq!(buffer.len(), 104);

        Ok(())
    }

    #[test]
    fn test_w64_sizes_after_finish() -> io::Result<()> {
        let mut writer = W64Writer::new(Cursor::new(Vec::new()), 48000, 1, FloatWidth::F32);
        writer.write_header()?;
        writer.write_samples(&[0.5, -0.25, 0.0])?;
        assert_eq!(writer.data_written(), 12);
        writer.finish()?;

        let buffer = writer.into_inner()?.into_inner();
        assert_eq!(buffer.len(), 116);
        assert_eq!(&buffer[16..24], &116u64.to_le_bytes());
        assert_eq!(&buffer[96..104], &36u64.to_le_bytes());
        assert_eq!(&buffer[104..108], &0.5f32.to_le_bytes());

        Ok(())
    }
}
