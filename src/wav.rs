//! WAV container I/O for irquad
//!
//! Reads and writes uncompressed RIFF/WAVE files as header parameters plus
//! the raw little-endian frame bytes exactly as they sit in the data chunk.
//! Samples are never converted: 8-bit data stays unsigned, 24-bit data stays
//! three bytes wide, float data keeps its bit pattern.
//!
//! Files are read and written whole. Impulse responses are short, so there
//! is no streaming path.

use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{IrError, Result};

/// Sample encoding tag of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Integer PCM (`WAVE_FORMAT_PCM`)
    Pcm,
    /// 32-bit IEEE float (`WAVE_FORMAT_IEEE_FLOAT`)
    IeeeFloat,
}

impl Compression {
    /// Human readable name of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            Compression::Pcm => "PCM",
            Compression::IeeeFloat => "IEEE float",
        }
    }
}

/// Header parameters of a WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParameters {
    /// Number of interleaved channels
    pub channel_count: u16,
    /// Bytes per sample per channel (1, 2, 3 or 4)
    pub sample_width_bytes: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of frames (samples per channel)
    pub frame_count: u32,
    pub compression: Compression,
}

impl AudioParameters {
    /// Human readable name of the sample encoding
    pub fn compression_name(&self) -> &'static str {
        self.compression.name()
    }

    /// Bytes in one frame across all channels
    pub fn frame_width(&self) -> usize {
        self.channel_count as usize * self.sample_width_bytes as usize
    }

    /// Length in bytes the frame buffer must have
    pub fn expected_len(&self) -> usize {
        self.frame_count as usize * self.frame_width()
    }

    /// Same parameters with a different channel count
    pub fn with_channels(self, channel_count: u16) -> Self {
        AudioParameters {
            channel_count,
            ..self
        }
    }

    /// Check that `other` describes exactly the same layout.
    ///
    /// Returns a description of the first differing field on mismatch.
    pub fn check_compatible(&self, other: &AudioParameters) -> std::result::Result<(), String> {
        let fields = [
            ("channel count", self.channel_count as u64, other.channel_count as u64),
            (
                "sample width",
                self.sample_width_bytes as u64,
                other.sample_width_bytes as u64,
            ),
            ("sample rate", self.sample_rate as u64, other.sample_rate as u64),
            ("frame count", self.frame_count as u64, other.frame_count as u64),
        ];
        for (name, a, b) in fields {
            if a != b {
                return Err(format!("{} {} vs {}", name, a, b));
            }
        }
        if self.compression != other.compression {
            return Err(format!(
                "compression {} vs {}",
                self.compression_name(),
                other.compression_name()
            ));
        }
        Ok(())
    }

    fn to_spec(self) -> WavSpec {
        WavSpec {
            channels: self.channel_count,
            sample_rate: self.sample_rate,
            bits_per_sample: self.sample_width_bytes * 8,
            sample_format: match self.compression {
                Compression::Pcm => SampleFormat::Int,
                Compression::IeeeFloat => SampleFormat::Float,
            },
        }
    }
}

/// A fully loaded WAV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavData {
    pub params: AudioParameters,
    /// Raw interleaved frame bytes
    pub frames: Vec<u8>,
}

impl WavData {
    /// Wrap a frame buffer, checking its length against the parameters
    pub fn new(params: AudioParameters, frames: Vec<u8>) -> Result<Self> {
        if frames.len() != params.expected_len() {
            return Err(IrError::Layout {
                reason: format!(
                    "{} frame bytes for {} frames of {} bytes",
                    frames.len(),
                    params.frame_count,
                    params.frame_width()
                ),
            });
        }
        Ok(WavData { params, frames })
    }
}

/// On-disk sample encodings we pass through untouched
#[derive(Debug, Clone, Copy)]
enum SampleKind {
    U8,
    I16,
    I24,
    I32,
    F32,
}

impl SampleKind {
    fn of(path: &Path, params: &AudioParameters) -> Result<Self> {
        match (params.compression, params.sample_width_bytes) {
            (Compression::Pcm, 1) => Ok(SampleKind::U8),
            (Compression::Pcm, 2) => Ok(SampleKind::I16),
            (Compression::Pcm, 3) => Ok(SampleKind::I24),
            (Compression::Pcm, 4) => Ok(SampleKind::I32),
            (Compression::IeeeFloat, 4) => Ok(SampleKind::F32),
            (compression, width) => Err(IrError::format(
                path,
                format!("unsupported {}-byte {} samples", width, compression.name()),
            )),
        }
    }
}

/// Read only the header of the WAV file at `path`
pub fn read_parameters(path: &Path) -> Result<AudioParameters> {
    let reader = WavReader::open(path).map_err(|e| IrError::from_hound(path, e))?;
    parameters_of(path, &reader)
}

/// Read the WAV file at `path`: header parameters and all frame bytes
///
/// # Errors
/// * `Io` - If the file cannot be opened
/// * `Format` - If the file is not a supported, well-formed WAV container
pub fn read(path: &Path) -> Result<WavData> {
    let bytes = fs::read(path).map_err(|e| IrError::io(path, e))?;
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| in_memory_error(path, e))?;
    let params = parameters_of(path, &reader)?;
    let kind = SampleKind::of(path, &params)?;

    let mut frames = Vec::with_capacity(params.expected_len());
    match kind {
        SampleKind::U8 => collect_samples(path, &mut reader, |s: i8| {
            frames.push(s as u8 ^ 0x80)
        })?,
        SampleKind::I16 => collect_samples(path, &mut reader, |s: i16| {
            frames.extend_from_slice(&s.to_le_bytes())
        })?,
        SampleKind::I24 => collect_samples(path, &mut reader, |s: i32| {
            frames.extend_from_slice(&s.to_le_bytes()[..3])
        })?,
        SampleKind::I32 => collect_samples(path, &mut reader, |s: i32| {
            frames.extend_from_slice(&s.to_le_bytes())
        })?,
        SampleKind::F32 => collect_samples(path, &mut reader, |s: f32| {
            frames.extend_from_slice(&s.to_le_bytes())
        })?,
    }

    if frames.len() != params.expected_len() {
        return Err(IrError::format(
            path,
            format!(
                "data chunk holds {} bytes, header declares {}",
                frames.len(),
                params.expected_len()
            ),
        ));
    }

    Ok(WavData { params, frames })
}

/// Write `frames` with `params` to `path`, replacing any existing file
///
/// A failed write removes the partial file.
///
/// # Errors
/// * `Format` - If the frame length does not match the parameters, or the
///   sample encoding is not supported
/// * `Io` - If the file cannot be created or written
pub fn write(path: &Path, params: &AudioParameters, frames: &[u8]) -> Result<()> {
    if frames.len() != params.expected_len() {
        return Err(IrError::format(
            path,
            format!(
                "{} frame bytes do not match {} frames of {} channels x {} bytes",
                frames.len(),
                params.frame_count,
                params.channel_count,
                params.sample_width_bytes
            ),
        ));
    }
    let kind = SampleKind::of(path, params)?;

    let mut writer =
        WavWriter::create(path, params.to_spec()).map_err(|e| IrError::from_hound(path, e))?;

    let outcome = write_samples(path, &mut writer, kind, frames)
        .and_then(|()| writer.finalize().map_err(|e| IrError::from_hound(path, e)));

    if outcome.is_err() {
        let _ = fs::remove_file(path);
    }
    outcome
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn parameters_of<R: Read>(path: &Path, reader: &WavReader<R>) -> Result<AudioParameters> {
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(IrError::format(path, "zero channels"));
    }
    if spec.bits_per_sample == 0 || spec.bits_per_sample % 8 != 0 {
        return Err(IrError::format(
            path,
            format!("unsupported bit depth {}", spec.bits_per_sample),
        ));
    }

    Ok(AudioParameters {
        channel_count: spec.channels,
        sample_width_bytes: spec.bits_per_sample / 8,
        sample_rate: spec.sample_rate,
        frame_count: reader.duration(),
        compression: match spec.sample_format {
            SampleFormat::Int => Compression::Pcm,
            SampleFormat::Float => Compression::IeeeFloat,
        },
    })
}

/// Map a hound error raised while parsing a file already held in memory.
///
/// The only I/O a cursor can fail with is running out of bytes, so any
/// I/O error means the container is shorter than it declares.
fn in_memory_error(path: &Path, err: hound::Error) -> IrError {
    match err {
        hound::Error::IoError(_) => IrError::format(path, "truncated file"),
        other => IrError::from_hound(path, other),
    }
}

/// Drain every sample of `reader`, handing each to `push`
fn collect_samples<S, R, F>(path: &Path, reader: &mut WavReader<R>, mut push: F) -> Result<()>
where
    S: hound::Sample,
    R: Read,
    F: FnMut(S),
{
    for sample in reader.samples::<S>() {
        let sample = sample.map_err(|e| in_memory_error(path, e))?;
        push(sample);
    }
    Ok(())
}

fn write_samples<W: Write + Seek>(
    path: &Path,
    writer: &mut WavWriter<W>,
    kind: SampleKind,
    frames: &[u8],
) -> Result<()> {
    fn put<S: hound::Sample, W: Write + Seek>(
        path: &Path,
        writer: &mut WavWriter<W>,
        sample: S,
    ) -> Result<()> {
        writer
            .write_sample(sample)
            .map_err(|e| IrError::from_hound(path, e))
    }

    match kind {
        SampleKind::U8 => {
            for &b in frames {
                put(path, writer, (b ^ 0x80) as i8)?;
            }
        }
        SampleKind::I16 => {
            for c in frames.chunks_exact(2) {
                put(path, writer, i16::from_le_bytes([c[0], c[1]]))?;
            }
        }
        SampleKind::I24 => {
            for c in frames.chunks_exact(3) {
                let sign = if c[2] & 0x80 != 0 { 0xff } else { 0x00 };
                put(path, writer, i32::from_le_bytes([c[0], c[1], c[2], sign]))?;
            }
        }
        SampleKind::I32 => {
            for c in frames.chunks_exact(4) {
                put(path, writer, i32::from_le_bytes([c[0], c[1], c[2], c[3]]))?;
            }
        }
        SampleKind::F32 => {
            for c in frames.chunks_exact(4) {
                put(path, writer, f32::from_le_bytes([c[0], c[1], c[2], c[3]]))?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use test_case::test_case;

    fn params(channels: u16, width: u16, frames: u32) -> AudioParameters {
        AudioParameters {
            channel_count: channels,
            sample_width_bytes: width,
            sample_rate: 44100,
            frame_count: frames,
            compression: Compression::Pcm,
        }
    }

    /// Deterministic bytes covering positive and negative samples
    fn ramp(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 + 11) as u8).collect()
    }

    #[test_case(1 ; "8-bit")]
    #[test_case(2 ; "16-bit")]
    #[test_case(3 ; "24-bit")]
    #[test_case(4 ; "32-bit")]
    fn test_round_trip_preserves_bytes(width: u16) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ir.wav");
        let p = params(2, width, 64);
        let frames = ramp(p.expected_len());

        write(&path, &p, &frames).unwrap();
        let data = read(&path).unwrap();

        assert_eq!(data.params, p);
        assert_eq!(data.frames, frames);
    }

    #[test]
    fn test_round_trip_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let p = AudioParameters {
            compression: Compression::IeeeFloat,
            ..params(2, 4, 3)
        };
        let frames: Vec<u8> = [0.5f32, -0.25, 1.0, -1.0, 0.0, 0.125]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        write(&path, &p, &frames).unwrap();
        let data = read(&path).unwrap();

        assert_eq!(data.params.compression_name(), "IEEE float");
        assert_eq!(data.frames, frames);
    }

    #[test]
    fn test_read_parameters_matches_hound_spec() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quad.wav");
        let spec = WavSpec {
            channels: 4,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..40i16 {
            writer.write_sample(i).unwrap();
        }
        writer.finalize().unwrap();

        let p = read_parameters(&path).unwrap();
        assert_eq!(p.channel_count, 4);
        assert_eq!(p.sample_width_bytes, 2);
        assert_eq!(p.sample_rate, 48000);
        assert_eq!(p.frame_count, 10);
        assert_eq!(p.compression_name(), "PCM");
    }

    #[test]
    fn test_write_rejects_wrong_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let p = params(2, 2, 10);

        let err = write(&path, &p, &[0u8; 39]).unwrap_err();
        assert_eq!(err.error_code(), "FORMAT_ERROR");
        assert!(!path.exists());
    }

    #[test]
    fn test_read_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        fs::write(&path, b"this is not a riff container at all").unwrap();

        let err = read(&path).unwrap_err();
        assert_eq!(err.error_code(), "FORMAT_ERROR");
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn test_read_truncated_data_chunk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.wav");
        let p = params(2, 2, 100);
        write(&path, &p, &ramp(p.expected_len())).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 41]).unwrap();

        let err = read(&path).unwrap_err();
        assert_eq!(err.error_code(), "FORMAT_ERROR");
    }

    #[test]
    fn test_io_errors_are_not_reported_as_corruption() {
        let path = Path::new("ir.wav");
        let err = in_memory_error(path, hound::Error::IoError(std::io::ErrorKind::Other.into()));
        assert_eq!(err.error_code(), "FORMAT_ERROR");

        // Reading a directory fails before any parsing, as a plain I/O error
        let dir = tempdir().unwrap();
        let err = read(dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read(&dir.path().join("missing.wav")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_check_compatible_names_field() {
        let a = params(2, 2, 512);
        let b = AudioParameters {
            sample_rate: 48000,
            ..a
        };
        assert!(a.check_compatible(&a).is_ok());
        let details = a.check_compatible(&b).unwrap_err();
        assert_eq!(details, "sample rate 44100 vs 48000");

        let c = AudioParameters {
            frame_count: 511,
            ..a
        };
        assert!(a.check_compatible(&c).unwrap_err().starts_with("frame count"));
    }

    #[test]
    fn test_wav_data_checks_length() {
        let p = params(4, 2, 2);
        assert!(WavData::new(p, vec![0; 16]).is_ok());
        assert!(WavData::new(p, vec![0; 15]).is_err());
    }
}
