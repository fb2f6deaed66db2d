// Canonical 16-bit PCM WAV encoding and header probing.
//
// The upload payload needs the artifact's duration, sample rate and channel
// count; those are read straight from the 44-byte header rather than decoding
// the stream.

/// Size of the canonical RIFF/WAVE header written by [`encode`].
pub const HEADER_LEN: usize = 44;

/// Target format for an encoded WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        WavSpec {
            sample_rate: 44100,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// Format parameters recovered from a WAV header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_seconds: f32,
}

/// Encode interleaved float samples as a self-contained WAV byte buffer.
///
/// Samples are scaled to i16 and written little-endian after the canonical
/// 44-byte header. Callers are expected to have clamped the buffer to
/// [-1.0, 1.0] already (the mixdown does).
pub fn encode(samples: &[f32], spec: WavSpec) -> Vec<u8> {
    let bytes_per_sample = (spec.bits_per_sample / 8) as u32;
    let byte_rate = spec.sample_rate * spec.channels as u32 * bytes_per_sample;
    let block_align = spec.channels * (spec.bits_per_sample / 8);
    let data_size = samples.len() as u32 * bytes_per_sample;

    let mut out = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt subchunk (size 16, PCM format tag 1)
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&spec.channels.to_le_bytes());
    out.extend_from_slice(&spec.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&spec.bits_per_sample.to_le_bytes());

    // data subchunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    for sample in samples {
        let sample16 = (sample * 32767.0) as i16;
        out.extend_from_slice(&sample16.to_le_bytes());
    }

    out
}

/// Duration in seconds, derived from the byte rate field of the header.
///
/// Returns 0.0 for anything too short to carry a header or with a zero byte
/// rate; a bogus file should not sink the upload that references it.
pub fn duration_seconds(bytes: &[u8]) -> f32 {
    if bytes.len() < HEADER_LEN {
        return 0.0;
    }
    let byte_rate = u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
    if byte_rate == 0 {
        return 0.0;
    }
    let data_size = (bytes.len() - HEADER_LEN) as f32;
    data_size / byte_rate as f32
}

/// Read format parameters out of a WAV header.
///
/// Returns `None` when the buffer is too short or the RIFF/WAVE tags are
/// missing. Only the canonical header layout is recognized.
pub fn probe(bytes: &[u8]) -> Option<WavInfo> {
    if bytes.len() < HEADER_LEN || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let channels = u16::from_le_bytes([bytes[22], bytes[23]]);
    let sample_rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let bits_per_sample = u16::from_le_bytes([bytes[34], bytes[35]]);

    Some(WavInfo {
        sample_rate,
        channels,
        bits_per_sample,
        duration_seconds: duration_seconds(bytes),
    })
}
