use crate::mixdown::Mixdown;
use crate::wav::{self, WavSpec};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("The mixed audio buffer was empty")]
    EmptyMix,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Target format for a rendered artifact
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// 0 means "use the rate inferred from the mixdown's clips"
    pub target_sample_rate: u32,
    pub target_channels: u16,
    pub bits_per_sample: u16,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            target_sample_rate: 44100,
            target_channels: 2,
            bits_per_sample: 16,
        }
    }
}

impl ExportOptions {
    /// Infer the sample rate from the first clip in the mixdown
    pub fn infer() -> Self {
        ExportOptions {
            target_sample_rate: 0,
            ..ExportOptions::default()
        }
    }
}

/// Mix the scheduled clips down and write them as a WAV file into
/// `output_dir`, returning the path of the created artifact.
///
/// The file name carries a `MMdd_HHmm` timestamp so repeated exports in the
/// same directory don't overwrite each other within the same minute.
pub async fn render_to_file(
    mixdown: &Mixdown,
    options: ExportOptions,
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    info!("Starting audio export");

    let sample_rate = if options.target_sample_rate > 0 {
        options.target_sample_rate
    } else {
        mixdown.target_sample_rate()
    };
    if sample_rate == 0 {
        return Err(ExportError::EmptyMix);
    }

    let buffer = mixdown.mix(sample_rate, options.target_channels);
    debug!("Mixed buffer length = {}", buffer.len());
    if buffer.is_empty() {
        return Err(ExportError::EmptyMix);
    }

    let bytes = wav::encode(
        &buffer,
        WavSpec {
            sample_rate,
            channels: options.target_channels,
            bits_per_sample: options.bits_per_sample,
        },
    );

    let path = output_dir.join(temp_file_name());
    tokio::fs::write(&path, &bytes).await?;

    info!("WAV file written to {}", path.display());
    Ok(path)
}

fn temp_file_name() -> String {
    let timestamp = chrono::Local::now().format("%m%d_%H%M");
    format!("audio_export_{}.wav", timestamp)
}
