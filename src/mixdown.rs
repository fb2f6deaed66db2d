use tracing::warn;

/// A named buffer of interleaved float samples
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Clip {
    pub fn new(name: impl Into<String>, samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Clip {
            name: name.into(),
            samples,
            sample_rate,
            channels,
        }
    }

    /// Natural length of the clip in seconds
    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }
}

/// Per-clip gain shaping: constant volume, an optional cut point, and a
/// linear release fade after the cut.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub volume: f32,
    /// Seconds of the clip to keep before the release begins.
    /// `None` keeps the clip's natural length.
    pub duration: Option<f32>,
    pub release: f32,
}

impl Envelope {
    /// Play the whole clip at the given volume
    pub fn full(volume: f32) -> Self {
        Envelope {
            volume,
            duration: None,
            release: 0.0,
        }
    }

    /// Hard cut after `duration` seconds
    pub fn stop(duration: f32, volume: f32) -> Self {
        Envelope {
            volume,
            duration: Some(duration),
            release: 0.0,
        }
    }

    /// Cut after `duration` seconds with a short fade-out tail
    pub fn gentle_stop(duration: f32, volume: f32) -> Self {
        Envelope {
            volume,
            duration: Some(duration),
            release: 0.05,
        }
    }
}

struct AudioEvent {
    clip: Clip,
    start_time: f32,
    volume: f32,
    /// Resolved cut point in seconds, relative to the clip start
    cut_duration: f32,
    release: f32,
}

/// Accumulates positioned clips and mixes them into one interleaved,
/// clipped float buffer.
///
/// The target sample rate is inferred from the first clip added unless set
/// explicitly; no resampling happens here, a clip recorded at a different
/// rate is summed as-is and a warning is logged.
#[derive(Default)]
pub struct Mixdown {
    events: Vec<AudioEvent>,
    target_sample_rate: u32,
}

impl Mixdown {
    pub fn new() -> Self {
        Mixdown::default()
    }

    /// Sample rate inferred from the clips so far (0 until a clip is added)
    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Schedule a clip at `start_time_seconds`. A `None` envelope plays the
    /// clip in full. Empty clips are ignored.
    pub fn add_clip(&mut self, clip: Clip, start_time_seconds: f32, envelope: Option<Envelope>) {
        if clip.samples.is_empty() {
            return;
        }

        if self.target_sample_rate == 0 {
            self.target_sample_rate = clip.sample_rate;
        }

        let envelope = envelope.unwrap_or_else(|| Envelope::full(1.0));
        let cut_duration = envelope
            .duration
            .filter(|d| *d >= 0.0)
            .unwrap_or_else(|| clip.duration_seconds());

        self.events.push(AudioEvent {
            start_time: start_time_seconds.max(0.0),
            volume: envelope.volume.clamp(0.0, 1.0),
            cut_duration,
            release: envelope.release.max(0.0),
            clip,
        });
    }

    /// Mix all scheduled clips into one interleaved buffer, applying each
    /// event's envelope and finally clamping every sample to [-1.0, 1.0].
    ///
    /// Returns an empty buffer when nothing is scheduled or the computed
    /// length is zero.
    pub fn mix(&self, target_sample_rate: u32, target_channels: u16) -> Vec<f32> {
        if self.events.is_empty() || target_sample_rate == 0 || target_channels == 0 {
            return Vec::new();
        }

        let mut max_end_time = 0.0f32;
        for event in &self.events {
            if event.clip.sample_rate != target_sample_rate || event.clip.channels != target_channels
            {
                warn!(
                    "Clip '{}' has sample rate {}Hz / {} channels, target is {}Hz / {}; summing without conversion",
                    event.clip.name,
                    event.clip.sample_rate,
                    event.clip.channels,
                    target_sample_rate,
                    target_channels
                );
            }

            let natural_end = event.start_time + event.clip.duration_seconds();
            let cut_end = event.start_time + event.cut_duration + event.release;
            max_end_time = max_end_time.max(natural_end).max(cut_end);
        }

        if max_end_time <= 0.0 {
            return Vec::new();
        }

        let total_samples =
            (max_end_time * target_sample_rate as f32).ceil() as usize * target_channels as usize;
        let mut buffer = vec![0.0f32; total_samples];

        for event in &self.events {
            let start_index = (event.start_time * target_sample_rate as f32) as usize
                * target_channels as usize;
            let fade_start_time = event.start_time + event.cut_duration;

            for (i, sample) in event.clip.samples.iter().enumerate() {
                let buffer_index = start_index + i;
                if buffer_index >= buffer.len() {
                    break;
                }

                let time_in_mix = buffer_index as f32
                    / target_channels as f32
                    / target_sample_rate as f32;
                let mut volume = event.volume;

                if time_in_mix >= fade_start_time {
                    if event.release > 0.0 {
                        let time_into_release = time_in_mix - fade_start_time;
                        let fade_factor = 1.0 - time_into_release / event.release;
                        volume *= fade_factor.clamp(0.0, 1.0);
                    } else {
                        volume = 0.0;
                    }
                }

                // Past the end of the release there is nothing left to write
                if volume <= 0.0 && time_in_mix >= fade_start_time {
                    break;
                }

                buffer[buffer_index] += sample * volume;
            }
        }

        for sample in &mut buffer {
            *sample = sample.clamp(-1.0, 1.0);
        }

        buffer
    }
}
