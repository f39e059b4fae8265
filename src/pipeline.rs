//! Per-sample augmentation orchestration.
//!
//! Composes the DSP stages into `generate_sample`: load a clean crop,
//! reverberate it, pick a noise source, mix at a random SNR, maybe
//! brutalize, clamp. All randomness comes from the caller's generator.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::degrade;
use crate::error::AugmentError;
use crate::loader::{self, AUDIO_EXTENSIONS};
use crate::mix::mix_signals;
use crate::room::RoomSimulator;
use crate::signal::peak_normalize;
use crate::synth::{NoiseColor, NoiseSynth};

/// Options controlling every augmentation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AugmentOptions {
    /// Pipeline sample rate in Hz; sources are resampled to this on load.
    pub sample_rate: u32,
    /// Crop duration in seconds.
    pub duration_secs: f32,
    /// SNR range in dB the mixing stage draws from.
    pub snr_range_db: (f32, f32),
    /// Probability of using a real-noise crop instead of a procedural one
    /// (only when a noise pool was supplied).
    pub prob_real_noise: f32,
    /// Probability of applying convolution reverb to the clean crop.
    pub prob_room: f32,
    /// Probability of brutalizing the noisy side.
    pub prob_brutal: f32,
    /// Upper RT60 bound for synthetic impulse responses, in seconds.
    pub max_rt60: f32,
    /// Number of impulse responses generated at construction.
    pub ir_cache_size: usize,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            duration_secs: 2.0,
            snr_range_db: (0.0, 20.0),
            prob_real_noise: 0.5,
            prob_room: 0.5,
            prob_brutal: 0.2,
            max_rt60: 0.4,
            ir_cache_size: crate::room::DEFAULT_IR_COUNT,
        }
    }
}

impl AugmentOptions {
    /// Load options from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, AugmentError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Generates (noisy, clean) training pairs from a pool of clean recordings
/// and an optional pool of real noise recordings.
pub struct AugmentationPipeline {
    options: AugmentOptions,
    crop_len: usize,
    synth: NoiseSynth,
    room: RoomSimulator,
    clean_files: Vec<PathBuf>,
    noise_files: Vec<PathBuf>,
}

impl AugmentationPipeline {
    /// Scan the source pools and pre-generate the impulse-response cache.
    ///
    /// Fails if the clean pool is empty; an empty (or absent) noise pool
    /// just means all noise is synthesized procedurally.
    pub fn new<R: Rng>(
        options: AugmentOptions,
        clean_dir: &Path,
        noise_dir: Option<&Path>,
        rng: &mut R,
    ) -> Result<Self, AugmentError> {
        let clean_files = loader::scan_audio_files(clean_dir, AUDIO_EXTENSIONS);
        if clean_files.is_empty() {
            return Err(AugmentError::EmptyPool(clean_dir.to_path_buf()));
        }
        let noise_files = noise_dir
            .map(|dir| loader::scan_audio_files(dir, AUDIO_EXTENSIONS))
            .unwrap_or_default();
        log::debug!(
            "augmentation pools: {} clean, {} noise",
            clean_files.len(),
            noise_files.len()
        );

        let crop_len = (options.sample_rate as f32 * options.duration_secs) as usize;
        let synth = NoiseSynth::new(options.sample_rate);
        let room = RoomSimulator::with_cache_size(
            options.sample_rate,
            options.max_rt60,
            options.ir_cache_size,
            rng,
        );

        Ok(Self {
            options,
            crop_len,
            synth,
            room,
            clean_files,
            noise_files,
        })
    }

    /// Adjust training difficulty between epochs.
    pub fn set_curriculum(&mut self, snr_range_db: (f32, f32), prob_real_noise: f32) {
        self.options.snr_range_db = snr_range_db;
        self.options.prob_real_noise = prob_real_noise;
    }

    pub fn options(&self) -> &AugmentOptions {
        &self.options
    }

    /// Samples per generated crop.
    pub fn crop_len(&self) -> usize {
        self.crop_len
    }

    /// Produce one (noisy, clean) pair.
    ///
    /// Never fails: unreadable source files are retried and ultimately
    /// replaced by a low-amplitude noise buffer, so dataset iteration can
    /// run unattended.
    pub fn generate_sample<R: Rng>(&self, rng: &mut R) -> (Vec<f32>, Vec<f32>) {
        let mut crop = self.load_random_crop(&self.clean_files, rng);
        peak_normalize(&mut crop);

        let mut clean = self.room.apply(&crop, self.options.prob_room, rng);

        let noise = self.pick_noise(rng);
        let snr_db = uniform_in(self.options.snr_range_db, rng);
        let mut noisy = mix_signals(&clean, &noise, snr_db);

        if rng.random::<f32>() < self.options.prob_brutal {
            noisy = degrade::apply_brutal(&noisy, rng);
        }

        clamp_unit(&mut noisy);
        clamp_unit(&mut clean);
        (noisy, clean)
    }

    /// Real noise when the pool allows, otherwise procedural noise by
    /// weighted choice: pink 40%, brown 30%, mains hum 20%, clicks 10%.
    fn pick_noise<R: Rng>(&self, rng: &mut R) -> Vec<f32> {
        if !self.noise_files.is_empty() && rng.random::<f32>() < self.options.prob_real_noise {
            return self.load_random_crop(&self.noise_files, rng);
        }

        let r: f32 = rng.random();
        if r < 0.4 {
            self.synth.colored_noise(self.crop_len, NoiseColor::Pink, rng)
        } else if r < 0.7 {
            self.synth.colored_noise(self.crop_len, NoiseColor::Brown, rng)
        } else if r < 0.9 {
            self.synth.mains_hum(self.crop_len, 50.0, true)
        } else {
            self.synth.transient_click(self.crop_len, rng)
        }
    }

    /// Crop a random file from the pool, retrying a bounded number of times
    /// before falling back to a quiet noise buffer. One corrupt file must
    /// never halt an epoch.
    fn load_random_crop<R: Rng>(&self, files: &[PathBuf], rng: &mut R) -> Vec<f32> {
        if !files.is_empty() {
            for _ in 0..3 {
                let path = &files[rng.random_range(0..files.len())];
                match loader::load_crop(path, self.options.sample_rate, self.crop_len, rng) {
                    Ok(crop) => return crop,
                    Err(e) => log::warn!("failed to load {}: {}", path.display(), e),
                }
            }
        }
        (0..self.crop_len)
            .map(|_| rng.sample::<f32, _>(StandardNormal) * 0.01)
            .collect()
    }
}

fn uniform_in<R: Rng>((lo, hi): (f32, f32), rng: &mut R) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

fn clamp_unit(samples: &mut [f32]) {
    for s in samples.iter_mut() {
        *s = s.clamp(-1.0, 1.0);
    }
}
