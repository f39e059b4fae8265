//! Procedural noise sources: colored noise, mains hum, transient clicks.

use rand::Rng;
use rand_distr::StandardNormal;
use realfft::num_complex::Complex;
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

/// Spectral tilt of the generated noise.
///
/// Pink follows a 1/f power spectral density, brown 1/f².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    Pink,
    Brown,
}

impl NoiseColor {
    fn alpha(self) -> f32 {
        match self {
            NoiseColor::Pink => 1.0,
            NoiseColor::Brown => 2.0,
        }
    }
}

/// Generator for procedural noise signals at a fixed sample rate.
pub struct NoiseSynth {
    sample_rate: u32,
}

impl NoiseSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Generate `length` samples of colored noise by shaping a random
    /// complex spectrum with a 1/f^alpha power law and inverse-transforming
    /// to the time domain.
    ///
    /// Output level is not normalized; downstream mixing sets levels.
    pub fn colored_noise<R: Rng>(&self, length: usize, color: NoiseColor, rng: &mut R) -> Vec<f32> {
        debug_assert!(length > 0, "colored_noise requires a positive length");
        let alpha = color.alpha();

        // One extra bin for odd lengths so the inverse transform lands on
        // length + 1 samples, trimmed back below.
        let uneven = length % 2;
        let bins = length / 2 + 1 + uneven;
        let fft_len = 2 * (bins - 1);

        let mut spectrum: Vec<Complex<f32>> = (0..bins)
            .map(|k| {
                let re: f32 = rng.sample(StandardNormal);
                let im: f32 = rng.sample(StandardNormal);
                let shape = ((k + 1) as f32).powf(-alpha / 2.0);
                Complex::new(re * shape, im * shape)
            })
            .collect();
        // DC and Nyquist bins of a real spectrum are purely real.
        spectrum[0].im = 0.0;
        spectrum[bins - 1].im = 0.0;

        let mut planner = RealFftPlanner::<f32>::new();
        let inverse = planner.plan_fft_inverse(fft_len);
        let mut noise = inverse.make_output_vec();
        inverse.process(&mut spectrum, &mut noise).ok();

        let norm = 1.0 / fft_len as f32;
        for s in noise.iter_mut() {
            *s *= norm;
        }
        noise.truncate(length);
        noise
    }

    /// Synthesize electrical mains hum at `freq` Hz, optionally with the
    /// 3rd harmonic at 0.5 and the 5th at 0.2 relative amplitude. The sum
    /// is scaled by 0.1, bounding the peak at 0.17.
    pub fn mains_hum(&self, length: usize, freq: f32, harmonics: bool) -> Vec<f32> {
        debug_assert!(length > 0, "mains_hum requires a positive length");
        let duration = length as f32 / self.sample_rate as f32;
        let step = if length > 1 {
            duration / (length - 1) as f32
        } else {
            0.0
        };

        (0..length)
            .map(|i| {
                let t = i as f32 * step;
                let w = 2.0 * std::f32::consts::PI * freq * t;
                let mut hum = w.sin();
                if harmonics {
                    hum += 0.5 * (3.0 * w).sin();
                    hum += 0.2 * (5.0 * w).sin();
                }
                hum * 0.1
            })
            .collect()
    }

    /// Generate digital clicks/pops: 1 to 5 single-sample impulses of
    /// amplitude ±0.8 at uniform random positions. Colliding positions keep
    /// the last write.
    pub fn transient_click<R: Rng>(&self, length: usize, rng: &mut R) -> Vec<f32> {
        debug_assert!(length > 0, "transient_click requires a positive length");
        let mut noise = vec![0.0f32; length];
        let num_clicks = rng.random_range(1..=5);
        for _ in 0..num_clicks {
            let idx = rng.random_range(0..length);
            noise[idx] = if rng.random_bool(0.5) { -0.8 } else { 0.8 };
        }
        noise
    }
}
