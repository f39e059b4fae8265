//! Synthetic room acoustics: impulse-response cache + convolution reverb.

use rand::Rng;
use rand_distr::StandardNormal;
use realfft::RealFftPlanner;

use crate::signal::{db_to_linear, peak_normalize};

/// Number of impulse responses generated at construction.
pub const DEFAULT_IR_COUNT: usize = 30;

/// Simulates room reverberation by convolving signals with synthetic
/// exponentially-decaying impulse responses.
///
/// The cache is generated once at construction and never modified, so a
/// simulator can be shared read-only across data-loading workers.
pub struct RoomSimulator {
    ir_cache: Vec<Vec<f32>>,
}

impl RoomSimulator {
    /// Build a simulator with the default cache size.
    ///
    /// Each impulse response draws an RT60 uniformly from
    /// (0.05, `max_rt60`) seconds; `max_rt60` must exceed 0.05.
    pub fn new<R: Rng>(sample_rate: u32, max_rt60: f32, rng: &mut R) -> Self {
        Self::with_cache_size(sample_rate, max_rt60, DEFAULT_IR_COUNT, rng)
    }

    pub fn with_cache_size<R: Rng>(
        sample_rate: u32,
        max_rt60: f32,
        count: usize,
        rng: &mut R,
    ) -> Self {
        assert!(
            max_rt60 > 0.05,
            "max_rt60 must exceed the 0.05s RT60 lower bound"
        );
        let ir_cache: Vec<Vec<f32>> = (0..count)
            .map(|_| Self::synthesize_ir(sample_rate, max_rt60, rng))
            .collect();
        log::debug!(
            "generated {} impulse responses (max_rt60 {:.2}s)",
            ir_cache.len(),
            max_rt60
        );
        Self { ir_cache }
    }

    /// One synthetic IR: a linear 0 → -60 dB decay ramp over RT60 seconds,
    /// converted to linear amplitude, excited with white noise and
    /// peak-normalized.
    fn synthesize_ir<R: Rng>(sample_rate: u32, max_rt60: f32, rng: &mut R) -> Vec<f32> {
        let rt60 = rng.random_range(0.05..max_rt60);
        let len = ((rt60 * sample_rate as f32) as usize).max(1);
        let mut ir: Vec<f32> = (0..len)
            .map(|i| {
                let db = if len > 1 {
                    -60.0 * i as f32 / (len - 1) as f32
                } else {
                    0.0
                };
                let excitation: f32 = rng.sample(StandardNormal);
                excitation * db_to_linear(db)
            })
            .collect();
        peak_normalize(&mut ir);
        ir
    }

    pub fn cache_len(&self) -> usize {
        self.ir_cache.len()
    }

    /// With probability `prob`, convolve `wav` with a randomly chosen
    /// cached impulse response; otherwise return it unchanged.
    ///
    /// The reverberant result is peak-normalized and truncated back to the
    /// input length (the convolution tail is discarded), so downstream
    /// stages can keep assuming fixed-length crops.
    pub fn apply<R: Rng>(&self, wav: &[f32], prob: f32, rng: &mut R) -> Vec<f32> {
        if rng.random::<f32>() >= prob || self.ir_cache.is_empty() {
            return wav.to_vec();
        }
        let ir = &self.ir_cache[rng.random_range(0..self.ir_cache.len())];

        let mut padded = wav.to_vec();
        padded.resize(wav.len() + ir.len(), 0.0);

        let mut reverberant = fft_convolve(&padded, ir);
        peak_normalize(&mut reverberant);
        reverberant.truncate(wav.len());
        reverberant
    }
}

/// Full linear convolution via the frequency domain: both operands are
/// zero-padded to a power of two, multiplied bin-wise and transformed back
/// with 1/n scaling.
fn fft_convolve(a: &[f32], b: &[f32]) -> Vec<f32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let out_len = a.len() + b.len() - 1;
    let fft_len = out_len.next_power_of_two();

    let mut planner = RealFftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    let mut a_buf = vec![0.0f32; fft_len];
    a_buf[..a.len()].copy_from_slice(a);
    let mut b_buf = vec![0.0f32; fft_len];
    b_buf[..b.len()].copy_from_slice(b);

    let mut a_spec = forward.make_output_vec();
    let mut b_spec = forward.make_output_vec();
    forward.process(&mut a_buf, &mut a_spec).ok();
    forward.process(&mut b_buf, &mut b_spec).ok();

    for (x, y) in a_spec.iter_mut().zip(b_spec.iter()) {
        *x *= *y;
    }

    let mut out = inverse.make_output_vec();
    inverse.process(&mut a_spec, &mut out).ok();

    let norm = 1.0 / fft_len as f32;
    out.truncate(out_len);
    for s in out.iter_mut() {
        *s *= norm;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cache_size_and_ir_peaks() {
        let mut rng = StdRng::seed_from_u64(21);
        let room = RoomSimulator::new(16000, 0.4, &mut rng);
        assert_eq!(room.cache_len(), DEFAULT_IR_COUNT);
        let small = RoomSimulator::with_cache_size(16000, 0.4, 4, &mut rng);
        assert_eq!(small.cache_len(), 4);
        for ir in &small.ir_cache {
            let peak = ir.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!((peak - 1.0).abs() < 1e-3, "IR peak {}", peak);
        }
    }

    #[test]
    fn test_apply_prob_zero_is_identity() {
        let mut rng = StdRng::seed_from_u64(5);
        let room = RoomSimulator::with_cache_size(16000, 0.3, 4, &mut rng);
        let wav: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin()).collect();
        for _ in 0..50 {
            assert_eq!(room.apply(&wav, 0.0, &mut rng), wav);
        }
    }

    #[test]
    fn test_apply_prob_one_preserves_length() {
        let mut rng = StdRng::seed_from_u64(6);
        let room = RoomSimulator::with_cache_size(16000, 0.3, 4, &mut rng);
        let wav: Vec<f32> = (0..3000).map(|i| (i as f32 * 0.02).sin()).collect();
        for _ in 0..10 {
            let out = room.apply(&wav, 1.0, &mut rng);
            assert_eq!(out.len(), wav.len());
            assert!(out.iter().all(|s| s.is_finite()));
            assert_ne!(out, wav);
        }
    }

    #[test]
    fn test_fft_convolve_against_direct() {
        let a = [1.0f32, 0.5, -0.25, 0.0, 0.125];
        let b = [0.5f32, 0.25, 0.125];
        let got = fft_convolve(&a, &b);
        assert_eq!(got.len(), a.len() + b.len() - 1);
        for (n, g) in got.iter().enumerate() {
            let mut want = 0.0f32;
            for (k, bv) in b.iter().enumerate() {
                if n >= k && n - k < a.len() {
                    want += a[n - k] * bv;
                }
            }
            assert!((g - want).abs() < 1e-4, "lag {}: {} vs {}", n, g, want);
        }
    }

    #[test]
    fn test_fft_convolve_delta_is_identity() {
        let x = [0.25f32, -0.5, 0.75, 1.0];
        let got = fft_convolve(&x, &[1.0]);
        for (g, w) in got.iter().zip(x.iter()) {
            assert!((g - w).abs() < 1e-5);
        }
    }
}
