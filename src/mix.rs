//! SNR-controlled mixing of clean and noise signals.

use crate::signal::{db_to_linear, rms, EPS};

/// Mix `noise` into `clean` so the result sits at `snr_db` decibels of
/// signal-to-noise ratio.
///
/// Near-silent noise (RMS below 1e-9) returns `clean` unchanged rather
/// than blowing up the scale factor. The output is intentionally not
/// clamped; callers clamp once at the end of their chain.
///
/// Panics if the signals differ in length — a silent truncation here would
/// corrupt the SNR guarantee.
pub fn mix_signals(clean: &[f32], noise: &[f32], snr_db: f32) -> Vec<f32> {
    assert_eq!(
        clean.len(),
        noise.len(),
        "mix_signals requires equal-length signals"
    );

    let clean_rms = rms(clean);
    let noise_rms = rms(noise);

    if noise_rms < 1e-9 {
        return clean.to_vec();
    }

    let target_noise_rms = clean_rms / db_to_linear(snr_db);
    let scale = target_noise_rms / (noise_rms + EPS);

    clean
        .iter()
        .zip(noise.iter())
        .map(|(c, n)| c + n * scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_rms_sine(len: usize) -> Vec<f32> {
        let sqrt2 = std::f32::consts::SQRT_2;
        (0..len)
            .map(|i| sqrt2 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16000.0).sin())
            .collect()
    }

    fn white_noise(len: usize, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    #[test]
    fn test_silent_noise_returns_clean_exactly() {
        let clean = unit_rms_sine(8000);
        let silence = vec![0.0f32; 8000];
        assert_eq!(mix_signals(&clean, &silence, 10.0), clean);
    }

    #[test]
    fn test_requested_snr_is_achieved() {
        let clean = unit_rms_sine(32000);
        let noise = white_noise(32000, 42);
        for snr_db in [-5.0f32, 0.0, 10.0, 20.0] {
            let noisy = mix_signals(&clean, &noise, snr_db);
            let residual: Vec<f32> = noisy.iter().zip(&clean).map(|(y, c)| y - c).collect();
            let measured = 20.0 * (rms(&clean) / rms(&residual)).log10();
            assert!(
                (measured - snr_db).abs() < 0.1,
                "requested {} dB, measured {} dB",
                snr_db,
                measured
            );
        }
    }

    #[test]
    fn test_zero_db_mix_has_sqrt2_rms() {
        // Uncorrelated unit-RMS signals at 0 dB sum to ~sqrt(2) RMS.
        let clean = unit_rms_sine(32000);
        let noise = white_noise(32000, 7);
        let noisy = mix_signals(&clean, &noise, 0.0);
        let ratio = rms(&noisy) / rms(&clean);
        assert!(
            (ratio - std::f32::consts::SQRT_2).abs() < 0.07,
            "ratio {}",
            ratio
        );
    }

    #[test]
    #[should_panic(expected = "equal-length")]
    fn test_length_mismatch_panics() {
        mix_signals(&[0.0; 10], &[0.0; 11], 0.0);
    }
}
