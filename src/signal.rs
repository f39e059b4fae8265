//! Scalar signal math shared by every stage.

/// Floor used to guard divisions against near-zero denominators.
pub const EPS: f32 = 1e-9;

/// Root-mean-square energy: L2 norm over sqrt(sample count).
pub fn rms(samples: &[f32]) -> f32 {
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    sum_sq.sqrt() / ((samples.len() as f32).sqrt() + EPS)
}

/// Decibels to linear amplitude scale.
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Linear amplitude scale to decibels.
pub fn linear_to_db(scale: f32) -> f32 {
    20.0 * (scale + EPS).log10()
}

/// Scale a buffer in place so the maximum absolute sample is 1.
///
/// An all-zero buffer stays all-zero (the epsilon keeps the division
/// finite).
pub fn peak_normalize(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    let inv = 1.0 / (peak + EPS);
    for s in samples.iter_mut() {
        *s *= inv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_constant_signal() {
        let samples = vec![0.5f32; 1000];
        assert!((rms(&samples) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_rms_empty_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_db_linear_round_trip() {
        for db in [-40.0f32, -6.0, 0.0, 6.0, 20.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "db={} back={}", db, back);
        }
    }

    #[test]
    fn test_peak_normalize() {
        let mut samples = vec![0.1, -0.4, 0.2];
        peak_normalize(&mut samples);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_peak_normalize_silence() {
        let mut samples = vec![0.0f32; 16];
        peak_normalize(&mut samples);
        assert!(samples.iter().all(|s| *s == 0.0));
    }
}
