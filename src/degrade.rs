//! Signal degradations simulating poor recording hardware.

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};
use rand::Rng;

use crate::error::AugmentError;

/// Telephone-band emulation center frequency.
const BANDPASS_CENTER_HZ: f32 = 1500.0;
const BANDPASS_Q: f32 = 0.6;

/// Hard-clip amplitude to [-threshold, threshold].
pub fn apply_clipping(wav: &[f32], threshold: f32) -> Vec<f32> {
    wav.iter().map(|s| s.clamp(-threshold, threshold)).collect()
}

/// Band-pass filter centered at 1500 Hz with Q 0.6, emulating
/// telephone-bandwidth audio.
pub fn apply_bandpass(wav: &[f32], sample_rate: f32) -> Result<Vec<f32>, AugmentError> {
    let coeffs = Coefficients::<f32>::from_params(
        Type::BandPass,
        sample_rate.hz(),
        BANDPASS_CENTER_HZ.hz(),
        BANDPASS_Q,
    )
    .map_err(|e| AugmentError::Filter(format!("bandpass coefficients: {:?}", e)))?;

    let mut filter = DirectForm1::<f32>::new(coeffs);
    Ok(wav.iter().map(|s| filter.run(*s)).collect())
}

/// The "Brutalizer": random gain, probabilistic DC offset, and a
/// conditional hard clip when the gain ran hot.
///
/// Draw order is fixed: gain, then the DC coin (offset drawn only when it
/// lands), then the clip coin (flipped only when gain > 1.2).
pub fn apply_brutal<R: Rng>(wav: &[f32], rng: &mut R) -> Vec<f32> {
    let gain = rng.random_range(0.3..2.0);
    let mut out: Vec<f32> = wav.iter().map(|s| s * gain).collect();

    if rng.random::<f32>() < 0.2 {
        let dc = rng.random_range(-0.05..0.05);
        for s in out.iter_mut() {
            *s += dc;
        }
    }

    if gain > 1.2 && rng.random::<f32>() < 0.4 {
        for s in out.iter_mut() {
            *s = s.clamp(-0.95, 0.95);
        }
    }

    out
}
