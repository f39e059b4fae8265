//! Scale- and DC-invariant reconstruction loss with a silence gate.

/// Target mean-square energy below which a reference is treated as silence
/// and the loss falls back to a heavily-weighted L1 term.
const SILENCE_GATE: f32 = 1e-5;

/// Reconstruction loss for denoiser training.
///
/// Combines negated SI-SDR (scale-invariant signal-to-distortion ratio)
/// with an auxiliary L1 term. Both signals are mean-centered before the
/// projection, so the metric ignores DC offsets, and the silence gate keeps
/// the loss finite when the reference is pure silence.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionLoss {
    alpha: f32,
    beta: f32,
    eps: f32,
}

impl Default for ReconstructionLoss {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.1,
            eps: 1e-8,
        }
    }
}

impl ReconstructionLoss {
    /// `alpha` weights the SI-SDR term, `beta` the auxiliary L1 term, and
    /// `eps` floors every division and logarithm.
    pub fn new(alpha: f32, beta: f32, eps: f32) -> Self {
        Self { alpha, beta, eps }
    }

    /// SI-SDR of one prediction/target pair, in decibels.
    ///
    /// Both signals are mean-centered, the prediction is projected onto the
    /// target, and the ratio of projected energy to residual energy is
    /// returned on a log scale. Invariant to rescaling the prediction
    /// relative to the target and to constant offsets on either signal.
    pub fn sisdr(&self, preds: &[f32], target: &[f32]) -> f32 {
        assert_eq!(
            preds.len(),
            target.len(),
            "sisdr requires equal-length signals"
        );
        debug_assert!(!preds.is_empty(), "sisdr requires non-empty signals");
        let n = preds.len() as f32;

        let preds_mean = preds.iter().sum::<f32>() / n;
        let target_mean = target.iter().sum::<f32>() / n;

        let mut dot = 0.0f32;
        let mut target_energy = 0.0f32;
        for (p, t) in preds.iter().zip(target.iter()) {
            let pc = p - preds_mean;
            let tc = t - target_mean;
            dot += pc * tc;
            target_energy += tc * tc;
        }
        let scale = dot / (target_energy + self.eps);

        let mut scaled_energy = 0.0f32;
        let mut residual_energy = 0.0f32;
        for (p, t) in preds.iter().zip(target.iter()) {
            let pc = p - preds_mean;
            let tc = t - target_mean;
            let ts = scale * tc;
            let residual = pc - ts;
            scaled_energy += ts * ts;
            residual_energy += residual * residual;
        }

        10.0 * (scaled_energy / (residual_energy + self.eps) + self.eps).log10()
    }

    /// SI-SDR per element of a batch.
    pub fn sisdr_batch(&self, preds: &[Vec<f32>], target: &[Vec<f32>]) -> Vec<f32> {
        assert_eq!(
            preds.len(),
            target.len(),
            "sisdr_batch requires matching batch sizes"
        );
        preds
            .iter()
            .zip(target.iter())
            .map(|(p, t)| self.sisdr(p, t))
            .collect()
    }

    /// Batched loss: mean over per-element losses.
    ///
    /// Active elements (target mean-square energy above the gate) get
    /// `alpha * (-sisdr) + beta * l1`; silent targets get `l1 * 10.0`,
    /// skipping the degenerate projection entirely. Finite for every finite
    /// input, including all-zero targets and predictions.
    pub fn forward(&self, preds: &[Vec<f32>], target: &[Vec<f32>]) -> f32 {
        assert_eq!(
            preds.len(),
            target.len(),
            "forward requires matching batch sizes"
        );
        debug_assert!(!preds.is_empty(), "forward requires a non-empty batch");

        let total: f32 = preds
            .iter()
            .zip(target.iter())
            .map(|(p, t)| self.forward_single(p, t))
            .sum();
        total / preds.len() as f32
    }

    fn forward_single(&self, preds: &[f32], target: &[f32]) -> f32 {
        assert_eq!(
            preds.len(),
            target.len(),
            "forward requires equal-length signals"
        );
        let n = target.len() as f32;
        let target_energy = target.iter().map(|t| t * t).sum::<f32>() / n;
        let l1 = preds
            .iter()
            .zip(target.iter())
            .map(|(p, t)| (p - t).abs())
            .sum::<f32>()
            / n;

        if target_energy > SILENCE_GATE {
            self.alpha * -self.sisdr(preds, target) + self.beta * l1
        } else {
            l1 * 10.0
        }
    }
}
