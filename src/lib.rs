//! Procedural audio augmentation for training denoising models
//!
//! Turns a pool of clean speech recordings into (noisy, clean) training
//! pairs through multi-stage degradation:
//! 1. Procedural noise synthesis (colored noise, mains hum, transient clicks)
//! 2. Convolution reverb from a cache of synthetic room impulse responses
//! 3. SNR-controlled mixing of clean speech and noise
//! 4. "Brutalizer" dynamics damage (random gain, DC offset, hard clipping)
//! 5. A scale- and DC-invariant reconstruction loss with a silence gate
//!
//! All randomness flows through a caller-supplied [`rand::Rng`], so parallel
//! data-loading workers stay reproducible and uncorrelated by seeding their
//! own generators.

pub mod degrade;
pub mod error;
pub mod loader;
pub mod loss;
pub mod mix;
pub mod pipeline;
pub mod room;
pub mod signal;
pub mod synth;

pub use error::AugmentError;
pub use loss::ReconstructionLoss;
pub use mix::mix_signals;
pub use pipeline::{AugmentOptions, AugmentationPipeline};
pub use room::RoomSimulator;
pub use synth::{NoiseColor, NoiseSynth};
