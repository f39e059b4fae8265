use std::path::PathBuf;

/// Errors from the fallible collaborator surface (file loading, resampling,
/// filter design). Pure DSP stages resolve degenerate inputs to defined
/// fallback values instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("No audio track in {}", .0.display())]
    NoAudioTrack(PathBuf),
    #[error("Resampler construction failed: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),
    #[error("Resample error: {0}")]
    Resample(#[from] rubato::ResampleError),
    #[error("WAV write error: {0}")]
    WavWrite(#[from] hound::Error),
    #[error("Filter design failed: {0}")]
    Filter(String),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("No clean audio files found under {}", .0.display())]
    EmptyPool(PathBuf),
}
