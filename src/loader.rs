//! File collaborators: directory scanning, decoding, cropping, WAV export.
//!
//! The core pipeline never touches the filesystem directly; everything
//! flows through these helpers so load failures can be absorbed by the
//! retry/fallback path in the pipeline.

use std::fs::File;
use std::path::{Path, PathBuf};

use rand::Rng;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AugmentError;

/// Extensions scanned for source pools.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3"];

/// Recursively collect audio files under `dir`, filtered by extension
/// (case-insensitive) and sorted for deterministic pool ordering.
///
/// A missing or unreadable directory contributes nothing.
pub fn scan_audio_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files(dir, extensions, &mut files);
    files.sort();
    files
}

fn collect_files(dir: &Path, extensions: &[&str], files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, extensions, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
                files.push(path);
            }
        }
    }
}

/// Decode an audio file to mono f32 samples plus its native sample rate.
///
/// Multi-channel sources are averaged down to one channel. Corrupt packets
/// are skipped; anything unrecoverable surfaces as a descriptive error.
pub fn load(path: &Path) -> Result<(Vec<f32>, u32), AugmentError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AugmentError::NoAudioTrack(path.to_path_buf()))?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1)
        .max(1);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;
        let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        for frame in sample_buf.samples().chunks(channels) {
            let sum: f32 = frame.iter().sum();
            samples.push(sum / frame.len() as f32);
        }
    }

    Ok((samples, sample_rate))
}

/// Resample mono samples from `from` Hz to `to` Hz with a windowed-sinc
/// resampler. Identity when the rates already match.
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, AugmentError> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to as f64 / from as f64,
        2.0,
        params,
        samples.len(),
        1,
    )?;

    let input = vec![samples.to_vec()];
    let output = resampler.process(&input, None)?;
    Ok(output.into_iter().next().unwrap_or_default())
}

/// Load a file, resample it to `target_sr` and return exactly `target_len`
/// samples: a uniform random crop of longer sources, or the whole source
/// zero-padded on the right when shorter.
pub fn load_crop<R: Rng>(
    path: &Path,
    target_sr: u32,
    target_len: usize,
    rng: &mut R,
) -> Result<Vec<f32>, AugmentError> {
    let (samples, sr) = load(path)?;
    let mut samples = resample(&samples, sr, target_sr)?;

    if samples.len() > target_len {
        let start = rng.random_range(0..=samples.len() - target_len);
        Ok(samples[start..start + target_len].to_vec())
    } else {
        samples.resize(target_len, 0.0);
        Ok(samples)
    }
}

/// Write mono samples as a 32-bit float WAV, for inspecting generated
/// pairs.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AugmentError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for s in samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn write_test_tone(path: &Path, sample_rate: u32, len: usize) {
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin()
            })
            .collect();
        write_wav(path, &samples, sample_rate).unwrap();
    }

    #[test]
    fn test_scan_is_sorted_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("nested")).unwrap();
        for name in ["b.WAV", "a.wav", "c.txt", "nested/d.FlAc"] {
            std::fs::write(root.join(name), b"stub").unwrap();
        }

        let files = scan_audio_files(root, AUDIO_EXTENSIONS);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.WAV", "d.FlAc"]);
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let files = scan_audio_files(Path::new("/nonexistent/noise-pool"), AUDIO_EXTENSIONS);
        assert!(files.is_empty());
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_tone(&path, 16000, 16000);

        let (samples, sr) = load(&path).unwrap();
        assert_eq!(sr, 16000);
        assert_eq!(samples.len(), 16000);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_load_crop_random_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.wav");
        write_test_tone(&path, 16000, 48000);

        let mut rng = StdRng::seed_from_u64(1);
        let crop = load_crop(&path, 16000, 16000, &mut rng).unwrap();
        assert_eq!(crop.len(), 16000);
    }

    #[test]
    fn test_load_crop_pads_short_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_test_tone(&path, 16000, 4000);

        let mut rng = StdRng::seed_from_u64(2);
        let crop = load_crop(&path, 16000, 16000, &mut rng).unwrap();
        assert_eq!(crop.len(), 16000);
        assert!(crop[4000..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_load_crop_resamples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hi-rate.wav");
        write_test_tone(&path, 48000, 48000);

        let mut rng = StdRng::seed_from_u64(3);
        let crop = load_crop(&path, 16000, 16000, &mut rng).unwrap();
        assert_eq!(crop.len(), 16000);
        assert!(crop.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"not really a wav file").unwrap();
        assert!(load(&path).is_err());
    }
}
