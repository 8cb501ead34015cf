//! Audio probing
//!
//! Reads container and codec parameters from an uploaded asset without
//! decoding it. An asset symphonia cannot probe is treated as corrupt or
//! unsupported.

use std::io::Cursor;

use studio_core::domain::asset::AudioAsset;
use studio_core::domain::separate::SourceInfo;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::engine::EngineError;

/// Probes `asset` on the blocking pool
pub async fn probe_asset(asset: &AudioAsset) -> Result<SourceInfo, EngineError> {
    let filename = asset.filename.clone();
    let extension = asset.extension();
    let data = asset.data.clone();

    tokio::task::spawn_blocking(move || probe(&filename, extension.as_deref(), data))
        .await
        .map_err(|e| EngineError::Unavailable(format!("probe task failed: {e}")))?
}

fn probe(filename: &str, extension: Option<&str>, data: Vec<u8>) -> Result<SourceInfo, EngineError> {
    let rejected = || EngineError::Rejected(format!("unsupported or corrupt audio asset '{filename}'"));

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| {
            tracing::debug!("Probe of {} failed: {}", filename, e);
            rejected()
        })?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(rejected)?;

    let params = &track.codec_params;
    let format = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|descriptor| descriptor.short_name.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let duration_sec = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / f64::from(rate)),
        _ => None,
    };

    Ok(SourceInfo {
        format,
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count() as u16),
        duration_sec,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A short sine tone encoded as 16-bit PCM WAV
    pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let frames = (sample_rate as f32 * seconds) as u32;
            for n in 0..frames {
                let t = n as f32 / sample_rate as f32;
                let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16;
                for _ in 0..channels {
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_probe_reads_wav_parameters() {
        let asset = AudioAsset::new("song.wav", wav_bytes(48_000, 2, 0.5));
        let info = probe_asset(&asset).await.unwrap();

        assert_eq!(info.format, "pcm_s16le");
        assert_eq!(info.sample_rate, Some(48_000));
        assert_eq!(info.channels, Some(2));
        let duration = info.duration_sec.unwrap();
        assert!((duration - 0.5).abs() < 0.01, "duration {duration}");
    }

    #[tokio::test]
    async fn test_probe_rejects_garbage() {
        let asset = AudioAsset::new("song.wav", b"definitely not audio".to_vec());
        let err = probe_asset(&asset).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected(_)));
        assert!(err.public_message().contains("song.wav"));
    }
}
