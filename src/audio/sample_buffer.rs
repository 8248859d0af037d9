use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // decoded frames at the engine's rate
}

impl SampleBuffer {
    /// Decode a WAV into stereo frames at `target_rate`. Mono is duplicated to both sides,
    /// extra channels past the second are dropped.
    pub fn load_wav(path: &Path, target_rate: u32, target_channels: u16) -> anyhow::Result<Self> {
        if target_channels != 2 {
            anyhow::bail!("only stereo output is supported, got {target_channels} channels");
        }

        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("not a readable WAV: {}", path.display()))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            anyhow::bail!("WAV declares zero channels");
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| StereoFrame {
                left: c[0],
                right: if channels > 1 { c[1] } else { c[0] },
            })
            .collect();

        Ok(Self {
            data: resample_linear(&frames, spec.sample_rate, target_rate),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// linear interpolation between neighbouring frames, good enough for one-shot drum hits
fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames[frames.len() - 1];

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx + 1 >= frames.len() {
                return last;
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn write_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn mono_is_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 44100, &[16384, -16384]);
        let buf = SampleBuffer::load_wav(&path, 44100, 2).unwrap();
        assert_eq!(buf.len(), 2);
        assert_relative_eq!(buf.data[0].left, 0.5);
        assert_relative_eq!(buf.data[0].right, 0.5);
        assert_relative_eq!(buf.data[1].left, -0.5);
    }

    #[test]
    fn stereo_keeps_sides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 44100, &[16384, 0, 0, -16384]);
        let buf = SampleBuffer::load_wav(&path, 44100, 2).unwrap();
        assert_eq!(buf.data, vec![
            StereoFrame { left: 0.5, right: 0.0 },
            StereoFrame { left: 0.0, right: -0.5 },
        ]);
    }

    #[test]
    fn rate_mismatch_is_resampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.wav");
        write_wav(&path, 1, 22050, &[0; 100]);
        let buf = SampleBuffer::load_wav(&path, 44100, 2).unwrap();
        assert_eq!(buf.len(), 200);
    }

    #[test]
    fn resampling_interpolates() {
        let frames = [StereoFrame { left: 0.0, right: 0.0 }, StereoFrame { left: 1.0, right: 1.0 }];
        let out = resample_linear(&frames, 1, 2);
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[1].left, 0.5);
        assert_relative_eq!(out[3].left, 1.0);
    }

    #[test]
    fn mono_output_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.wav");
        write_wav(&path, 1, 44100, &[0; 4]);
        assert!(SampleBuffer::load_wav(&path, 44100, 1).is_err());
    }
}
