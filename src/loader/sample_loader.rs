// Loads WAVs off the sequencer's thread.
//
// One worker decodes requests in the order they were submitted, registers each decoded
// buffer with the audio engine, then posts a Completion. The sequencer drains the completion
// channel on its own thread, so the beat map is only ever touched there. FIFO matters: a
// restored project gets its rows back in file order.

use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use super::admission::{LoadHandle, LoadOutcome};
use super::{Completion, LoadError, Loader};
use crate::audio::{SampleBuffer, SampleId, SampleSound, next_sample_id};
use crate::audio_api::AudioCommand;

struct Job {
    handle: LoadHandle,
    path: String,
}

pub struct ThreadedLoader {
    jobs: Sender<Job>,
    _worker: JoinHandle<()>,
}

impl ThreadedLoader {
    pub fn spawn(
        audio_tx: Sender<AudioCommand>,
        sample_rate: u32,
    ) -> anyhow::Result<(Self, Receiver<Completion<SampleSound>>)> {
        let (jobs_tx, jobs_rx) = crossbeam_channel::unbounded::<Job>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<Completion<SampleSound>>();

        let worker = std::thread::Builder::new()
            .name("qbeat-loader".into())
            .spawn(move || {
                for job in jobs_rx {
                    let outcome = match resolve(job.path, sample_rate, &audio_tx) {
                        Ok(sound) => LoadOutcome::Ready(sound),
                        Err(e) => LoadOutcome::Error(e),
                    };
                    if done_tx.send(Completion { handle: job.handle, outcome }).is_err() {
                        break; // nobody is listening anymore
                    }
                }
            })?;

        Ok((Self { jobs: jobs_tx, _worker: worker }, done_rx))
    }
}

impl Loader for ThreadedLoader {
    type Sound = SampleSound;

    fn begin(&mut self, handle: LoadHandle, path: &str) {
        let job = Job { handle, path: path.to_string() };
        if self.jobs.send(job).is_err() {
            log::error!(
                target: "qbeat::loader",
                "loader thread is gone, {:?} will never resolve",
                handle
            );
        }
    }
}

// Decode, then register with the engine. Registration is queued ahead of any trigger
// for this id; a sound whose buffer never reached the engine is a failed load.
fn resolve(
    path: String,
    sample_rate: u32,
    audio_tx: &Sender<AudioCommand>,
) -> Result<SampleSound, LoadError> {
    let (id, buffer) = load(Path::new(&path), sample_rate)?;
    if audio_tx.send(AudioCommand::RegisterSample { id, buffer }).is_err() {
        return Err(LoadError::Unsupported {
            path: path.into(),
            detail: "audio engine stopped".into(),
        });
    }
    Ok(SampleSound::new(id, path, audio_tx.clone()))
}

// Load a WAV from disk, prepare for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> Result<(SampleId, SampleBuffer), LoadError> {
    std::fs::metadata(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let buffer = SampleBuffer::load_wav(path, target_rate, 2).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;
    if buffer.data.is_empty() {
        return Err(LoadError::Unsupported {
            path: path.to_path_buf(),
            detail: "no audio frames".into(),
        });
    }
    Ok((next_sample_id(), buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::Sound;
    use crate::loader::admission::LoadAdmissionQueue;
    use std::time::Duration;

    fn write_wav(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            w.write_sample(((i % 100) as i16) * 100).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/definitely/not/here.wav"), 44100).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.wav"));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, b"this is not a riff header").unwrap();
        let err = load(&path, 44100).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(err.to_string().contains("junk.wav"));
    }

    #[test]
    fn worker_registers_and_resolves_in_submit_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("hat.wav");
        write_wav(&good, 512);
        let bad = dir.path().join("gone.wav");

        let (audio_tx, audio_rx) = crossbeam_channel::unbounded();
        let (loader, done) = ThreadedLoader::spawn(audio_tx, 44100).unwrap();
        let mut queue = LoadAdmissionQueue::new(loader);
        let h_good = queue.submit(good.to_str().unwrap(), None).unwrap();
        let h_bad = queue.submit(bad.to_str().unwrap(), None).unwrap();

        let first = done.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = done.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.handle, h_good);
        assert_eq!(second.handle, h_bad);

        match first.outcome {
            LoadOutcome::Ready(sound) => assert_eq!(sound.source(), good.to_str().unwrap()),
            LoadOutcome::Error(e) => panic!("unexpected error {e}"),
        }
        assert!(matches!(second.outcome, LoadOutcome::Error(LoadError::Io { .. })));

        match audio_rx.try_recv().unwrap() {
            AudioCommand::RegisterSample { buffer, .. } => assert_eq!(buffer.data.len(), 512),
            other => panic!("expected registration, got {other:?}"),
        }
    }

    #[test]
    fn stopped_engine_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick.wav");
        write_wav(&path, 64);
        let (audio_tx, audio_rx) = crossbeam_channel::unbounded();
        drop(audio_rx);

        let err = resolve(path.to_str().unwrap().to_string(), 44100, &audio_tx).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported { .. }));
        assert!(err.to_string().contains("kick.wav"));
        assert!(err.to_string().contains("audio engine stopped"));
    }
}
