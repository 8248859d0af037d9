use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::RecvTimeoutError;

use qbeat::audio;
use qbeat::config;
use qbeat::loader::sample_loader::ThreadedLoader;
use qbeat::{DeadlineTimer, EventSink, Middle, PlaybackController, Sound, SystemClock, UiEvent};

// how long to wait on the loader when no tick is armed
const IDLE_WAIT: Duration = Duration::from_millis(50);

const USAGE: &str =
    "usage: qbeat [PROJECT] [SOUND.wav ...] [--bpm N] [--tacts N] [--ticks N] [--config DIR]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    project: Option<PathBuf>,
    sounds: Vec<String>,
    config_dir: Option<PathBuf>,
    bpm: Option<f32>,
    tacts: Option<usize>,
    ticks: Option<u64>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next().with_context(|| format!("{flag} needs a value\n{USAGE}"))
        };
        match arg.as_str() {
            "--bpm" => parsed.bpm = Some(value("--bpm")?.parse().context("--bpm")?),
            "--tacts" => parsed.tacts = Some(value("--tacts")?.parse().context("--tacts")?),
            "--ticks" => parsed.ticks = Some(value("--ticks")?.parse().context("--ticks")?),
            "--config" => parsed.config_dir = Some(PathBuf::from(value("--config")?)),
            "-h" | "--help" => anyhow::bail!(USAGE),
            flag if flag.starts_with("--") => anyhow::bail!("unknown option {flag}\n{USAGE}"),
            // the first non-wav positional is the project, everything else is a sound to add
            path if parsed.project.is_none() && !path.to_ascii_lowercase().ends_with(".wav") => {
                parsed.project = Some(PathBuf::from(path));
            }
            path => parsed.sounds.push(path.to_string()),
        }
    }
    Ok(parsed)
}

// No UI here: what a window would draw goes to the log instead.
struct LogSink;

impl<S: Sound> EventSink<S> for LogSink {
    fn draw_sound(&mut self, row: usize, sound: &S) {
        log::info!("row {row}: {}", sound.source());
    }

    fn refresh_view(&mut self) {
        log::debug!("view refreshed");
    }

    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
    }
}

fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_default(),
    };
    let mut settings = config::load_config(&config_dir)?;
    if let Some(bpm) = args.bpm {
        settings.bpm = bpm;
    }
    if let Some(tacts) = args.tacts {
        settings.tact_count = tacts;
    }

    let audio = audio::start_audio()?;
    let (loader, completions) = ThreadedLoader::spawn(audio.sender(), audio.sample_rate())?;
    let timer = DeadlineTimer::default();
    let player = PlaybackController::new(timer.clone(), SystemClock, &settings)?;
    let mut middle = Middle::new(player, loader, LogSink);

    if let Some(project) = &args.project {
        middle.handle_event(UiEvent::LoadProject(project.clone()));
    }
    for sound in &args.sounds {
        middle.handle_event(UiEvent::AddSound(sound.clone()));
    }

    let mut ticks = 0u64;
    let mut started = false;
    loop {
        // start once every queued sound has landed one way or the other
        if !started && middle.pending_loads() == 0 {
            middle.handle_event(UiEvent::ResetCursor);
            middle.handle_event(UiEvent::TurnOn);
            started = true;
            ticks += 1;
        }
        if args.ticks.is_some_and(|limit| ticks >= limit) {
            break;
        }

        let wait = timer.remaining(Instant::now()).unwrap_or(IDLE_WAIT);
        match completions.recv_timeout(wait) {
            Ok(done) => {
                middle.on_resolved(done.handle, done.outcome);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => anyhow::bail!("loader thread stopped"),
        }

        if timer.take_due(Instant::now()) && middle.tick() {
            ticks += 1;
        }
    }

    middle.handle_event(UiEvent::TurnOff);
    log::info!("stopped after {ticks} ticks");
    Ok(())
}
