// Startup settings, read from <dir>/.qbeat/config.json when it exists.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::shared::{DEFAULT_BPM, DEFAULT_TACT_COUNT, DEFAULT_VOLUME, TimeSignature};

const QBEAT_DIR: &str = ".qbeat";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub bpm: f32,
    pub time_signature: TimeSignature,
    pub tact_count: usize,
    pub volume: f32, // 0.0 to 1.0
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            time_signature: TimeSignature::default(),
            tact_count: DEFAULT_TACT_COUNT,
            volume: DEFAULT_VOLUME,
        }
    }
}

// <dir>/.qbeat/config.json
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(QBEAT_DIR).join(CONFIG_FILE)
}

/// Missing file means defaults; a file that exists but doesn't parse is an error.
pub fn load_config(dir: &Path) -> anyhow::Result<SequencerConfig> {
    let path = config_file_path(dir);
    if !path.exists() {
        return Ok(SequencerConfig::default());
    }
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("malformed config {}", path.display()))
}

pub fn save_config(dir: &Path, config: &SequencerConfig) -> anyhow::Result<()> {
    let path = config_file_path(dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .qbeat/ if needed
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
