use crate::emoji::EmojiPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Number of ranked rows returned when nothing else is configured
pub const DEFAULT_TOP_N: usize = 10;

/// Progress update interval (tick every N lines)
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Read buffer for input streams
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Write buffer for CSV result files
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Emoji matching policy shared by both strategies.
/// Each matching code point is its own token; `"😊😊"` counts 😊 twice.
pub const EMOJI_POLICY: EmojiPolicy = EmojiPolicy::CodePoint;

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_FILE: &str = "poststats.json";

/// Optional settings loaded from a JSON file. Every field can be overridden on
/// the command line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<String>,
    pub output_dir: Option<String>,
    pub top_n: Option<usize>,
    pub emoji_policy: Option<EmojiPolicy>,
}

impl FileConfig {
    /// Missing file yields defaults; a file that exists but cannot be read or
    /// decoded is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
