//! Configuration for the reminder board
//!
//! A single TOML bootstrap file, read once at startup. Every value has a
//! built-in default, so a missing file (or an empty one) gives the stock
//! board: one 20 minute reminder on the `piam` category at volume 0.7, and
//! the built-in sound library.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--config, --sound-root)
//! 2. Environment variables (CHIME_CONFIG, CHIME_SOUND_ROOT)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::board::BoardSettings;
use crate::error::{Error, Result};
use crate::library::{ClipRef, SoundCategory, SoundLibrary};
use crate::playback::PlayerSettings;
use crate::reminders::SlotConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Folder the clip paths are relative to (optional)
    ///
    /// If not specified, falls back to environment → OS data dir
    #[serde(default)]
    pub sound_root: Option<PathBuf>,

    /// Board defaults and player timing
    #[serde(default)]
    pub board: BoardConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sound categories; the built-in library is used when empty
    #[serde(default)]
    pub sound_library: BTreeMap<String, CategoryConfig>,
}

/// `[board]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Duration of newly added reminders, in decimal minutes
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: f64,

    /// Volume of newly added reminders (0.0-1.0)
    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// Category of newly added reminders
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Reminders present at startup
    #[serde(default = "default_initial_reminders")]
    pub initial_reminders: usize,

    /// Player progress refresh period
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Delay before the player view returns to idle after a clip ends
    #[serde(default = "default_idle_reset_delay_ms")]
    pub idle_reset_delay_ms: u64,

    /// Artwork shown when nothing plays
    #[serde(default = "default_idle_vinyl")]
    pub idle_vinyl: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
            default_volume: default_volume(),
            default_category: default_category(),
            initial_reminders: default_initial_reminders(),
            progress_interval_ms: default_progress_interval_ms(),
            idle_reset_delay_ms: default_idle_reset_delay_ms(),
            idle_vinyl: default_idle_vinyl(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// `[sound_library.<key>]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Label shown in the dropdown and player; defaults to the key
    #[serde(default)]
    pub display_name: Option<String>,

    /// Vinyl artwork for the category
    #[serde(default)]
    pub vinyl: Option<String>,

    /// Clip paths relative to the sound root
    #[serde(default)]
    pub clips: Vec<String>,
}

fn default_duration_minutes() -> f64 {
    20.0
}

fn default_volume() -> f32 {
    0.7
}

fn default_category() -> String {
    "piam".to_string()
}

fn default_initial_reminders() -> usize {
    1
}

fn default_progress_interval_ms() -> u64 {
    100
}

fn default_idle_reset_delay_ms() -> u64 {
    2000
}

fn default_idle_vinyl() -> String {
    "disque/p.iam.png".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = chime_common::config::read_config_file(path)?;
        let config = Self::parse(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the board cannot run with
    pub fn validate(&self) -> Result<()> {
        let board = &self.board;
        if !board.default_duration_minutes.is_finite() || board.default_duration_minutes <= 0.0 {
            return Err(Error::Config(format!(
                "board.default_duration_minutes must be positive, got {}",
                board.default_duration_minutes
            )));
        }
        if !(0.0..=1.0).contains(&board.default_volume) {
            return Err(Error::Config(format!(
                "board.default_volume must be within 0.0-1.0, got {}",
                board.default_volume
            )));
        }
        if board.progress_interval_ms == 0 {
            return Err(Error::Config(
                "board.progress_interval_ms must be at least 1".to_string(),
            ));
        }

        let library = self.library();
        if !library.contains(&board.default_category) {
            let known: Vec<&str> = library.keys().collect();
            return Err(Error::Config(format!(
                "board.default_category '{}' is not in the sound library (known: {})",
                board.default_category,
                known.join(", ")
            )));
        }
        Ok(())
    }

    /// Sound library described by the file, or the built-in one
    pub fn library(&self) -> SoundLibrary {
        if self.sound_library.is_empty() {
            return SoundLibrary::builtin();
        }

        let mut library = SoundLibrary::new();
        for (key, category) in &self.sound_library {
            library.insert(SoundCategory {
                key: key.clone(),
                display_name: category.display_name.clone().unwrap_or_else(|| key.clone()),
                vinyl: category
                    .vinyl
                    .clone()
                    .unwrap_or_else(|| self.board.idle_vinyl.clone()),
                clips: category.clips.iter().map(ClipRef::new).collect(),
            });
        }
        library
    }

    /// Board settings derived from the `[board]` table
    pub fn settings(&self) -> BoardSettings {
        let board = &self.board;
        BoardSettings {
            defaults: SlotConfig {
                duration_minutes: board.default_duration_minutes,
                category: board.default_category.clone(),
                volume: board.default_volume,
            },
            player: PlayerSettings {
                progress_interval: Duration::from_millis(board.progress_interval_ms),
                idle_reset_delay: Duration::from_millis(board.idle_reset_delay_ms),
                idle_vinyl: board.idle_vinyl.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert_eq!(config.sound_root, None);
        assert_eq!(config.board.initial_reminders, 1);
        assert_eq!(config.logging.level, "info");

        let settings = config.settings();
        assert_eq!(settings, BoardSettings::default());
        assert_eq!(config.library().len(), 2);
    }

    #[test]
    fn test_custom_library_and_board() {
        let config = TomlConfig::parse(
            r#"
            sound_root = "/srv/sounds"

            [board]
            default_duration_minutes = 0.5
            default_category = "bells"
            progress_interval_ms = 250

            [sound_library.bells]
            display_name = "Bells"
            clips = ["bells/a.ogg", "bells/b.ogg"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sound_root, Some(PathBuf::from("/srv/sounds")));
        let library = config.library();
        assert_eq!(library.len(), 1);
        let bells = library.get("bells").unwrap();
        assert_eq!(bells.display_name, "Bells");
        assert_eq!(bells.vinyl, "disque/p.iam.png");
        assert_eq!(bells.clips.len(), 2);

        let settings = config.settings();
        assert_eq!(settings.defaults.total_seconds(), 30);
        assert_eq!(settings.player.progress_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_default_category_must_exist() {
        let result = TomlConfig::parse(
            r#"
            [board]
            default_category = "missing"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        for text in [
            "[board]\ndefault_duration_minutes = 0.0",
            "[board]\ndefault_volume = 1.5",
            "[board]\nprogress_interval_ms = 0",
            "[board]\nunknown_key = 1",
            "not toml at all =",
        ] {
            assert!(
                matches!(TomlConfig::parse(text), Err(Error::Config(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = TomlConfig::load(&dir.path().join("absent.toml"));
        assert!(result.is_err());
    }
}
