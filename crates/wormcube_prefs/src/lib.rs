//! User preferences.
//!
//! Preferences are layered from three sources, each overriding the last:
//!
//! 1. built-in defaults (`default.yaml`)
//! 2. the user preferences file in the platform config directory
//! 3. environment variables prefixed with `WORMCUBE_`, such as
//!    `WORMCUBE_CHAOS_LEVEL=2`

#[macro_use]
extern crate lazy_static;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use eyre::{OptionExt, Result};
use serde::{Deserialize, Serialize};
use wormcube_core::{ChaosLevel, MAX_SCRAMBLE_TWISTS, SUPPORTED_SIZES, ScrambleType};

const PREFS_FILE_NAME: &str = "wormcube";
const PREFS_FILE_EXTENSION: &str = "yaml";
const PREFS_FILE_FORMAT: config::FileFormat = config::FileFormat::Yaml;
const DEFAULT_PREFS_STR: &str = include_str!("default.yaml");
const ENV_PREFIX: &str = "WORMCUBE";

lazy_static! {
    /// Built-in default preferences.
    pub static ref DEFAULT_PREFS: Preferences =
        serde_norway::from_str(DEFAULT_PREFS_STR).unwrap_or_default();
    static ref PROJECT_DIRS: Option<ProjectDirs> = ProjectDirs::from("", "", "WORM3");
}

/// User preferences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Preferences {
    /// Number of layers along each axis of a new cube.
    pub cube_size: u8,
    /// Chaos level from 0 (off) to 4.
    pub chaos_level: u8,
    /// Explosion factor for drawing the cube spread apart.
    pub explosion: f32,
    /// Number of twists in a scramble, or `None` for a full scramble.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scramble_length: Option<u32>,
    /// Whether to write a log file for each session.
    pub record_log: bool,
    /// Directory for session log files. Defaults to the platform data
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}
impl Default for Preferences {
    fn default() -> Self {
        Self {
            cube_size: 3,
            chaos_level: 0,
            explosion: 0.0,
            scramble_length: None,
            record_log: false,
            log_dir: None,
        }
    }
}
impl Preferences {
    /// Loads preferences from the user preferences file and the environment.
    /// If loading fails, the default preferences are returned.
    pub fn load() -> Self {
        match prefs_file() {
            Ok(path) => Self::load_from(Some(&path)),
            Err(e) => {
                log::warn!("Error loading user preferences: {e}");
                Self::load_from(None)
            }
        }
    }

    /// Loads preferences from a specific user preferences file (which need
    /// not exist) and the environment. If loading fails, the default
    /// preferences are returned.
    pub fn load_from(user_prefs_file: Option<&Path>) -> Self {
        let mut config = config::Config::builder();

        // Load default preferences.
        let default_config_source = config::File::from_str(DEFAULT_PREFS_STR, PREFS_FILE_FORMAT);
        config = config.add_source(default_config_source);

        // Load user preferences.
        if let Some(path) = user_prefs_file {
            config = config.add_source(config::File::from(path).required(false));
        }

        // Load environment overrides.
        config = config.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let mut prefs = config
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .unwrap_or_else(|e| {
                log::warn!("Error loading preferences: {e}");
                DEFAULT_PREFS.clone()
            });
        prefs.validate();
        prefs
    }

    /// Saves preferences to the user preferences file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&prefs_file()?)
    }

    /// Saves preferences to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(p) = path.parent() {
            std::fs::create_dir_all(p)?;
        }
        serde_norway::to_writer(std::fs::File::create(path)?, self)?;
        Ok(())
    }

    /// Repairs invalid values, logging a warning for each one.
    pub fn validate(&mut self) {
        if !SUPPORTED_SIZES.contains(&self.cube_size) {
            let size = self
                .cube_size
                .clamp(*SUPPORTED_SIZES.start(), *SUPPORTED_SIZES.end());
            log::warn!("Unsupported cube size {}; using {size}", self.cube_size);
            self.cube_size = size;
        }
        if ChaosLevel::new(self.chaos_level).is_none() {
            let level = ChaosLevel::saturating(self.chaos_level).get();
            log::warn!("Invalid chaos level {}; using {level}", self.chaos_level);
            self.chaos_level = level;
        }
        if !(self.explosion.is_finite() && self.explosion >= 0.0) {
            log::warn!("Invalid explosion factor {}; using 0", self.explosion);
            self.explosion = 0.0;
        }
        if self.scramble_length == Some(0) {
            log::warn!("Scramble length 0 is not allowed; using a full scramble");
            self.scramble_length = None;
        }
        if let Some(n) = self.scramble_length.filter(|&n| n > MAX_SCRAMBLE_TWISTS) {
            log::warn!("Scramble length {n} is too long; using {MAX_SCRAMBLE_TWISTS}");
            self.scramble_length = Some(MAX_SCRAMBLE_TWISTS);
        }
    }

    /// Returns the chaos level.
    pub fn chaos_level(&self) -> ChaosLevel {
        ChaosLevel::saturating(self.chaos_level)
    }

    /// Returns the type of scramble to generate.
    pub fn scramble_type(&self) -> ScrambleType {
        match self.scramble_length {
            Some(n) => ScrambleType::Partial(n),
            None => ScrambleType::Full,
        }
    }

    /// Returns the directory for session log files.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("logs")),
        }
    }
}

fn project_dirs() -> Result<&'static ProjectDirs> {
    PROJECT_DIRS
        .as_ref()
        .ok_or_eyre("unable to get preferences file path")
}

/// Returns the path to the user preferences file.
pub fn prefs_file() -> Result<PathBuf> {
    let mut p = project_dirs()?.config_dir().to_owned();
    p.push(format!("{PREFS_FILE_NAME}.{PREFS_FILE_EXTENSION}"));
    Ok(p)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_prefs_match_yaml() {
        assert_eq!(*DEFAULT_PREFS, Preferences::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(Some(&dir.path().join("missing.yaml")));
        assert_eq!(prefs.cube_size, DEFAULT_PREFS.cube_size);
        assert!(SUPPORTED_SIZES.contains(&prefs.cube_size));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wormcube.yaml");
        let prefs = Preferences {
            cube_size: 5,
            scramble_length: Some(25),
            explosion: 0.5,
            ..Default::default()
        };
        prefs.save_to(&path).unwrap();

        let loaded = Preferences::load_from(Some(&path));
        assert_eq!(loaded.cube_size, 5);
        assert_eq!(loaded.scramble_length, Some(25));
        assert_eq!(loaded.explosion, 0.5);
        assert_eq!(loaded.scramble_type(), ScrambleType::Partial(25));
    }

    #[test]
    fn test_partial_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wormcube.yaml");
        std::fs::write(&path, "record_log: true\n").unwrap();
        let loaded = Preferences::load_from(Some(&path));
        assert!(loaded.record_log);
        assert_eq!(loaded.cube_size, DEFAULT_PREFS.cube_size);
    }

    #[test]
    fn test_validate() {
        let mut prefs = Preferences {
            cube_size: 9,
            chaos_level: 7,
            explosion: f32::NAN,
            scramble_length: Some(0),
            ..Default::default()
        };
        prefs.validate();
        assert_eq!(prefs.cube_size, 5);
        assert_eq!(prefs.chaos_level(), ChaosLevel::MAX);
        assert_eq!(prefs.explosion, 0.0);
        assert_eq!(prefs.scramble_type(), ScrambleType::Full);

        let mut prefs = Preferences {
            cube_size: 1,
            ..Default::default()
        };
        prefs.validate();
        assert_eq!(prefs.cube_size, 3);

        let mut prefs = Preferences {
            scramble_length: Some(u32::MAX),
            ..Default::default()
        };
        prefs.validate();
        assert_eq!(prefs.scramble_length, Some(MAX_SCRAMBLE_TWISTS));
    }
}
