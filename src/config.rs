use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::console::console_warn;
use crate::pos::Pos;

const EMBEDDED: &str = include_str!("../assets/greeting.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lock: LockConfig,
    pub slideshow: SlideshowConfig,
    pub confetti: ConfettiConfig,
    pub audio: AudioConfig,
    pub assets: AssetPaths,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub collision_threshold: f32,
    /// Where the key sits at start and after a reset, relative to the lock.
    pub key_start: Pos,
    pub drag_limit: f32,
    pub grab_radius: f32,
    pub reveal_delay_ms: u64,
    pub unlocked_angle: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            collision_threshold: 50.0,
            key_start: Pos::new(150.0, 50.0),
            drag_limit: 150.0,
            grab_radius: 40.0,
            reveal_delay_ms: 800,
            unlocked_angle: 90.0,
            spring_stiffness: 100.0,
            spring_damping: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlideshowConfig {
    pub image_count: usize,
    pub image_period_ms: u64,
    pub clock_step_ms: u64,
    pub lyric_group_size: usize,
    /// Added to the last lyric's start to estimate the song length without audio.
    pub fallback_tail_ms: u64,
    pub lantern_threshold_ms: u64,
    pub lantern_count: usize,
    pub lantern_padding: f32,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            image_count: 7,
            image_period_ms: 5000,
            clock_step_ms: 100,
            lyric_group_size: 3,
            fallback_tail_ms: 3000,
            lantern_threshold_ms: 41000,
            lantern_count: 20,
            lantern_padding: 60.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    pub particle_count: usize,
    pub spread_degrees: f32,
    /// Burst origin as a fraction of the window height, measured from the top.
    pub origin_y: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            spread_degrees: 70.0,
            origin_y: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub volume: f32,
    pub loop_music: bool,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            loop_music: true,
            muted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub root: String,
    pub unlock_sound: String,
    pub music: String,
    pub images_dir: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            unlock_sound: "audio/unlock.wav".to_string(),
            music: "audio/song.wav".to_string(),
            images_dir: "images".to_string(),
        }
    }
}

impl AssetPaths {
    pub fn resolve(&self, relative: &str) -> String {
        if self.root.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.root.trim_end_matches('/'), relative)
        }
    }

    /// Images are numbered from 1.
    pub fn image(&self, index: usize) -> String {
        self.resolve(&format!("{}/{}.jpg", self.images_dir, index + 1))
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// The defaults compiled into the binary.
    pub fn embedded() -> Config {
        Self::from_yaml(EMBEDDED).unwrap_or_else(|err| {
            console_warn!("embedded config rejected, using built-in defaults: {}", err);
            Config::default()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let lock = &self.lock;
        if !positive(lock.collision_threshold) {
            return Err(ConfigError::Invalid("lock.collision_threshold must be positive"));
        }
        if !positive(lock.drag_limit) {
            return Err(ConfigError::Invalid("lock.drag_limit must be positive"));
        }
        if !positive(lock.grab_radius) {
            return Err(ConfigError::Invalid("lock.grab_radius must be positive"));
        }
        if !(lock.key_start.x.is_finite() && lock.key_start.y.is_finite()) {
            return Err(ConfigError::Invalid("lock.key_start must be finite"));
        }
        if ![lock.unlocked_angle, lock.spring_stiffness, lock.spring_damping]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::Invalid("lock rotation settings must be finite"));
        }
        if self.slideshow.image_count == 0 {
            return Err(ConfigError::Invalid("slideshow.image_count must be at least 1"));
        }
        if self.slideshow.image_period_ms == 0 || self.slideshow.clock_step_ms == 0 {
            return Err(ConfigError::Invalid("slideshow timer periods must be non-zero"));
        }
        if self.slideshow.lyric_group_size == 0 {
            return Err(ConfigError::Invalid("slideshow.lyric_group_size must be at least 1"));
        }
        let padding = self.slideshow.lantern_padding;
        if !(padding.is_finite() && padding >= 0.0) {
            return Err(ConfigError::Invalid("slideshow.lantern_padding must be finite and non-negative"));
        }
        if !(self.confetti.spread_degrees.is_finite() && self.confetti.origin_y.is_finite()) {
            return Err(ConfigError::Invalid("confetti settings must be finite"));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::Invalid("audio.volume must lie in 0..=1"));
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_matches_defaults() {
        assert_eq!(Config::from_yaml(EMBEDDED).unwrap(), Config::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("lock:\n  collision_threshold: 30.0\naudio:\n  muted: true\n")
            .unwrap();
        assert_eq!(config.lock.collision_threshold, 30.0);
        assert_eq!(config.lock.key_start, Pos::new(150.0, 50.0));
        assert!(config.audio.muted);
        assert_eq!(config.slideshow, SlideshowConfig::default());
    }

    #[test]
    fn rejects_zero_images() {
        let err = Config::from_yaml("slideshow:\n  image_count: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_nan_and_infinite_lengths() {
        for yaml in [
            "lock:\n  collision_threshold: .nan\n",
            "lock:\n  drag_limit: .nan\n",
            "lock:\n  drag_limit: .inf\n",
            "lock:\n  grab_radius: .nan\n",
            "lock:\n  grab_radius: 0.0\n",
            "slideshow:\n  lantern_padding: .nan\n",
            "slideshow:\n  lantern_padding: -1.0\n",
        ] {
            let err = Config::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{}", yaml);
        }
    }

    #[test]
    fn zero_lantern_padding_is_allowed() {
        let config = Config::from_yaml("slideshow:\n  lantern_padding: 0.0\n").unwrap();
        assert_eq!(config.slideshow.lantern_padding, 0.0);
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = Config::from_yaml("lock: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn image_paths_are_one_based() {
        let paths = AssetPaths::default();
        assert_eq!(paths.image(0), "assets/images/1.jpg");
        assert_eq!(paths.image(6), "assets/images/7.jpg");
        let bare = AssetPaths {
            root: String::new(),
            ..AssetPaths::default()
        };
        assert_eq!(bare.resolve("audio/song.wav"), "audio/song.wav");
    }
}
