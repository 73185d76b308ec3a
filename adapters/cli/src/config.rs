//! Optional TOML configuration merged with command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use reflex_arcade_core::{Surface, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use reflex_arcade_persistence::DEFAULT_FILE_NAME;
use serde::Deserialize;

/// Seed used when neither the flags nor the config file provide one.
pub(crate) const DEFAULT_SEED: u64 = 0x5eed_0fa4_c4de;

/// Settings read from the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArcadeConfig {
    /// Seed for target placement.
    pub(crate) seed: Option<u64>,
    /// Location of the best-score record.
    pub(crate) scores_path: Option<PathBuf>,
    /// Playing surface dimensions.
    pub(crate) surface: SurfaceConfig,
    /// Autoplay behaviour.
    pub(crate) bot: BotConfig,
}

/// Surface dimensions in surface units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SurfaceConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
        }
    }
}

impl SurfaceConfig {
    pub(crate) fn to_surface(self) -> Surface {
        Surface::new(self.width, self.height)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                bail!("surface {name} must be a positive finite number, got {value}");
            }
        }
        Ok(())
    }
}

/// Tuning for the autoplay bot.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BotConfig {
    /// Probability that the bot reacts to a scoring target in time.
    pub(crate) accuracy: f64,
    /// Probability that the bot recognises and skips a penalty target.
    pub(crate) discipline: f64,
    /// Average delay between a target appearing and the bot clicking it.
    pub(crate) reaction_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            accuracy: 0.85,
            discipline: 0.8,
            reaction_ms: 350,
        }
    }
}

impl BotConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [("accuracy", self.accuracy), ("discipline", self.discipline)] {
            if !(0.0..=1.0).contains(&value) {
                bail!("bot {name} must lie within 0..=1, got {value}");
            }
        }
        Ok(())
    }
}

impl ArcadeConfig {
    /// Loads the configuration at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid config toml")?;
        config.surface.validate()?;
        config.bot.validate()?;
        Ok(config)
    }

    /// Resolves the best-score path, preferring `flag` over the file setting.
    pub(crate) fn scores_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.scores_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME))
    }

    /// Resolves the seed, preferring `flag` over the file setting.
    pub(crate) fn seed(&self, flag: Option<u64>) -> u64 {
        flag.or(self.seed).unwrap_or(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ArcadeConfig::parse("").expect("empty config");
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.seed(None), DEFAULT_SEED);
        assert_eq!(config.scores_path(None), PathBuf::from(DEFAULT_FILE_NAME));
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = ArcadeConfig::parse(
            r#"
            seed = 7
            scores_path = "saves/best.json"

            [surface]
            width = 800.0

            [bot]
            reaction_ms = 200
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed(None), 7);
        assert_eq!(config.seed(Some(9)), 9);
        assert_eq!(config.surface.width, 800.0);
        assert_eq!(config.surface.height, DEFAULT_SURFACE_HEIGHT);
        assert_eq!(config.bot.reaction_ms, 200);
        assert_eq!(config.bot.accuracy, BotConfig::default().accuracy);
        assert_eq!(config.scores_path(None), PathBuf::from("saves/best.json"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ArcadeConfig::parse("colour = \"red\"").is_err());
    }

    #[test]
    fn out_of_range_probabilities_are_rejected() {
        let error = ArcadeConfig::parse("[bot]\naccuracy = 1.5").expect_err("invalid");
        assert!(error.to_string().contains("accuracy"));
    }

    #[test]
    fn unusable_surface_dimensions_are_rejected() {
        for contents in [
            "[surface]\nwidth = inf",
            "[surface]\nheight = nan",
            "[surface]\nwidth = -10.0",
        ] {
            let error = ArcadeConfig::parse(contents).expect_err("invalid surface");
            assert!(error.to_string().contains("surface"), "{error}");
        }
    }
}
