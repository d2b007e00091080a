//! Trainer configuration, loaded from JSON.
//!
//! Every field has a default so a partial file (or none at all) is fine.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::ui::BoardLayout;

/// Engine process and search settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable, looked up on PATH when not absolute
    pub path: String,
    /// Fixed search depth for every best-move request
    pub search_depth: u32,
    /// Skill level (0-20) used when a game starts without an explicit level
    pub skill_level: u8,
    /// Extra UCI options sent during the handshake, as (name, value)
    pub options: Vec<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            search_depth: 15,
            skill_level: 10,
            options: Vec::new(),
        }
    }
}

/// Board geometry in pixels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BoardConfig {
    pub size: f32,
    pub padding: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: 480.0,
            padding: 20.0,
        }
    }
}

impl BoardConfig {
    pub fn layout(&self) -> BoardLayout {
        BoardLayout::new(self.size, self.padding)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrainerConfig {
    pub engine: EngineConfig,
    pub board: BoardConfig,
}

impl TrainerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema_json() -> Result<String, ConfigError> {
        let schema = schemars::schema_for!(TrainerConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.engine.search_depth, 15);
        assert_eq!(config.engine.skill_level, 10);
        assert_eq!(config.engine.path, "stockfish");
        assert_eq!(config.board.layout(), BoardLayout::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = TrainerConfig::from_json(r#"{ "engine": { "search_depth": 8 } }"#).unwrap();
        assert_eq!(config.engine.search_depth, 8);
        assert_eq!(config.engine.skill_level, 10);
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn test_options_as_pairs() {
        let config =
            TrainerConfig::from_json(r#"{ "engine": { "options": [["Threads", "4"]] } }"#).unwrap();
        assert_eq!(
            config.engine.options,
            vec![("Threads".to_string(), "4".to_string())]
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TrainerConfig::from_json("{ engine: 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = TrainerConfig::load(Path::new("/nonexistent/blindfold.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_json_round_trip_and_schema() {
        let config = TrainerConfig::default();
        let text = config.to_json().unwrap();
        assert_eq!(TrainerConfig::from_json(&text).unwrap(), config);

        let schema = TrainerConfig::schema_json().unwrap();
        assert!(schema.contains("search_depth"));
        assert!(schema.contains("padding"));
        // only configuration types belong in the schema
        for name in ["Theme", "PieceColor", "Orientation"] {
            assert!(!schema.contains(name), "{}", name);
        }
    }
}
