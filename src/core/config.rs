// ============================================
// Engine Config - Настройки движка чанков
// ============================================
// Загружается из JSON, все поля имеют значения по умолчанию

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Сид мира по умолчанию
pub const DEFAULT_SEED: u64 = 12345;

/// Подпапка мира с регион-файлами
pub const REGION_DIR_NAME: &str = "region";

/// Имя конфига рядом с бинарником
pub const CONFIG_FILE: &str = "engine.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Внешние настройки: дальность прогрузки, автосохранение, сжатие, бюджет света
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Имя мира (папка внутри save_directory)
    pub world_name: String,
    /// Корневая папка сохранений
    pub save_directory: PathBuf,
    /// Сид для нового мира (у существующего берётся из metadata.json)
    pub seed: u64,
    /// Радиус прогрузки в чанках
    pub render_distance: i32,
    /// Включено ли автосохранение
    pub autosave_enabled: bool,
    /// Интервал автосохранения в секундах
    pub autosave_interval_secs: f32,
    /// Уровень ZSTD сжатия (1-22)
    pub compression_level: i32,
    /// Максимум операций света за тик
    pub light_updates_per_tick: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_name: "world".to_string(),
            save_directory: PathBuf::from("saves"),
            seed: DEFAULT_SEED,
            render_distance: 8,
            autosave_enabled: true,
            autosave_interval_secs: 300.0,
            compression_level: 3,
            light_updates_per_tick: 1000,
        }
    }
}

impl EngineConfig {
    /// Разобрать конфиг из JSON строки
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Загрузить конфиг из файла (нет файла = значения по умолчанию)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance must not be negative, got {}",
                self.render_distance
            )));
        }
        if !(self.autosave_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "autosave_interval_secs must be positive, got {}",
                self.autosave_interval_secs
            )));
        }
        if self.light_updates_per_tick == 0 {
            return Err(ConfigError::Invalid("light_updates_per_tick must be positive".to_string()));
        }
        Ok(())
    }

    /// Папка конкретного мира
    pub fn world_directory(&self) -> PathBuf {
        self.save_directory.join(&self.world_name)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs_f32(self.autosave_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.autosave_interval(), Duration::from_secs(300));
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.light_updates_per_tick, 1000);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "world_name": "alpha", "render_distance": 4 }"#).unwrap();
        assert_eq!(config.world_name, "alpha");
        assert_eq!(config.render_distance, 4);
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.world_directory(), PathBuf::from("saves").join("alpha"));
    }

    #[test]
    fn test_rejects_bad_compression_level() {
        let err = EngineConfig::from_json(r#"{ "compression_level": 40 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("voxel_engine_missing_config_7781.json");
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
