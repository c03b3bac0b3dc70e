// ============================================
// Core Module - Конфигурация движка
// ============================================

mod config;

pub use config::{EngineConfig, ConfigError, DEFAULT_SEED, REGION_DIR_NAME, CONFIG_FILE};
