// ============================================
// World Metadata - metadata.json мира
// ============================================
// Сид, точка спавна и время мира. Лежит рядом с папкой region.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_SEED;

use super::error::SaveError;

/// Имя файла метаданных в папке мира
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMetadata {
    /// Сид генератора
    pub seed: u64,
    /// Точка спавна
    pub spawn: [f32; 3],
    /// Время мира в тиках
    pub world_time: u64,
    pub gamemode: String,
    pub difficulty: String,
    pub gamerules: BTreeMap<String, String>,
    /// Unix-время создания мира (секунды)
    pub created_at: u64,
    /// Unix-время последнего сохранения (секунды)
    pub last_saved: u64,
}

impl WorldMetadata {
    pub fn new(seed: u64) -> Self {
        let mut gamerules = BTreeMap::new();
        gamerules.insert("doDaylightCycle".to_string(), "true".to_string());
        gamerules.insert("doMobSpawning".to_string(), "true".to_string());
        Self {
            seed,
            spawn: [0.0, 64.0, 0.0],
            world_time: 0,
            gamemode: "survival".to_string(),
            difficulty: "normal".to_string(),
            gamerules,
            created_at: unix_now(),
            last_saved: 0,
        }
    }

    /// Прочитать metadata.json; None если файла нет
    pub fn load(world_dir: &Path) -> Result<Option<Self>, SaveError> {
        let path = world_dir.join(METADATA_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let metadata: WorldMetadata = serde_json::from_str(&content)?;
        log::info!("Loaded world metadata (seed {})", metadata.seed);
        Ok(Some(metadata))
    }

    /// Записать через временный файл, обновив last_saved
    pub fn save(&mut self, world_dir: &Path) -> Result<(), SaveError> {
        self.last_saved = unix_now();
        let json = serde_json::to_string_pretty(self)?;
        let path = world_dir.join(METADATA_FILE);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Saved world metadata to {}", path.display());
        Ok(())
    }
}

impl Default for WorldMetadata {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
