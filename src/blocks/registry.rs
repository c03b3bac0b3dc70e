// ============================================
// Block Registry - Data-Driven из JSON
// ============================================
// Единый источник правды для всех блоков.
// Передаётся явно по ссылке, без глобального состояния.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::definition::{BlockDefinition, BlocksFile, FaceTextures, TintKind};
use super::types::{BlockId, AIR};

/// Встроенный набор блоков
const DEFAULT_BLOCKS_JSON: &str = include_str!("../../assets/blocks/default_blocks.json");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read blocks file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse blocks JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Реестр блоков: плотная таблица по numeric ID
pub struct BlockRegistry {
    /// Блоки по numeric ID (индекс = id)
    by_numeric: Vec<Option<BlockDefinition>>,
    /// Маппинг string ID -> numeric ID
    id_to_numeric: HashMap<String, BlockId>,
    /// Ответ для неизвестных ID
    air: BlockDefinition,
}

impl BlockRegistry {
    /// Пустой реестр (только воздух)
    pub fn new() -> Self {
        let mut registry = Self {
            by_numeric: Vec::new(),
            id_to_numeric: HashMap::new(),
            air: BlockDefinition::air(),
        };
        registry.register(BlockDefinition::air());
        registry
    }

    /// Реестр со встроенными блоками (fallback если JSON битый)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        if let Err(e) = registry.load_from_json(DEFAULT_BLOCKS_JSON) {
            log::warn!("Failed to load default blocks: {}", e);
            register_fallback_blocks(&mut registry);
        }
        registry
    }

    /// Загрузить блоки из JSON строки
    pub fn load_from_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let blocks_file: BlocksFile = serde_json::from_str(json)?;
        let count = blocks_file.blocks.len();
        for block in blocks_file.blocks {
            self.register(block);
        }
        log::debug!("Loaded {} block definitions (format {})", count, blocks_file.version);
        Ok(count)
    }

    /// Загрузить блоки из файла
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, RegistryError> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_from_json(&content)
    }

    /// Зарегистрировать блок (перезаписывает тот же numeric ID)
    pub fn register(&mut self, block: BlockDefinition) {
        let index = block.numeric_id as usize;
        if self.by_numeric.len() <= index {
            self.by_numeric.resize(index + 1, None);
        }
        if let Some(old) = &self.by_numeric[index] {
            if old.id != block.id {
                self.id_to_numeric.remove(&old.id);
            }
        }
        if block.numeric_id == AIR {
            self.air = block.clone();
        }
        self.id_to_numeric.insert(block.id.clone(), block.numeric_id);
        self.by_numeric[index] = Some(block);
    }

    /// Определение блока; неизвестные ID дают воздух
    #[inline]
    pub fn definition(&self, id: BlockId) -> &BlockDefinition {
        self.by_numeric
            .get(id as usize)
            .and_then(|slot| slot.as_ref())
            .unwrap_or(&self.air)
    }

    /// Получить блок по numeric ID (None для незарегистрированных)
    pub fn get(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.by_numeric.get(id as usize).and_then(|slot| slot.as_ref())
    }

    /// Получить numeric ID по string ID
    pub fn numeric_id(&self, id: &str) -> Option<BlockId> {
        self.id_to_numeric.get(id).copied()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    // Быстрые свойства для горячих циклов меша и света

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        id != AIR && self.definition(id).solid
    }

    #[inline]
    pub fn is_transparent(&self, id: BlockId) -> bool {
        id == AIR || self.definition(id).transparent
    }

    #[inline]
    pub fn is_opaque(&self, id: BlockId) -> bool {
        !self.is_transparent(id)
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> u8 {
        if id == AIR { 0 } else { self.definition(id).emission() }
    }

    /// Все блоки
    pub fn all_blocks(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.by_numeric.iter().filter_map(|slot| slot.as_ref())
    }

    /// Количество блоков
    pub fn count(&self) -> usize {
        self.id_to_numeric.len()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self { Self::with_defaults() }
}

/// Fallback блоки если JSON не загрузился
fn register_fallback_blocks(registry: &mut BlockRegistry) {
    registry.register(BlockDefinition {
        id: "stone".to_string(),
        numeric_id: 1,
        name: "Stone".to_string(),
        textures: Some(FaceTextures::All(1)),
        ..Default::default()
    });

    registry.register(BlockDefinition {
        id: "dirt".to_string(),
        numeric_id: 2,
        name: "Dirt".to_string(),
        textures: Some(FaceTextures::All(2)),
        ..Default::default()
    });

    registry.register(BlockDefinition {
        id: "grass".to_string(),
        numeric_id: 3,
        name: "Grass".to_string(),
        textures: Some(FaceTextures::PerFace {
            top: Some(0),
            bottom: Some(2),
            north: None,
            south: None,
            east: None,
            west: None,
            side: Some(3),
        }),
        tint: TintKind::GrassTop,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::types::{GLASS, GLOWSTONE, GRASS, OAK_LEAVES, STONE, WATER};

    #[test]
    fn test_defaults_loaded() {
        let registry = BlockRegistry::with_defaults();
        assert!(registry.count() > 10);
        assert_eq!(registry.numeric_id("stone"), Some(STONE));
        assert!(registry.is_solid(STONE));
        assert!(registry.is_opaque(STONE));
        assert!(registry.is_transparent(GLASS));
        assert!(!registry.is_solid(WATER));
        assert_eq!(registry.emission(GLOWSTONE), 15);
        assert_eq!(registry.definition(GRASS).tint, TintKind::GrassTop);
        assert_eq!(registry.definition(OAK_LEAVES).tint, TintKind::Foliage);
    }

    #[test]
    fn test_unknown_id_is_air() {
        let registry = BlockRegistry::with_defaults();
        let def = registry.definition(4000);
        assert!(def.is_air());
        assert!(registry.is_transparent(4000));
        assert!(!registry.is_solid(4000));
    }

    #[test]
    fn test_bad_json_is_error() {
        let mut registry = BlockRegistry::new();
        let result = registry.load_from_json("{ not json");
        assert!(matches!(result, Err(RegistryError::Parse(_))));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_register_replaces_numeric_slot() {
        let mut registry = BlockRegistry::new();
        registry.register(BlockDefinition {
            id: "marble".to_string(),
            numeric_id: 200,
            name: "Marble".to_string(),
            ..Default::default()
        });
        registry.register(BlockDefinition {
            id: "basalt".to_string(),
            numeric_id: 200,
            name: "Basalt".to_string(),
            ..Default::default()
        });
        assert_eq!(registry.definition(200).id, "basalt");
        assert_eq!(registry.numeric_id("marble"), None);
        assert_eq!(registry.count(), 2);
    }
}
