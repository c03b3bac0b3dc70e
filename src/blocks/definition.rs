// ============================================
// Data-Driven Block Definition
// ============================================
// Структуры для загрузки блоков из JSON

use serde::{Deserialize, Serialize};

use super::types::{BlockFace, BlockId, AIR};

/// Максимальный уровень света
pub const MAX_LIGHT_LEVEL: u8 = 15;

// ============================================
// Face Textures - индексы в атласе для граней
// ============================================

/// Индексы тайлов атласа для граней блока
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceTextures {
    /// Один тайл для всех граней
    All(u32),

    /// Разные тайлы для граней
    PerFace {
        #[serde(default)]
        top: Option<u32>,
        #[serde(default)]
        bottom: Option<u32>,
        #[serde(default)]
        north: Option<u32>,
        #[serde(default)]
        south: Option<u32>,
        #[serde(default)]
        east: Option<u32>,
        #[serde(default)]
        west: Option<u32>,
        /// Fallback для сторон
        #[serde(default)]
        side: Option<u32>,
    },
}

impl FaceTextures {
    /// Индекс тайла для грани (None если не задан)
    pub fn index_for(&self, face: BlockFace) -> Option<u32> {
        match self {
            FaceTextures::All(index) => Some(*index),
            FaceTextures::PerFace { top, bottom, north, south, east, west, side } => {
                let specific = match face {
                    BlockFace::Top => *top,
                    BlockFace::Bottom => *bottom,
                    BlockFace::North => *north,
                    BlockFace::South => *south,
                    BlockFace::East => *east,
                    BlockFace::West => *west,
                };
                if face.is_side() {
                    specific.or(*side)
                } else {
                    specific
                }
            }
        }
    }
}

/// Какой биомный оттенок применять к граням блока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TintKind {
    #[default]
    None,
    /// Только верхняя грань (трава)
    GrassTop,
    /// Все грани (листва)
    Foliage,
}

impl TintKind {
    #[inline]
    pub fn applies_to(self, face: BlockFace) -> bool {
        match self {
            TintKind::None => false,
            TintKind::GrassTop => face == BlockFace::Top,
            TintKind::Foliage => true,
        }
    }
}

/// Определение блока из JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Уникальный ID блока (string, например "stone")
    pub id: String,

    /// Числовой ID для хранения в чанке
    pub numeric_id: BlockId,

    /// Отображаемое имя
    pub name: String,

    /// Прозрачный ли блок (пропускает свет, видно соседей)
    #[serde(default)]
    pub transparent: bool,

    /// Твёрдый ли блок (закрывает соседние грани, даёт AO)
    #[serde(default = "default_true")]
    pub solid: bool,

    /// Уровень излучаемого света (0-15)
    #[serde(default)]
    pub light_level: u8,

    /// Тайлы атласа
    #[serde(default)]
    pub textures: Option<FaceTextures>,

    /// Биомный оттенок
    #[serde(default)]
    pub tint: TintKind,

    /// Дополнительные теги для модов
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool { true }

impl Default for BlockDefinition {
    fn default() -> Self {
        Self {
            id: "unknown".to_string(),
            numeric_id: AIR,
            name: "Unknown".to_string(),
            transparent: false,
            solid: true,
            light_level: 0,
            textures: None,
            tint: TintKind::None,
            tags: Vec::new(),
        }
    }
}

impl BlockDefinition {
    /// Определение воздуха
    pub fn air() -> Self {
        Self {
            id: "air".to_string(),
            numeric_id: AIR,
            name: "Air".to_string(),
            transparent: true,
            solid: false,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.numeric_id == AIR
    }

    /// Излучаемый свет, обрезанный до 0-15
    #[inline]
    pub fn emission(&self) -> u8 {
        self.light_level.min(MAX_LIGHT_LEVEL)
    }

    /// Тайл атласа для грани из JSON (None если не задан)
    #[inline]
    pub fn atlas_index(&self, face: BlockFace) -> Option<u32> {
        self.textures.as_ref().and_then(|t| t.index_for(face))
    }
}

/// Файл с определениями блоков
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksFile {
    /// Версия формата
    #[serde(default = "default_version")]
    pub version: String,

    /// Список блоков
    pub blocks: Vec<BlockDefinition>,
}

fn default_version() -> String { "1.0".to_string() }
