// ============================================
// Block Types - Data-Driven Architecture
// ============================================
// BlockId = u16 (numeric_id). Все свойства блоков в реестре.

/// BlockId - просто numeric_id блока
pub type BlockId = u16;

// Константы стандартных блоков (соответствуют numeric_id в default_blocks.json)
pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const DIRT: BlockId = 2;
pub const GRASS: BlockId = 3;
pub const SAND: BlockId = 4;
pub const GRAVEL: BlockId = 5;
pub const COBBLESTONE: BlockId = 10;
pub const DEEPSLATE: BlockId = 15;
pub const OAK_LOG: BlockId = 30;
pub const OAK_PLANKS: BlockId = 31;
pub const OAK_LEAVES: BlockId = 32;
pub const BIRCH_LEAVES: BlockId = 35;
pub const SPRUCE_LEAVES: BlockId = 38;
pub const WATER: BlockId = 50;
pub const LAVA: BlockId = 51;
pub const ICE: BlockId = 52;
pub const GLASS: BlockId = 63;
pub const GLOWSTONE: BlockId = 80;
pub const TORCH: BlockId = 81;

/// Грань блока (для текстур и биомного оттенка)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFace {
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// -Z
    North,
    /// +Z
    South,
    /// +X
    East,
    /// -X
    West,
}

impl BlockFace {
    #[inline]
    pub fn is_side(self) -> bool {
        !matches!(self, BlockFace::Top | BlockFace::Bottom)
    }
}
