// ============================================
// Block Texture Atlas
// ============================================
// Контракт атласа: индекс тайла для грани -> UV прямоугольник.
// Загрузка изображений живёт во внешнем рендерере.

use super::definition::BlockDefinition;
use super::types::BlockFace;

/// Тайл "нет текстуры" (розово-чёрная клетка)
pub const MISSING_TEXTURE_INDEX: u32 = 255;
/// Тайлов в строке атласа (16x16 = 256 тайлов)
pub const ATLAS_SIZE: u32 = 16;

/// Атлас текстур блоков
pub trait TextureAtlas: Send + Sync {
    /// Количество тайлов
    fn tile_count(&self) -> u32;

    /// UV прямоугольник тайла: [u0, v0, u1, v1]
    fn uv_rect(&self, index: u32) -> [f32; 4];

    /// Индекс тайла для грани блока
    fn atlas_index(&self, def: &BlockDefinition, face: BlockFace) -> u32 {
        match def.atlas_index(face) {
            Some(index) if index < self.tile_count() => index,
            _ => MISSING_TEXTURE_INDEX.min(self.tile_count().saturating_sub(1)),
        }
    }

    fn face_uv(&self, def: &BlockDefinition, face: BlockFace) -> [f32; 4] {
        self.uv_rect(self.atlas_index(def, face))
    }
}

/// Атлас-сетка из одинаковых квадратных тайлов
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAtlas {
    tiles_per_row: u32,
}

impl GridAtlas {
    pub fn new(tiles_per_row: u32) -> Self {
        Self { tiles_per_row: tiles_per_row.max(1) }
    }

    #[inline]
    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }
}

impl Default for GridAtlas {
    fn default() -> Self { Self::new(ATLAS_SIZE) }
}

impl TextureAtlas for GridAtlas {
    fn tile_count(&self) -> u32 {
        self.tiles_per_row * self.tiles_per_row
    }

    fn uv_rect(&self, index: u32) -> [f32; 4] {
        let index = index.min(self.tile_count() - 1);
        let tile = 1.0 / self.tiles_per_row as f32;
        let u0 = (index % self.tiles_per_row) as f32 * tile;
        let v0 = (index / self.tiles_per_row) as f32 * tile;
        [u0, v0, u0 + tile, v0 + tile]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::definition::FaceTextures;

    #[test]
    fn test_uv_rect_grid() {
        let atlas = GridAtlas::default();
        assert_eq!(atlas.uv_rect(0), [0.0, 0.0, 0.0625, 0.0625]);
        let rect = atlas.uv_rect(17);
        assert!((rect[0] - 0.0625).abs() < 1e-6);
        assert!((rect[1] - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_missing_texture_fallback() {
        let atlas = GridAtlas::default();
        let def = BlockDefinition::default();
        assert_eq!(atlas.atlas_index(&def, BlockFace::Top), MISSING_TEXTURE_INDEX);

        let out_of_range = BlockDefinition {
            textures: Some(FaceTextures::All(9000)),
            ..Default::default()
        };
        assert_eq!(atlas.atlas_index(&out_of_range, BlockFace::East), MISSING_TEXTURE_INDEX);
    }
}
