// ============================================
// Flat World - Слоистый плоский мир
// ============================================

use crate::blocks::{BlockId, DIRT, GRASS, STONE};
use crate::terrain::voxel::constants::CHUNK_HEIGHT;
use crate::terrain::{Chunk, ChunkPos};

use super::WorldGenerator;

/// Слои снизу вверх: (блок, толщина)
#[derive(Debug, Clone)]
pub struct FlatWorldGenerator {
    layers: Vec<(BlockId, usize)>,
}

impl FlatWorldGenerator {
    pub fn new(layers: Vec<(BlockId, usize)>) -> Self {
        Self { layers }
    }

    /// Высота поверхности (первая клетка воздуха)
    pub fn surface_height(&self) -> usize {
        self.layers
            .iter()
            .map(|&(_, thickness)| thickness)
            .sum::<usize>()
            .min(CHUNK_HEIGHT as usize)
    }

    pub fn layers(&self) -> &[(BlockId, usize)] {
        &self.layers
    }
}

impl Default for FlatWorldGenerator {
    /// Камень 60, земля 3, трава 1
    fn default() -> Self {
        Self::new(vec![(STONE, 60), (DIRT, 3), (GRASS, 1)])
    }
}

impl WorldGenerator for FlatWorldGenerator {
    fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos);
        let mut y = 0;
        for &(id, thickness) in &self.layers {
            let top = (y + thickness).min(CHUNK_HEIGHT as usize);
            if top > y {
                chunk.fill_layers(y, top - 1, id);
            }
            y = top;
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::AIR;

    #[test]
    fn test_default_layers() {
        let generator = FlatWorldGenerator::default();
        let chunk = generator.generate_chunk(ChunkPos::new(-3, 7));
        assert_eq!(chunk.pos(), ChunkPos::new(-3, 7));
        assert_eq!(chunk.get_block(0, 0, 0), STONE);
        assert_eq!(chunk.get_block(5, 59, 5), STONE);
        assert_eq!(chunk.get_block(5, 60, 5), DIRT);
        assert_eq!(chunk.get_block(15, 63, 15), GRASS);
        assert_eq!(chunk.get_block(15, 64, 15), AIR);
        assert_eq!(generator.surface_height(), 64);
        assert_eq!(chunk.highest_non_air(3, 3), Some(63));
    }

    #[test]
    fn test_layers_clamped_to_height() {
        let generator = FlatWorldGenerator::new(vec![(STONE, 300)]);
        let chunk = generator.generate_chunk(ChunkPos::new(0, 0));
        assert_eq!(chunk.get_block(0, 255, 0), STONE);
        assert_eq!(generator.surface_height(), 256);
    }

    #[test]
    fn test_closure_generator() {
        let generator = |pos: ChunkPos| {
            let mut chunk = Chunk::new(pos);
            chunk.set_block(0, 0, 0, DIRT);
            chunk
        };
        let chunk = generator.generate_chunk(ChunkPos::new(1, 1));
        assert_eq!(chunk.get_block(0, 0, 0), DIRT);
    }
}
